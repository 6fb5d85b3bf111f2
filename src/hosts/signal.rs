//! # Signals, observers and the signal-source contract.
//!
//! Both host kinds translate their native notifications into one uniform
//! [`Signal`] and deliver it to registered [`Observer`]s:
//!
//! ```text
//! LifecycleOwner::emit(LifecycleEvent) ─┐
//!                                       ├──► Signal ──► Observer::on_signal() ──► Disposition
//! ViewHost::attach()/detach()  ─────────┘
//! ```
//!
//! An observer that wants to leave the set returns [`Disposition::Remove`]; the
//! source sweeps it out at the end of the dispatch pass.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Global counter for observer registrations.
static OBSERVER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Named lifecycle events emitted by a [`LifecycleOwner`](crate::LifecycleOwner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Create,
    Start,
    Resume,
    Pause,
    Stop,
    Destroy,
}

impl LifecycleEvent {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LifecycleEvent::Create => "on_create",
            LifecycleEvent::Start => "on_start",
            LifecycleEvent::Resume => "on_resume",
            LifecycleEvent::Pause => "on_pause",
            LifecycleEvent::Stop => "on_stop",
            LifecycleEvent::Destroy => "on_destroy",
        }
    }
}

/// Uniform notification delivered to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// A lifecycle owner moved through `event`.
    Lifecycle(LifecycleEvent),
    /// A visual element was attached to the display.
    Attached,
    /// A visual element was detached from the display.
    Detached,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Lifecycle(ev) => f.write_str(ev.as_label()),
            Signal::Attached => f.write_str("attached"),
            Signal::Detached => f.write_str("detached"),
        }
    }
}

/// What the source should do with an observer after notifying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Stay registered.
    Keep,
    /// Unregister at the end of the current dispatch pass.
    Remove,
}

/// Registration handle returned by [`SignalSource::add_observer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    pub(crate) fn next() -> Self {
        Self(OBSERVER_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer-{}", self.0)
    }
}

/// # Receiver of host signals.
///
/// Called synchronously on the thread that dispatches the host's signals
/// (the interactive context). Implementations must not block.
///
/// # Example
/// ```
/// use lifescope::{Disposition, Observer, Signal};
///
/// struct UntilDetached;
///
/// impl Observer for UntilDetached {
///     fn on_signal(&self, signal: Signal) -> Disposition {
///         match signal {
///             Signal::Detached => Disposition::Remove,
///             _ => Disposition::Keep,
///         }
///     }
/// }
/// ```
pub trait Observer: Send + Sync + 'static {
    /// Handles one signal and tells the source whether to keep this observer.
    fn on_signal(&self, signal: Signal) -> Disposition;

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// # Host that emits signals to registered observers.
///
/// Implemented by [`LifecycleOwner`](crate::LifecycleOwner) and
/// [`ViewHost`](crate::ViewHost). The embedding application owns the host;
/// lifescope only keeps weak references to it.
pub trait SignalSource: Send + Sync + 'static {
    /// Stable host name (for events and logs).
    fn name(&self) -> &str;

    /// Appends an observer and returns its registration id.
    fn add_observer(&self, observer: Arc<dyn Observer>) -> ObserverId;

    /// Removes an observer.
    ///
    /// Returns `false` if `id` was not registered (or is already pending removal).
    /// Calls made during a dispatch pass take effect at the end of that pass.
    fn remove_observer(&self, id: ObserverId) -> bool;

    /// Number of registered observers.
    fn observer_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observer_ids_are_unique_and_increasing() {
        let a = ObserverId::next();
        let b = ObserverId::next();
        assert!(b > a);
    }

    #[test]
    fn signal_display_uses_labels() {
        assert_eq!(Signal::Lifecycle(LifecycleEvent::Stop).to_string(), "on_stop");
        assert_eq!(Signal::Detached.to_string(), "detached");
    }
}
