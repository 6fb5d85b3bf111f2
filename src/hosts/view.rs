//! # Visual-element host.
//!
//! [`ViewHost`] models an element that is attached to and detached from the
//! display. Only real transitions are delivered: attaching an attached view or
//! detaching a detached one is a no-op.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::set::ObserverSet;
use super::signal::{Observer, ObserverId, Signal, SignalSource};

/// Host that emits [`Signal::Attached`] / [`Signal::Detached`].
///
/// # Example
/// ```
/// use lifescope::{SignalSource, ViewHost};
///
/// let view = ViewHost::new("avatar");
/// assert_eq!(view.attach(), 0);
/// assert!(view.is_attached());
/// view.detach();
/// assert!(!view.is_attached());
/// ```
pub struct ViewHost {
    name: Arc<str>,
    attached: AtomicBool,
    observers: ObserverSet,
}

impl ViewHost {
    /// Creates a detached view.
    pub fn new(name: impl Into<Arc<str>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            attached: AtomicBool::new(false),
            observers: ObserverSet::new(),
        })
    }

    /// True while the view is attached to the display.
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Attaches the view; returns the number of observers notified.
    pub fn attach(&self) -> usize {
        if self.attached.swap(true, Ordering::AcqRel) {
            return 0;
        }
        self.observers.dispatch(Signal::Attached)
    }

    /// Detaches the view; returns the number of observers notified.
    pub fn detach(&self) -> usize {
        if !self.attached.swap(false, Ordering::AcqRel) {
            return 0;
        }
        self.observers.dispatch(Signal::Detached)
    }
}

impl SignalSource for ViewHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_observer(&self, observer: Arc<dyn Observer>) -> ObserverId {
        self.observers.add(observer)
    }

    fn remove_observer(&self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    fn observer_count(&self) -> usize {
        self.observers.len()
    }
}
