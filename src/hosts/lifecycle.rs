//! # Lifecycle-owning host.
//!
//! [`LifecycleOwner`] models a screen-like object that moves through named
//! [`LifecycleEvent`]s. Every emitted event is delivered to registered observers
//! as [`Signal::Lifecycle`].
//!
//! ## State tracking
//! ```text
//! Initialized ─Create─► Created ─Start─► Started ─Resume─► Resumed
//!                         ▲   ◄──Stop──    ▲   ◄──Pause──
//!                         │                │
//!                      (any) ───Destroy───► Destroyed (terminal)
//! ```
//! Events emitted after `Destroy` are ignored.

use std::sync::{Arc, Mutex, PoisonError};

use super::set::ObserverSet;
use super::signal::{LifecycleEvent, Observer, ObserverId, Signal, SignalSource};

/// Coarse lifecycle state derived from the last emitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Initialized,
    Created,
    Started,
    Resumed,
    Destroyed,
}

impl LifecycleState {
    fn after(event: LifecycleEvent) -> Self {
        match event {
            LifecycleEvent::Create | LifecycleEvent::Stop => LifecycleState::Created,
            LifecycleEvent::Start | LifecycleEvent::Pause => LifecycleState::Started,
            LifecycleEvent::Resume => LifecycleState::Resumed,
            LifecycleEvent::Destroy => LifecycleState::Destroyed,
        }
    }
}

/// Host that emits named lifecycle events.
///
/// Signals are expected to be emitted from one logical thread (the interactive context).
///
/// # Example
/// ```
/// use lifescope::{LifecycleEvent, LifecycleOwner, LifecycleState, SignalSource};
///
/// let owner = LifecycleOwner::new("main-activity");
/// owner.emit(LifecycleEvent::Create);
/// owner.emit(LifecycleEvent::Destroy);
/// assert_eq!(owner.state(), LifecycleState::Destroyed);
/// assert_eq!(owner.observer_count(), 0);
/// ```
pub struct LifecycleOwner {
    name: Arc<str>,
    state: Mutex<LifecycleState>,
    observers: ObserverSet,
}

impl LifecycleOwner {
    /// Creates a host in [`LifecycleState::Initialized`].
    pub fn new(name: impl Into<Arc<str>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            state: Mutex::new(LifecycleState::Initialized),
            observers: ObserverSet::new(),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True once `Destroy` has been emitted.
    pub fn is_destroyed(&self) -> bool {
        self.state() == LifecycleState::Destroyed
    }

    /// Moves the host through `event` and notifies observers.
    ///
    /// Returns the number of observers notified (`0` once destroyed).
    pub fn emit(&self, event: LifecycleEvent) -> usize {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state == LifecycleState::Destroyed {
                tracing::debug!(host = %self.name, event = event.as_label(), "event after destroy ignored");
                return 0;
            }
            *state = LifecycleState::after(event);
        }
        self.observers.dispatch(Signal::Lifecycle(event))
    }
}

impl SignalSource for LifecycleOwner {
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
