//! # Runtime events emitted by scoped tasks and their observers.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Task events**: deferred task flow (scoped, started, completed, failed, cancelled)
//! - **Observer events**: host-side cancellation observers (fired, detached)
//! - **Subscriber events**: fan-out health (overflow, panic)
//!
//! The [`Event`] struct carries metadata such as the task id, host name, signal and reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use lifescope::{Event, EventKind, LifecycleEvent, Signal};
//!
//! let ev = Event::new(EventKind::ObserverFired)
//!     .with_host("main-activity")
//!     .with_signal(Signal::Lifecycle(LifecycleEvent::Destroy))
//!     .with_reason("cancelled");
//!
//! assert_eq!(ev.kind, EventKind::ObserverFired);
//! assert_eq!(ev.host.as_deref(), Some("main-activity"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::hosts::Signal;
use crate::tasks::TaskId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task events ===
    /// A deferred task was bound to a host.
    ///
    /// Sets:
    /// - `task`: task id
    /// - `host`: host name
    /// - `signal`: the signal that will cancel it
    TaskScoped,

    /// A deferred task body was handed to the background executor.
    ///
    /// Sets:
    /// - `task`: task id
    TaskStarted,

    /// A deferred task completed with a value.
    ///
    /// Sets:
    /// - `task`: task id
    TaskCompleted,

    /// A deferred task completed with a failure (error or panic).
    ///
    /// Sets:
    /// - `task`: task id
    /// - `reason`: failure message
    TaskFailed,

    /// A deferred task was cancelled before producing a value.
    ///
    /// Sets:
    /// - `task`: task id
    TaskCancelled,

    /// A continuation callback panicked on the interactive context.
    ///
    /// Sets:
    /// - `task`: id of the continuation's task
    /// - `reason`: panic message
    ContinuationPanicked,

    // === Observer events ===
    /// A cancellation observer saw its trigger signal.
    ///
    /// Sets:
    /// - `task`: observed task id
    /// - `host`: host name
    /// - `signal`: delivered signal
    /// - `reason`: `cancelled` or `already_terminal`
    ObserverFired,

    /// A cancellation observer left its host because the task finished first.
    ///
    /// Sets:
    /// - `task`: observed task id
    /// - `host`: host name
    ObserverDetached,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `host`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `host`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Task the event is about, if applicable.
    pub task: Option<TaskId>,
    /// Host (or subscriber) name, if applicable.
    pub host: Option<Arc<str>>,
    /// Signal involved, if applicable.
    pub signal: Option<Signal>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            host: None,
            signal: None,
            reason: None,
        }
    }

    /// Attaches a task id.
    #[inline]
    pub fn with_task(mut self, task: TaskId) -> Self {
        self.task = Some(task);
        self
    }

    /// Attaches a host name.
    #[inline]
    pub fn with_host(mut self, host: impl Into<Arc<str>>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Attaches a signal.
    #[inline]
    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_host(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_host(subscriber)
            .with_reason(info)
    }
}
