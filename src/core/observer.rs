//! # Cancellation observer.
//!
//! [`CancelObserver`] is registered on a host by the scope. It is a one-shot
//! state machine:
//!
//! ```text
//! armed ──matching signal──► fired
//!   │                          ├─ task not terminal → task.cancel()
//!   │                          └─ Disposition::Remove (swept at end of dispatch)
//!   └──other signal──► armed (no-op)
//! ```
//!
//! Signal delivery is serialized per host, so the `fired` flag is the only
//! synchronization needed; `cancel()` itself is safe while the body runs
//! on a worker thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::events::{Bus, Event, EventKind};
use crate::hosts::{Disposition, LifecycleEvent, Observer, Signal};
use crate::tasks::Cancel;

/// Condition that cancels a scoped task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trigger {
    /// The owner emitted this lifecycle event.
    Event(LifecycleEvent),
    /// The view was detached from the display.
    Detach,
}

impl Trigger {
    /// True if `signal` fires this trigger.
    pub(crate) fn matches(&self, signal: Signal) -> bool {
        match (self, signal) {
            (Trigger::Event(want), Signal::Lifecycle(got)) => *want == got,
            (Trigger::Detach, Signal::Detached) => true,
            _ => false,
        }
    }

    /// The signal that fires this trigger.
    pub(crate) fn signal(&self) -> Signal {
        match self {
            Trigger::Event(ev) => Signal::Lifecycle(*ev),
            Trigger::Detach => Signal::Detached,
        }
    }
}

/// One-shot observer that cancels its task when the host signals end-of-life.
pub(crate) struct CancelObserver {
    trigger: Trigger,
    task: Arc<dyn Cancel>,
    fired: AtomicBool,
    host: Arc<str>,
    bus: Bus,
}

impl CancelObserver {
    pub(crate) fn new(trigger: Trigger, task: Arc<dyn Cancel>, host: Arc<str>, bus: Bus) -> Self {
        Self {
            trigger,
            task,
            fired: AtomicBool::new(false),
            host,
            bus,
        }
    }

    pub(crate) fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

impl Observer for CancelObserver {
    fn on_signal(&self, signal: Signal) -> Disposition {
        if !self.trigger.matches(signal) {
            return Disposition::Keep;
        }
        if self.fired.swap(true, Ordering::AcqRel) {
            return Disposition::Remove;
        }

        let cancelled = !self.task.is_terminal() && self.task.cancel();
        let reason = if cancelled { "cancelled" } else { "already_terminal" };
        tracing::debug!(task = %self.task.id(), host = %self.host, %signal, reason, "scope observer fired");
        self.bus.publish(
            Event::new(EventKind::ObserverFired)
                .with_task(self.task.id())
                .with_host(Arc::clone(&self.host))
                .with_signal(signal)
                .with_reason(reason),
        );
        Disposition::Remove
    }

    fn name(&self) -> &str {
        "CancelObserver"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskId;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct FakeTask {
        cancels: AtomicUsize,
        terminal: AtomicBool,
    }

    impl Cancel for FakeTask {
        fn id(&self) -> TaskId {
            TaskId::next()
        }

        fn cancel(&self) -> bool {
            if self.terminal.swap(true, Ordering::SeqCst) {
                return false;
            }
            self.cancels.fetch_add(1, Ordering::SeqCst);
            true
        }

        fn is_terminal(&self) -> bool {
            self.terminal.load(Ordering::SeqCst)
        }
    }

    fn observer(trigger: Trigger, task: Arc<FakeTask>) -> CancelObserver {
        CancelObserver::new(trigger, task, "host".into(), Bus::new(8))
    }

    #[test]
    fn non_matching_signals_keep_the_observer_armed() {
        let task = Arc::new(FakeTask::default());
        let obs = observer(Trigger::Event(LifecycleEvent::Stop), task.clone());

        assert_eq!(obs.on_signal(Signal::Lifecycle(LifecycleEvent::Pause)), Disposition::Keep);
        assert_eq!(obs.on_signal(Signal::Detached), Disposition::Keep);
        assert!(!obs.has_fired());
        assert_eq!(task.cancels.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn first_match_cancels_once_and_asks_for_removal() {
        let task = Arc::new(FakeTask::default());
        let obs = observer(Trigger::Detach, task.clone());

        assert_eq!(obs.on_signal(Signal::Detached), Disposition::Remove);
        assert_eq!(obs.on_signal(Signal::Detached), Disposition::Remove);
        assert!(obs.has_fired());
        assert_eq!(task.cancels.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn terminal_task_is_not_cancelled() {
        let task = Arc::new(FakeTask::default());
        task.terminal.store(true, Ordering::SeqCst);
        let obs = observer(Trigger::Event(LifecycleEvent::Destroy), task.clone());

        assert_eq!(
            obs.on_signal(Signal::Lifecycle(LifecycleEvent::Destroy)),
            Disposition::Remove
        );
        assert_eq!(task.cancels.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn trigger_signal_round_trips() {
        let t = Trigger::Event(LifecycleEvent::Pause);
        assert!(t.matches(t.signal()));
        assert!(Trigger::Detach.matches(Trigger::Detach.signal()));
        assert!(!Trigger::Detach.matches(Signal::Attached));
    }
}
