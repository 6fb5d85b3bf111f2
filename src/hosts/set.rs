//! # ObserverSet: ordered observer registry with deferred removal.
//!
//! [`ObserverSet`] backs both host adapters. Dispatch iterates a snapshot, so
//! observers may add or remove registrations (including their own) from inside
//! [`Observer::on_signal`] without invalidating the pass.
//!
//! ## Rules
//! - Registration order is dispatch order.
//! - Removals requested while a pass is running are recorded and swept when
//!   the outermost pass ends; the removed observer is not notified again in that pass.
//! - Observers added during a pass are first notified by the next pass.
//! - The lock is never held while an observer runs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::signal::{Disposition, Observer, ObserverId, Signal};

struct Entry {
    id: ObserverId,
    observer: Arc<dyn Observer>,
}

#[derive(Default)]
struct Inner {
    entries: Vec<Entry>,
    pending: Vec<ObserverId>,
    depth: usize,
}

impl Inner {
    fn sweep(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        self.entries.retain(|e| !pending.contains(&e.id));
    }
}

/// Observer registry shared by the host adapters.
#[derive(Default)]
pub struct ObserverSet {
    inner: Mutex<Inner>,
}

impl ObserverSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an observer.
    pub fn add(&self, observer: Arc<dyn Observer>) -> ObserverId {
        let id = ObserverId::next();
        self.lock().entries.push(Entry { id, observer });
        id
    }

    /// Removes an observer now, or at the end of the running pass.
    pub fn remove(&self, id: ObserverId) -> bool {
        let mut inner = self.lock();
        if inner.pending.contains(&id) {
            return false;
        }
        let Some(pos) = inner.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        if inner.depth > 0 {
            inner.pending.push(id);
        } else {
            inner.entries.remove(pos);
        }
        true
    }

    /// Number of registered observers, not counting those pending removal.
    pub fn len(&self) -> usize {
        let inner = self.lock();
        inner.entries.len() - inner.pending.len()
    }

    /// True if no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers `signal` to every registered observer in order.
    ///
    /// Returns the number of observers notified.
    pub fn dispatch(&self, signal: Signal) -> usize {
        let pass = Pass::enter(self);
        let snapshot: Vec<(ObserverId, Arc<dyn Observer>)> = {
            let inner = self.lock();
            let snapshot = inner
                .entries
                .iter()
                .map(|e| (e.id, Arc::clone(&e.observer)))
                .collect();
            snapshot
        };

        let mut notified = 0;
        for (id, observer) in snapshot {
            if self.lock().pending.contains(&id) {
                continue;
            }
            notified += 1;
            if observer.on_signal(signal) == Disposition::Remove {
                tracing::trace!(observer = %id, name = observer.name(), "observer asked for removal");
                let mut inner = self.lock();
                if !inner.pending.contains(&id) {
                    inner.pending.push(id);
                }
            }
        }

        drop(pass);
        notified
    }
}

/// One dispatch pass; leaving it (normally or by unwinding) sweeps pending removals.
struct Pass<'a> {
    set: &'a ObserverSet,
}

impl<'a> Pass<'a> {
    fn enter(set: &'a ObserverSet) -> Self {
        set.lock().depth += 1;
        Self { set }
    }
}

impl Drop for Pass<'_> {
    fn drop(&mut self) {
        let mut inner = self.set.lock();
        inner.depth -= 1;
        if inner.depth == 0 {
            inner.sweep();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosts::LifecycleEvent;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::OnceLock;

    struct Counter {
        hits: AtomicUsize,
        once: bool,
    }

    impl Counter {
        fn new(once: bool) -> Arc<Self> {
            Arc::new(Self { hits: AtomicUsize::new(0), once })
        }
    }

    impl Observer for Counter {
        fn on_signal(&self, _signal: Signal) -> Disposition {
            self.hits.fetch_add(1, Ordering::SeqCst);
            if self.once {
                Disposition::Remove
            } else {
                Disposition::Keep
            }
        }
    }

    const STOP: Signal = Signal::Lifecycle(LifecycleEvent::Stop);

    #[test]
    fn one_shot_observers_are_swept_after_the_pass() {
        let set = ObserverSet::new();
        let once = Counter::new(true);
        let keep = Counter::new(false);
        set.add(once.clone());
        set.add(keep.clone());

        assert_eq!(set.dispatch(STOP), 2);
        assert_eq!(set.len(), 1);

        assert_eq!(set.dispatch(STOP), 1);
        assert_eq!(once.hits.load(Ordering::SeqCst), 1);
        assert_eq!(keep.hits.load(Ordering::SeqCst), 2);
    }

    struct Exploding;

    impl Observer for Exploding {
        fn on_signal(&self, _signal: Signal) -> Disposition {
            panic!("observer bug");
        }
    }

    #[test]
    fn panicking_observer_does_not_wedge_later_removals() {
        let set = ObserverSet::new();
        let once = Counter::new(true);
        set.add(once.clone());
        set.add(Arc::new(Exploding));

        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| set.dispatch(STOP)));
        assert!(res.is_err());
        assert_eq!(set.len(), 1);

        for _ in 0..100 {
            let id = set.add(Counter::new(false));
            assert!(set.remove(id));
        }
        let inner = set.lock();
        assert_eq!(inner.depth, 0);
        assert!(inner.pending.is_empty());
        assert_eq!(inner.entries.len(), 1);
    }

    #[test]
    fn remove_outside_dispatch_is_immediate() {
        let set = ObserverSet::new();
        let id = set.add(Counter::new(false));
        assert!(set.remove(id));
        assert!(set.is_empty());
        assert!(!set.remove(id));
    }

    /// Removes a later observer while the pass is running.
    struct Remover {
        set: Arc<ObserverSet>,
        victim: OnceLock<ObserverId>,
    }

    impl Observer for Remover {
        fn on_signal(&self, _signal: Signal) -> Disposition {
            if let Some(id) = self.victim.get() {
                assert!(self.set.remove(*id));
            }
            Disposition::Keep
        }
    }

    #[test]
    fn removal_during_pass_skips_the_victim() {
        let set = Arc::new(ObserverSet::new());
        let remover = Arc::new(Remover { set: set.clone(), victim: OnceLock::new() });
        let victim = Counter::new(false);

        set.add(remover.clone());
        let victim_id = set.add(victim.clone());
        remover.victim.set(victim_id).unwrap();

        assert_eq!(set.dispatch(STOP), 1);
        assert_eq!(victim.hits.load(Ordering::SeqCst), 0);
        assert_eq!(set.len(), 1);
    }
}
