//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`] so deferred tasks, observers and the
//! subscriber workers can publish without blocking.
//!
//! ```text
//! Publishers (many):                      Listener (one per Scope):
//!   Deferred tasks ──┐
//!   CancelObserver ──┼──► Bus ──► subscriber listener ──► SubscriberSet
//!   SubscriberSet ───┘
//! ```
//!
//! ## Rules
//! - `publish()` never blocks and never fails; events are dropped when nobody listens.
//! - The ring buffer is shared by every receiver; slow receivers see `Lagged(n)`.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus; `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all current receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver that observes events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_see_events_published_after_subscribing() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::TaskStarted));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::TaskCompleted));
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TaskCompleted);
    }
}
