//! # Event bus.
//!
//! [`Bus`] wraps a [`tokio::sync::broadcast`] channel. The dispatcher, every running
//! attempt and the subscriber workers publish into it; the subscriber listener and
//! any receiver from `Pool::subscribe` read from it.
//!
//! Publishing never blocks and never fails: with no receiver the event is simply
//! lost, and a receiver that falls more than `capacity` events behind gets
//! `RecvError::Lagged` and resumes from the oldest retained event.

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable handle to the pool's event channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
