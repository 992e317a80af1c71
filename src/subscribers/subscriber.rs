//! # Pluggable event consumers.
//!
//! Implement [`Subscribe`] to receive every pool [`Event`] in a worker task of your own.
//! The pool never waits for a subscriber: each one owns a bounded inbox, and when the
//! inbox is full the event is dropped for that subscriber alone and an
//! `EventKind::SubscriberOverflow` is published. A panic inside `on_event` is caught
//! and reported as `EventKind::SubscriberPanicked`; the worker keeps going.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use async_trait::async_trait;
//! use taskpool::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct DrainCounter(AtomicU64);
//!
//! #[async_trait]
//! impl Subscribe for DrainCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::PoolDrained) {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "drain-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Consumer of pool events.
///
/// Runs on the Tokio executor, so blocking in `on_event` stalls other work.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Calls are sequential and in publish order.
    async fn on_event(&self, event: &Event);

    /// Name reported in `SubscriberOverflow` and `SubscriberPanicked` events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Inbox size; values below 1 are treated as 1.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
