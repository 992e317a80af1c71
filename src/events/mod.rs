//! Pool events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the dispatcher, the executor and
//! subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Dispatcher` (submit, start, requeue, drain, shutdown),
//!   `runner::run_once` (timeouts), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the pool's subscriber listener (fans out to `SubscriberSet`)
//!   and any receiver obtained through `Pool::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
