//! # Event subscribers for the pool.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and,
//! behind the `logging` feature, the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Dispatcher / runner ── publish(Event) ──► Bus ──► subscriber_listener
//!                                                        │
//!                                                        ▼
//!                                                  SubscriberSet::emit
//!                                               ┌────────┼────────┐
//!                                               ▼        ▼        ▼
//!                                           LogWriter  Metrics  Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
