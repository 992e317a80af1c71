//! Retry policy.
//!
//! This module groups the knobs that control **if** a failed work item runs again.
//!
//! ## Contents
//! - [`RetryPolicy`] total-attempts budget and the requeue/drop decision
//! - [`RetryDecision`], [`ExhaustReason`] the outcome of that decision
//!
//! ## Quick wiring
//! ```text
//! TaskSpec { priority, attempts: Option<u32> }
//!      └─► Dispatcher uses:
//!           - budget_for(attempts) when the item is queued
//!           - decide(attempts_remaining, &err) when an attempt fails
//! ```

mod retry;

pub use retry::{ExhaustReason, RetryDecision, RetryPolicy};
