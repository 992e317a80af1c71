//! # Retry policy for failed attempts.
//!
//! [`RetryPolicy`] decides whether a failed work item goes back to the queue.
//!
//! The budget is expressed as **total attempts**, first run included:
//! an item submitted with `attempts = 2` executes at most twice.
//!
//! ```text
//! attempts_remaining (while running) ──► failure
//!        │
//!        ├─ on_failure(err, retries_left = attempts_remaining - 1)
//!        │
//!        ├─ pool closed          ─► Exhausted(PoolClosed)
//!        ├─ retries_left == 0    ─► Exhausted(BudgetSpent)
//!        └─ otherwise            ─► Requeue { attempts_remaining: retries_left }
//! ```
//!
//! The error itself is opaque here: a timeout, a `Fatal` and a `Canceled` all spend
//! the budget the same way. For an always-failing item with budget `n` the failure
//! callback therefore observes `n-1, n-2, …, 0`.

use crate::error::PoolError;

/// Why an item left the pool without succeeding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExhaustReason {
    /// Every attempt was used.
    BudgetSpent,
    /// The pool was shut down before the item could run again.
    PoolClosed,
}

impl ExhaustReason {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ExhaustReason::BudgetSpent => "budget_spent",
            ExhaustReason::PoolClosed => "pool_closed",
        }
    }
}

/// Outcome of applying the policy to a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Put the item back with the given budget.
    Requeue {
        /// Attempts the requeued item still holds (always `>= 1`).
        attempts_remaining: u32,
    },
    /// Drop the item.
    Exhausted(ExhaustReason),
}

/// Total-attempts retry policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
}

impl RetryPolicy {
    /// Creates a policy whose default budget is `attempts` (must be `>= 1`).
    pub fn new(attempts: u32) -> Result<Self, PoolError> {
        check_attempts(attempts)?;
        Ok(Self { attempts })
    }

    /// Default total attempts per task.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Resolves a per-submission override against the default budget.
    pub fn budget_for(&self, requested: Option<u32>) -> Result<u32, PoolError> {
        match requested {
            Some(n) => check_attempts(n).map(|()| n),
            None => Ok(self.attempts),
        }
    }

    /// Attempts left once the current one is counted as failed.
    ///
    /// This is the value handed to the failure callback.
    #[inline]
    pub fn retries_left(attempts_remaining: u32) -> u32 {
        attempts_remaining.saturating_sub(1)
    }

    /// Decides what happens to an item that failed while holding `attempts_remaining`.
    pub fn decide(&self, attempts_remaining: u32, closed: bool) -> RetryDecision {
        if closed {
            return RetryDecision::Exhausted(ExhaustReason::PoolClosed);
        }
        match Self::retries_left(attempts_remaining) {
            0 => RetryDecision::Exhausted(ExhaustReason::BudgetSpent),
            n => RetryDecision::Requeue {
                attempts_remaining: n,
            },
        }
    }
}

impl Default for RetryPolicy {
    /// A single attempt, no retries.
    fn default() -> Self {
        Self { attempts: 1 }
    }
}

fn check_attempts(attempts: u32) -> Result<(), PoolError> {
    if attempts == 0 {
        Err(PoolError::InvalidAttempts { attempts })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_attempts_rejected() {
        assert_eq!(
            RetryPolicy::new(0),
            Err(PoolError::InvalidAttempts { attempts: 0 })
        );
    }

    #[test]
    fn override_is_validated() {
        let policy = RetryPolicy::new(3).expect("valid");
        assert_eq!(policy.budget_for(None), Ok(3));
        assert_eq!(policy.budget_for(Some(1)), Ok(1));
        assert!(policy.budget_for(Some(0)).is_err());
    }

    #[test]
    fn failing_item_walks_budget_down_to_zero() {
        let policy = RetryPolicy::new(3).expect("valid");

        let mut remaining = policy.attempts();
        let mut seen = Vec::new();
        loop {
            seen.push(RetryPolicy::retries_left(remaining));
            match policy.decide(remaining, false) {
                RetryDecision::Requeue { attempts_remaining } => remaining = attempts_remaining,
                RetryDecision::Exhausted(reason) => {
                    assert_eq!(reason, ExhaustReason::BudgetSpent);
                    break;
                }
            }
        }
        assert_eq!(seen, vec![2, 1, 0]);
    }

    #[test]
    fn closed_pool_never_requeues() {
        let policy = RetryPolicy::new(5).expect("valid");
        assert_eq!(
            policy.decide(5, true),
            RetryDecision::Exhausted(ExhaustReason::PoolClosed)
        );
        assert_eq!(
            policy.decide(5, false),
            RetryDecision::Requeue {
                attempts_remaining: 4
            }
        );
    }
}
