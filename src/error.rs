//! Error types used by the pool and by tasks.
//!
//! This module defines two main error enums:
//!
//! - [`PoolError`]: errors raised synchronously by the pool API itself
//!   (misconfiguration, invalid submissions, submissions after shutdown).
//! - [`TaskError`]: errors produced by individual task attempts. These are
//!   never returned to the caller of `submit`; they are routed to the failure
//!   callback and to the event bus.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the pool API.
///
/// All of them fail fast at the call site: construction, submission or a
/// bounded shutdown.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Pool size must be greater than zero.
    #[error("pool size must be greater than 0")]
    InvalidSize,

    /// Attempt budget must be at least one.
    #[error("attempts must be at least 1, got {attempts}")]
    InvalidAttempts {
        /// The rejected attempt budget.
        attempts: u32,
    },

    /// Priority outside of `0..=5`.
    #[error("priority must be between 0 (highest) and 5 (lowest), got {priority}")]
    InvalidPriority {
        /// The rejected priority.
        priority: u8,
    },

    /// The pool has been shut down and no longer accepts work.
    #[error("pool is closed")]
    Closed,

    /// The pool was built outside of a Tokio runtime.
    #[error("no tokio runtime available")]
    NoRuntime,

    /// Bounded shutdown gave up waiting for running work.
    #[error("shutdown grace {grace:?} exceeded; {stuck} task(s) still running")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Number of executions that had not released their slot.
        stuck: usize,
    },
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskpool::PoolError;
    ///
    /// let err = PoolError::InvalidPriority { priority: 9 };
    /// assert_eq!(err.as_label(), "pool_invalid_priority");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::InvalidSize => "pool_invalid_size",
            PoolError::InvalidAttempts { .. } => "pool_invalid_attempts",
            PoolError::InvalidPriority { .. } => "pool_invalid_priority",
            PoolError::Closed => "pool_closed",
            PoolError::NoRuntime => "pool_no_runtime",
            PoolError::GraceExceeded { .. } => "pool_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            PoolError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck tasks={stuck}")
            }
            other => other.to_string(),
        }
    }
}

/// # Errors produced by task execution.
///
/// The pool treats every variant alike: each failed attempt spends one unit of the
/// item's attempt budget. The variants only tell callbacks and subscribers what went wrong.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The attempt did not settle within the pool timeout.
    #[error("Timeout")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// Error the task considers non-recoverable.
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Ordinary attempt failure.
    #[error("{error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task observed its cancellation token and gave up.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    pub fn fail(error: impl std::fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Shorthand for [`TaskError::Fatal`].
    pub fn fatal(error: impl std::fmt::Display) -> Self {
        TaskError::Fatal {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskpool::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// assert_eq!(err.to_string(), "Timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Fatal { error } => format!("fatal: {error}"),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }

    /// Returns `true` for [`TaskError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout { .. })
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
