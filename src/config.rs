//! # Pool configuration.
//!
//! Provides [`PoolConfig`], the centralized settings for a [`Pool`](crate::Pool).
//!
//! Config is used in two ways:
//! 1. **Pool creation**: `Pool::builder(config)`
//! 2. **Submission defaults**: a [`TaskSpec`](crate::TaskSpec) without an explicit
//!    attempt budget inherits `attempts` from here.
//!
//! ## Sentinel values
//! - `timeout = 0s` → no timeout (attempts run until they settle)
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::error::PoolError;

/// Configuration for a task pool.
///
/// ## Field semantics
/// - `size`: Maximum number of concurrently running attempts (must be `> 0`)
/// - `timeout`: Per-attempt time budget (`0s` = no timeout)
/// - `attempts`: Default total attempts per task, first run included (must be `>= 1`)
/// - `bus_capacity`: Event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Maximum number of attempts executing at the same time.
    pub size: usize,

    /// Time budget for a single attempt.
    ///
    /// When it elapses the attempt's cancellation token is triggered, the attempt
    /// is reported as [`TaskError::Timeout`](crate::TaskError::Timeout) and its
    /// slot is released, even if the closure keeps running.
    pub timeout: Duration,

    /// Total number of attempts per task (not "retries after the first one").
    ///
    /// Can be overridden per submission with [`TaskSpec::with_attempts`](crate::TaskSpec::with_attempts).
    pub attempts: u32,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events observe
    /// `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl PoolConfig {
    /// Creates a config with the three required knobs and default bus capacity.
    pub fn new(size: usize, timeout: Duration, attempts: u32) -> Self {
        Self {
            size,
            timeout,
            attempts,
            ..Self::default()
        }
    }

    /// Returns the per-attempt timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → timeout applied per attempt
    #[inline]
    pub fn default_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Checks the invariants the pool relies on.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.size == 0 {
            return Err(PoolError::InvalidSize);
        }
        if self.attempts == 0 {
            return Err(PoolError::InvalidAttempts {
                attempts: self.attempts,
            });
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    /// Default configuration:
    ///
    /// - `size = 4`
    /// - `timeout = 0s` (no timeout)
    /// - `attempts = 1` (no retries)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            size: 4,
            timeout: Duration::ZERO,
            attempts: 1,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(PoolConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_size_is_rejected() {
        let cfg = PoolConfig::new(0, Duration::from_millis(100), 1);
        assert_eq!(cfg.validate(), Err(PoolError::InvalidSize));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let cfg = PoolConfig::new(2, Duration::from_millis(100), 0);
        assert_eq!(
            cfg.validate(),
            Err(PoolError::InvalidAttempts { attempts: 0 })
        );
    }

    #[test]
    fn zero_timeout_means_none() {
        let mut cfg = PoolConfig::default();
        assert_eq!(cfg.default_timeout(), None);
        cfg.timeout = Duration::from_millis(250);
        assert_eq!(cfg.default_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn bus_capacity_never_zero() {
        let cfg = PoolConfig {
            bus_capacity: 0,
            ..PoolConfig::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
