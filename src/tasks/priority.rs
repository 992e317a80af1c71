//! # Task priority.
//!
//! [`Priority`] is a validated value in `0..=5` where **0 is the highest** priority
//! and 5 the lowest. Submissions without an explicit priority use [`Priority::DEFAULT`] (3).

use std::fmt;

use crate::error::PoolError;

/// Validated priority in `0..=5` (0 = highest).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u8);

impl Priority {
    /// Highest priority (dispatched first).
    pub const HIGHEST: Priority = Priority(0);
    /// Lowest priority.
    pub const LOWEST: Priority = Priority(5);
    /// Priority used when a submission does not specify one.
    pub const DEFAULT: Priority = Priority(3);

    /// Validates a raw priority value.
    pub fn new(value: u8) -> Result<Self, PoolError> {
        if value > Self::LOWEST.0 {
            return Err(PoolError::InvalidPriority { priority: value });
        }
        Ok(Self(value))
    }

    /// Returns the raw value.
    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Priority {
    type Error = PoolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
