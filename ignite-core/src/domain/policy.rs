//! Retry policy for start attempts

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounds how many start attempts are made and how long to back off between them
///
/// The delay before attempt `k + 1` is `base_delay * 2^(k - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of start attempts, always at least 1
    max_attempts: u32,

    /// Delay after the first failed attempt
    base_delay: Duration,
}

impl RetryPolicy {
    /// Default attempt budget
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

    /// Default base delay in seconds
    pub const DEFAULT_BASE_DELAY_SECS: u64 = 30;

    /// Creates a policy, returning `None` when `max_attempts` is zero
    pub fn new(max_attempts: u32, base_delay: Duration) -> Option<Self> {
        if max_attempts == 0 {
            return None;
        }
        Some(Self {
            max_attempts,
            base_delay,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Returns true if another attempt is allowed after `attempt` has failed
    pub fn has_attempts_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Backoff to apply after the given (1-based) attempt failed
    ///
    /// Saturates instead of overflowing for very large attempt numbers.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_secs(Self::DEFAULT_BASE_DELAY_SECS),
        }
    }
}
