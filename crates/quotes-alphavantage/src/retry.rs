//! Retry policy for transient transport failures.

use std::time::Duration;

/// Exponential backoff settings.
///
/// Retry `n` (zero-based) waits `base_delay * backoff_factor^n`, so the
/// defaults wait 1s, 2s and 4s before giving up after three retries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Multiplier applied per retry.
    pub backoff_factor: u32,
    /// Wait before the first retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_factor: 2,
            base_delay: Duration::from_secs(1),
        }
    }

    /// Returns the wait before retry `retry` (zero-based).
    #[must_use]
    pub fn delay(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(self.backoff_factor.saturating_pow(retry))
    }

    /// Returns the total number of attempts, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 2,
            base_delay: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backoff_schedule() {
        let policy = RetryPolicy::default();
        let waits: Vec<u64> = (0..policy.max_retries)
            .map(|n| policy.delay(n).as_secs())
            .collect();
        assert_eq!(waits, vec![1, 2, 4]);
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn test_no_retry_policy() {
        assert_eq!(RetryPolicy::none().max_attempts(), 1);
    }

    #[test]
    fn test_delay_saturates() {
        let policy = RetryPolicy {
            max_retries: 100,
            backoff_factor: 10,
            base_delay: Duration::from_secs(1),
        };
        assert_eq!(policy.delay(90), Duration::from_secs(u64::from(u32::MAX)));
    }
}
