//! Reconnect backoff policy.

use std::time::Duration;

/// Exponential backoff with a cap and a bounded attempt count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first retry.
    pub base: Duration,
    /// Upper bound for any single delay.
    pub cap: Duration,
    /// Attempts allowed before giving up for good.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            cap: Duration::from_secs(30),
            max_attempts: 10,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before attempt `attempt` (1-based): `min(base * 2^(k-1), cap)`.
    /// Returns `None` once the attempt budget is exhausted; the caller
    /// must stop scheduling and surface a terminal error.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        let exp = attempt.saturating_sub(1).min(31);
        let delay = self
            .base
            .checked_mul(1u32 << exp)
            .unwrap_or(self.cap);
        Some(delay.min(self.cap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ReconnectPolicy {
        ReconnectPolicy {
            base: Duration::from_secs(1),
            cap: Duration::from_secs(30),
            max_attempts: 6,
        }
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let p = policy();
        assert_eq!(p.delay_for(1), Some(Duration::from_secs(1)));
        assert_eq!(p.delay_for(2), Some(Duration::from_secs(2)));
        assert_eq!(p.delay_for(3), Some(Duration::from_secs(4)));
        assert_eq!(p.delay_for(4), Some(Duration::from_secs(8)));
    }

    #[test]
    fn test_delay_is_capped() {
        let p = policy();
        assert_eq!(p.delay_for(6), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_no_attempts_after_budget() {
        let p = policy();
        assert_eq!(p.delay_for(7), None);
        assert_eq!(p.delay_for(100), None);
    }

    #[test]
    fn test_attempt_zero_is_invalid() {
        assert_eq!(policy().delay_for(0), None);
    }

    #[test]
    fn test_large_attempt_does_not_overflow() {
        let p = ReconnectPolicy {
            base: Duration::from_secs(1),
            cap: Duration::from_secs(30),
            max_attempts: u32::MAX,
        };
        assert_eq!(p.delay_for(64), Some(Duration::from_secs(30)));
    }
}
