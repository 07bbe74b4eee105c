//! Reconnect backoff configuration.

use std::time::Duration;

/// How the notification client retries a failed or lost connection.
///
/// The delay before retry `n` (0-based) is `base_delay × 2^n`, capped at
/// `max_delay`. A successful open starts the count over.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use gestion_lib::notify::ReconnectPolicy;
///
/// let policy = ReconnectPolicy::default()
///     .max_attempts(3)
///     .base_delay(Duration::from_millis(500));
/// assert_eq!(policy.delay_for(2), Duration::from_secs(2));
///
/// let never = ReconnectPolicy::no_reconnect();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Retries after a failure before giving up.
    pub max_attempts: u32,
    /// Delay before the first retry (doubles each attempt).
    pub base_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl ReconnectPolicy {
    /// Gives up on the first failure.
    pub fn no_reconnect() -> Self {
        Self {
            max_attempts: 0,
            ..Default::default()
        }
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_double_then_cap() {
        let policy = ReconnectPolicy::default();
        let delays: Vec<u64> = (0..7).map(|n| policy.delay_for(n).as_secs()).collect();
        assert_eq!(delays, [1, 2, 4, 8, 16, 30, 30]);
        assert_eq!(policy.delay_for(200), Duration::from_secs(30));
    }
}
