use std::collections::BTreeSet;
use std::time::Duration;

/// Retry and backoff configuration for upstream requests.
///
/// Total attempts per logical request are `1 + max_retries`. The delay
/// before retry `n` (0-based) is `backoff_base * backoff_factor^n`.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Delay before the first retry.
    pub backoff_base: Duration,
    /// Multiplier applied per further retry.
    pub backoff_factor: f64,
    /// Status codes that are retried before failing.
    pub retryable_statuses: BTreeSet<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base: Duration::from_millis(200),
            backoff_factor: 2.0,
            retryable_statuses: [429, 500, 502, 503, 504].into_iter().collect(),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, base: Duration, factor: f64) -> Self {
        self.backoff_base = base;
        self.backoff_factor = factor;
        self
    }

    /// Total attempts, including the first.
    pub fn total_attempts(&self) -> usize {
        self.max_retries.saturating_add(1)
    }

    /// Returns the delay to wait after failed attempt `attempt` (0-based).
    ///
    /// Saturates at `Duration::MAX`; a non-positive or NaN product yields zero.
    pub fn backoff(&self, attempt: usize) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.backoff_base.as_secs_f64() * self.backoff_factor.powi(exp);
        if secs.is_nan() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::RetryPolicy;

    #[test]
    fn default_retries_throttling_and_gateway_errors() {
        let policy = RetryPolicy::default();
        for status in [429, 500, 502, 503, 504] {
            assert!(policy.is_retryable_status(status), "{status}");
        }
        assert!(!policy.is_retryable_status(404));
        assert!(!policy.is_retryable_status(400));
        assert!(!policy.is_retryable_status(501));
        assert_eq!(policy.total_attempts(), 3);
    }

    #[test]
    fn backoff_grows_geometrically() {
        let policy = RetryPolicy::default().with_backoff(Duration::from_millis(200), 2.0);
        assert_eq!(policy.backoff(0), Duration::from_millis(200));
        assert_eq!(policy.backoff(1), Duration::from_millis(400));
        assert_eq!(policy.backoff(2), Duration::from_millis(800));
    }

    #[test]
    fn backoff_saturates_instead_of_panicking() {
        let policy = RetryPolicy::default().with_backoff(Duration::from_secs(1), 10.0);
        assert_eq!(policy.backoff(400), Duration::MAX);

        let flat = RetryPolicy::default().with_backoff(Duration::from_secs(1), 0.0);
        assert_eq!(flat.backoff(0), Duration::from_secs(1));
        assert_eq!(flat.backoff(3), Duration::ZERO);
    }

    #[test]
    fn none_means_single_attempt() {
        assert_eq!(RetryPolicy::none().total_attempts(), 1);
    }
}
