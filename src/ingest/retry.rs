//! Retry policy applied uniformly by the fetcher.

use std::time::Duration;

use crate::ingest::types::FetchFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Floor for the wait after a rate-limit-class response.
    pub rate_limit_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            rate_limit_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy with near-zero waits, for tests and local dry runs.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::from_millis(1),
            rate_limit_delay: Duration::from_millis(2),
            max_delay: Duration::from_millis(10),
        }
    }

    pub fn is_retryable(&self, failure: &FetchFailure) -> bool {
        match failure {
            FetchFailure::Timeout | FetchFailure::Network(_) => true,
            FetchFailure::RateLimited { .. } => true,
            FetchFailure::Http { status } => *status >= 500,
            FetchFailure::EmptyBody => false,
        }
    }

    /// Whether another attempt is allowed after `attempt` (1-based) failed.
    pub fn should_retry(&self, attempt: u32, failure: &FetchFailure) -> bool {
        attempt < self.max_attempts && self.is_retryable(failure)
    }

    /// Delay before the attempt following `attempt` (1-based).
    pub fn backoff(&self, attempt: u32, failure: &FetchFailure) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let mut d = self.base_delay.saturating_mul(1u32 << exp);
        if matches!(failure, FetchFailure::RateLimited { .. }) {
            d = d.max(self.rate_limit_delay.saturating_mul(attempt.max(1)));
        }
        d.min(self.max_delay)
    }
}

/// Map an HTTP status to a failure, `None` for success.
pub fn classify_status(status: u16) -> Option<FetchFailure> {
    match status {
        200..=299 => None,
        403 | 429 => Some(FetchFailure::RateLimited { status }),
        s => Some(FetchFailure::Http { status: s }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let p = RetryPolicy::default();
        let net = FetchFailure::Network("reset".into());
        assert_eq!(p.backoff(1, &net), Duration::from_secs(1));
        assert_eq!(p.backoff(2, &net), Duration::from_secs(2));
        assert_eq!(p.backoff(3, &net), Duration::from_secs(4));
        assert_eq!(p.backoff(10, &net), Duration::from_secs(30));
    }

    #[test]
    fn rate_limit_waits_longer() {
        let p = RetryPolicy::default();
        let rl = FetchFailure::RateLimited { status: 429 };
        let net = FetchFailure::Network("x".into());
        assert!(p.backoff(1, &rl) > p.backoff(1, &net));
        assert_eq!(p.backoff(1, &rl), Duration::from_secs(5));
        assert_eq!(p.backoff(2, &rl), Duration::from_secs(10));
    }

    #[test]
    fn client_errors_are_final() {
        let p = RetryPolicy::default();
        assert!(!p.is_retryable(&FetchFailure::Http { status: 404 }));
        assert!(p.is_retryable(&FetchFailure::Http { status: 502 }));
        assert!(!p.is_retryable(&FetchFailure::EmptyBody));
        assert!(p.should_retry(2, &FetchFailure::Timeout));
        assert!(!p.should_retry(3, &FetchFailure::Timeout));
    }

    #[test]
    fn statuses_classify() {
        assert_eq!(classify_status(200), None);
        assert_eq!(
            classify_status(403),
            Some(FetchFailure::RateLimited { status: 403 })
        );
        assert_eq!(classify_status(500), Some(FetchFailure::Http { status: 500 }));
    }
}
