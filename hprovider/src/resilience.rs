//! Retry policy and operational hook contracts for provider attempts.

use std::time::Duration;

use crate::{Candidate, FailureKind, ProviderError};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per candidate, counting the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
    pub retry_on: Vec<FailureKind>,
}

impl Default for RetryPolicy {
    /// One retry after a fixed two second pause, for rate limits only.
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(2),
            backoff_multiplier: 1.0,
            retry_on: vec![FailureKind::RateLimit],
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Single retry after two seconds, for rate limits only.
    pub fn rate_limit_default() -> Self {
        Self::default()
    }

    /// Never retries; every failure advances to the next candidate.
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self.max_backoff = self.max_backoff.max(backoff);
        self
    }

    pub fn should_retry(&self, attempt: u32, kind: FailureKind) -> bool {
        attempt < self.max_attempts && self.retry_on.contains(&kind)
    }

    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = (attempt.saturating_sub(1)) as i32;
        let unbounded = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(unbounded.min(self.max_backoff.as_secs_f64()))
    }
}

pub trait ProviderOperationHooks: Send + Sync {
    fn on_attempt_start(&self, _candidate: &Candidate, _attempt: u32) {}

    fn on_retry_scheduled(
        &self,
        _candidate: &Candidate,
        _attempt: u32,
        _delay: Duration,
        _error: &ProviderError,
    ) {
    }

    fn on_success(&self, _candidate: &Candidate, _attempts: u32, _fragments: usize) {}

    fn on_failure(
        &self,
        _candidate: &Candidate,
        _attempts: u32,
        _error: &ProviderError,
        _kind: FailureKind,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationHooks;

impl ProviderOperationHooks for NoopOperationHooks {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_retries_rate_limit_once() {
        let policy = RetryPolicy::default();

        assert!(policy.should_retry(1, FailureKind::RateLimit));
        assert!(!policy.should_retry(2, FailureKind::RateLimit));
        assert!(!policy.should_retry(1, FailureKind::Quota));
        assert!(!policy.should_retry(1, FailureKind::Network));
        assert_eq!(policy.backoff_for_attempt(1), Duration::from_secs(2));
    }

    #[test]
    fn retry_policy_backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(250),
            backoff_multiplier: 2.0,
            retry_on: vec![FailureKind::RateLimit, FailureKind::Network],
        };

        assert_eq!(policy.backoff_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for_attempt(3), Duration::from_millis(250));
        assert!(policy.should_retry(4, FailureKind::Network));
    }

    #[test]
    fn no_retry_policy_never_retries() {
        let policy = RetryPolicy::no_retry();
        assert!(!policy.should_retry(1, FailureKind::RateLimit));
    }
}
