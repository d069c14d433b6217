//! Caller-owned retry policy
//!
//! The fetch gateway reports failures after a cooldown and returns. Stages
//! decide how many times to ask again, and how long to back off in between,
//! through a [`RetryPolicy`].

use crate::config::RetryConfig;
use crate::crawler::fetcher::{FetchFailure, Fetcher};
use std::time::Duration;

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            multiplier: config.multiplier,
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// A policy that makes exactly one attempt
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Backoff to wait after the given failed attempt (1-based)
    ///
    /// Grows by `multiplier` per attempt and never exceeds `max_backoff`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let factor = self.multiplier.powi(exponent);
        let millis = self.initial_backoff.as_millis() as f64 * factor;
        let capped = millis.min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Fetches `url`, asking the gateway again on failure until the policy is exhausted
///
/// Returns the last failure once every attempt has failed.
pub async fn fetch_with_retry<F>(
    fetcher: &F,
    policy: &RetryPolicy,
    url: &str,
) -> Result<String, FetchFailure>
where
    F: Fetcher + ?Sized,
{
    let mut attempt = 1;
    loop {
        match fetcher.fetch(url).await {
            Ok(body) => return Ok(body),
            Err(failure) if policy.should_retry(attempt) => {
                let backoff = policy.backoff_for(attempt);
                tracing::debug!(
                    "Attempt {}/{} for {} failed ({}); retrying in {}ms",
                    attempt,
                    policy.max_attempts,
                    url,
                    failure,
                    backoff.as_millis()
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(failure) => return Err(failure),
        }
    }
}
