//! Randomized request pacing
//!
//! Every outbound request, and every fan-out task before it, waits a delay
//! drawn uniformly from an interval so the request cadence carries no fixed
//! period.

use crate::config::PolitenessConfig;
use std::time::Duration;

/// Closed interval of delays, sampled uniformly at millisecond granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingInterval {
    min_ms: u64,
    max_ms: u64,
}

impl PacingInterval {
    /// Creates an interval; bounds are swapped if given in reverse
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    /// Jitter applied by the fetch gateway before every request
    pub fn request_pacing(config: &PolitenessConfig) -> Self {
        Self::from_millis(config.pacing_min_ms, config.pacing_max_ms)
    }

    /// Per-task delay before each listing page fetch
    pub fn listing_delay(config: &PolitenessConfig) -> Self {
        Self::from_millis(config.listing_delay_min_ms, config.listing_delay_max_ms)
    }

    /// Per-task delay before each detail page fetch
    pub fn detail_delay(config: &PolitenessConfig) -> Self {
        Self::from_millis(config.detail_delay_min_ms, config.detail_delay_max_ms)
    }

    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    /// Draws one delay from the interval
    pub fn sample(&self) -> Duration {
        Duration::from_millis(fastrand::u64(self.min_ms..=self.max_ms))
    }

    /// Sleeps for one sampled delay and returns how long it slept
    pub async fn wait(&self) -> Duration {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }
}
