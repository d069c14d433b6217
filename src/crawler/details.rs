//! Detail harvester
//!
//! Fetches and parses product detail pages with bounded concurrency. Each
//! task is isolated: a failed fetch or parse is logged and kept as a
//! [`TaskFailure`], and never disturbs sibling tasks.

use crate::config::Config;
use crate::crawler::fanout::{fan_out, FanOut};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::pacing::PacingInterval;
use crate::crawler::parser::PageParser;
use crate::crawler::retry::{fetch_with_retry, RetryPolicy};
use crate::state::{ProductLink, ProductRecord, Stage, TaskFailure};

/// Settings for one detail harvest
#[derive(Debug, Clone)]
pub struct HarvestSettings {
    pub retry: RetryPolicy,

    /// Detail pages fetched at once
    pub concurrency: usize,

    /// Delay each detail task waits before its fetch
    pub task_delay: PacingInterval,
}

impl HarvestSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            retry: RetryPolicy::from_config(&config.retry),
            concurrency: config.crawler.max_concurrent_requests as usize,
            task_delay: PacingInterval::detail_delay(&config.politeness),
        }
    }
}

/// Fetches and parses every link into a product record
///
/// Records come back in completion order.
pub async fn harvest_details<F, P>(
    fetcher: &F,
    parser: &P,
    settings: &HarvestSettings,
    links: &[ProductLink],
) -> FanOut<ProductRecord, TaskFailure>
where
    F: Fetcher + ?Sized,
    P: PageParser + ?Sized,
{
    tracing::info!("Harvesting {} product pages", links.len());

    let outcome = fan_out(links, settings.concurrency, |link| async move {
        settings.task_delay.wait().await;

        let content = fetch_with_retry(fetcher, &settings.retry, link.as_str())
            .await
            .map_err(|e| TaskFailure::new(Stage::Details, link.as_str(), e))?;
        let record = parser
            .parse_product(&content)
            .map_err(|e| TaskFailure::new(Stage::Details, link.as_str(), e))?;

        tracing::debug!("Harvested '{}' from {}", record.name, link);
        Ok::<_, TaskFailure>(record)
    })
    .await;

    for failure in &outcome.failures {
        tracing::warn!("Product skipped: {}", failure);
    }

    tracing::info!(
        "Harvested {} products ({} failed)",
        outcome.successes.len(),
        outcome.failures.len()
    );

    outcome
}
