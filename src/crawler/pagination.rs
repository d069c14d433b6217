//! Pagination walker
//!
//! For one category:
//! 1. Fetch the first listing page and read the total page count
//! 2. Fetch every listing page concurrently, each task waiting its own delay
//! 3. Keep the link batches that arrived; failed pages are simply absent

use crate::config::Config;
use crate::crawler::fanout::fan_out;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::pacing::PacingInterval;
use crate::crawler::parser::PageParser;
use crate::crawler::retry::{fetch_with_retry, RetryPolicy};
use crate::state::{PageLinkBatch, Stage, TaskFailure};
use crate::HarvestError;
use url::Url;

/// Settings for walking one category
#[derive(Debug, Clone)]
pub struct WalkSettings {
    pub retry: RetryPolicy,

    /// Listing pages fetched at once
    pub concurrency: usize,

    /// Delay each page task waits before its fetch
    pub task_delay: PacingInterval,

    /// Query parameter carrying the page number
    pub page_param: String,

    /// Upper bound on pages walked per category
    pub max_pages: Option<u32>,

    /// Announced page counts above this are treated as bogus and clamped
    pub page_ceiling: u32,
}

impl WalkSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            retry: RetryPolicy::from_config(&config.retry),
            concurrency: config.crawler.max_concurrent_requests as usize,
            task_delay: PacingInterval::listing_delay(&config.politeness),
            page_param: config.site.page_param.clone(),
            max_pages: config.scope.max_pages_per_category,
            page_ceiling: config.crawler.page_count_ceiling,
        }
    }
}

/// Result of walking one category
#[derive(Debug, Clone)]
pub struct WalkOutcome {
    /// Page count announced by the first listing page
    pub page_count: u32,

    /// Batches of the pages that succeeded, ordered by page number
    pub batches: Vec<PageLinkBatch>,

    /// Pages that failed to fetch or parse
    pub failures: Vec<TaskFailure>,
}

/// Builds the URL of one listing page
pub fn page_url(category_url: &Url, page_param: &str, page: u32) -> String {
    let mut url = category_url.clone();
    url.query_pairs_mut()
        .append_pair(page_param, &page.to_string());
    url.to_string()
}

/// Walks every listing page of a category and collects its product links
///
/// Fails only when the first listing page cannot be fetched or parsed.
/// Afterwards, a failing page contributes a [`TaskFailure`] instead of a
/// batch, and pages without a listing container contribute nothing.
pub async fn walk_category<F, P>(
    fetcher: &F,
    parser: &P,
    settings: &WalkSettings,
    category_url: &Url,
) -> Result<WalkOutcome, HarvestError>
where
    F: Fetcher + ?Sized,
    P: PageParser + ?Sized,
{
    let first_page = fetch_with_retry(fetcher, &settings.retry, category_url.as_str()).await?;
    let page_count = parser.parse_listing(&first_page)?.page_count;

    if page_count > settings.page_ceiling {
        tracing::warn!(
            "{} announces {} listing pages; walking only the first {}",
            category_url,
            page_count,
            settings.page_ceiling
        );
    }
    let pages = settings
        .max_pages
        .map_or(page_count, |limit| page_count.min(limit))
        .min(settings.page_ceiling);
    tracing::info!(
        "Walking {} of {} listing pages in {}",
        pages,
        page_count,
        category_url
    );

    let outcome = fan_out(1..=pages, settings.concurrency, |page| {
        let url = page_url(category_url, &settings.page_param, page);
        async move {
            settings.task_delay.wait().await;

            let content = fetch_with_retry(fetcher, &settings.retry, &url)
                .await
                .map_err(|e| TaskFailure::new(Stage::Pagination, url.as_str(), e))?;
            let listing = parser
                .parse_listing(&content)
                .map_err(|e| TaskFailure::new(Stage::Pagination, url.as_str(), e))?;

            let batch = listing
                .links
                .map(|links| PageLinkBatch::new(page, links))
                .filter(|batch| !batch.is_empty());
            if batch.is_none() {
                tracing::debug!("No product listing on {}", url);
            }
            Ok::<_, TaskFailure>(batch)
        }
    })
    .await;

    for failure in &outcome.failures {
        tracing::warn!("Listing page skipped: {}", failure);
    }

    let mut batches: Vec<PageLinkBatch> = outcome.successes.into_iter().flatten().collect();
    batches.sort_by_key(|batch| batch.page);

    tracing::info!(
        "Collected {} link batches from {} ({} pages failed)",
        batches.len(),
        category_url,
        outcome.failures.len()
    );

    Ok(WalkOutcome {
        page_count,
        batches,
        failures: outcome.failures,
    })
}
