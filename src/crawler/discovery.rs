//! Category discovery
//!
//! One fetch and one parse of the catalog root. There is no fallback source
//! for categories, so any failure here ends the run.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::PageParser;
use crate::crawler::retry::{fetch_with_retry, RetryPolicy};
use crate::state::Category;
use crate::HarvestError;

/// Fetches the catalog root and returns its categories in page order
pub async fn discover_categories<F, P>(
    fetcher: &F,
    parser: &P,
    retry: &RetryPolicy,
    catalog_url: &str,
) -> Result<Vec<Category>, HarvestError>
where
    F: Fetcher + ?Sized,
    P: PageParser + ?Sized,
{
    tracing::info!("Discovering categories from {}", catalog_url);

    let content = fetch_with_retry(fetcher, retry, catalog_url).await?;
    let categories = parser.parse_catalog(&content)?;

    tracing::info!("Discovered {} categories", categories.len());
    for category in &categories {
        tracing::debug!("Category '{}' at {}", category.name, category.relative_path);
    }

    Ok(categories)
}
