//! Harvest coordinator - staged pipeline orchestration
//!
//! The stages run strictly one after another, each starting only once the
//! previous one has fully joined:
//! 1. Category discovery (fatal on failure)
//! 2. Pagination walk of every selected category (failures isolated per category)
//! 3. Detail harvest of the selected product links (failures isolated per link)
//! 4. Persisting the records (fatal on failure)
//!
//! Every network stage opens its own gateway, so no HTTP connection pool
//! outlives the stage that created it.

use crate::config::{validate, Config, ScopeConfig};
use crate::crawler::details::{harvest_details, HarvestSettings};
use crate::crawler::discovery::discover_categories;
use crate::crawler::fetcher::FetchGateway;
use crate::crawler::pagination::{walk_category, WalkSettings};
use crate::crawler::parser::{MarkupParser, PageParser};
use crate::crawler::retry::RetryPolicy;
use crate::output::{CsvSink, RecordSink, RunSummary};
use crate::state::{Category, CrawlState, PageLinkBatch, ProductLink, Stage, TaskFailure};
use crate::HarvestError;
use chrono::Utc;
use std::collections::HashSet;
use url::Url;

/// Main harvest coordinator
pub struct Coordinator<P = MarkupParser> {
    config: Config,
    parser: P,
    base_url: Url,
}

impl Coordinator<MarkupParser> {
    /// Creates a coordinator using the storefront markup parser
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Configuration is valid
    /// * `Err(HarvestError)` - Configuration failed validation
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let base_url = checked_base_url(&config)?;
        let parser = MarkupParser::new(base_url.clone());

        Ok(Self {
            config,
            parser,
            base_url,
        })
    }
}

impl<P: PageParser> Coordinator<P> {
    /// Creates a coordinator with a custom page parser
    pub fn with_parser(config: Config, parser: P) -> Result<Self, HarvestError> {
        let base_url = checked_base_url(&config)?;

        Ok(Self {
            config,
            parser,
            base_url,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// URL of the catalog root
    pub fn catalog_url(&self) -> Result<Url, HarvestError> {
        Ok(self.base_url.join(&self.config.site.catalog_path)?)
    }

    /// Runs every network stage and returns the accumulated state
    pub async fn run(&self) -> Result<CrawlState, HarvestError> {
        let mut state = CrawlState::new();

        let categories = self.discover().await?;
        state.add_categories(categories);

        let selected = select_categories(state.categories(), &self.config.scope);
        tracing::info!(
            "Walking {} of {} categories",
            selected.len(),
            state.categories().len()
        );
        for category in &selected {
            self.walk(category, &mut state).await?;
        }

        let links = select_links(state.all_link_batches(), &self.config.scope);
        tracing::info!(
            "Selected {} of {} product links",
            links.len(),
            state.link_count()
        );
        self.harvest(&links, &mut state).await?;

        Ok(state)
    }

    /// Runs the pipeline, then writes the records to `sink`
    pub async fn run_into(&self, sink: &mut dyn RecordSink) -> Result<RunSummary, HarvestError> {
        let started_at = Utc::now();
        let state = self.run().await?;

        tracing::info!(
            "Writing {} records to {} sink",
            state.all_records().len(),
            sink.name()
        );
        sink.write(state.all_records())?;

        let summary = RunSummary::from_state(&state, started_at);
        summary.log();
        Ok(summary)
    }

    /// Runs the pipeline and writes the configured CSV file
    pub async fn run_and_persist(&self) -> Result<RunSummary, HarvestError> {
        let csv_path = self.config.output.csv_path.clone();
        let mut sink = CsvSink::new(&csv_path);
        let summary = self.run_into(&mut sink).await?;
        Ok(summary.with_output_path(csv_path))
    }

    async fn discover(&self) -> Result<Vec<Category>, HarvestError> {
        let catalog_url = self.catalog_url()?;
        let gateway = FetchGateway::from_config(&self.config)?;
        let retry = RetryPolicy::from_config(&self.config.retry);

        discover_categories(&gateway, &self.parser, &retry, catalog_url.as_str()).await
    }

    /// Walks one category; its failures are recorded, never propagated
    async fn walk(&self, category: &Category, state: &mut CrawlState) -> Result<(), HarvestError> {
        let category_url = match category.url(&self.base_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    "Category '{}' has an unusable path '{}': {}",
                    category.name,
                    category.relative_path,
                    e
                );
                state.record_failures([TaskFailure::new(
                    Stage::Discovery,
                    category.relative_path.as_str(),
                    e,
                )]);
                return Ok(());
            }
        };

        let gateway = FetchGateway::from_config(&self.config)?;
        let settings = WalkSettings::from_config(&self.config);

        match walk_category(&gateway, &self.parser, &settings, &category_url).await {
            Ok(outcome) => {
                state.extend_batches(outcome.batches);
                state.record_failures(outcome.failures);
            }
            Err(e) => {
                tracing::warn!("Category '{}' skipped: {}", category.name, e);
                state.record_failures([TaskFailure::new(
                    Stage::Pagination,
                    category_url.as_str(),
                    e,
                )]);
            }
        }

        Ok(())
    }

    async fn harvest(&self, links: &[ProductLink], state: &mut CrawlState) -> Result<(), HarvestError> {
        let gateway = FetchGateway::from_config(&self.config)?;
        let settings = HarvestSettings::from_config(&self.config);

        let outcome = harvest_details(&gateway, &self.parser, &settings, links).await;
        state.extend_records(outcome.successes);
        state.record_failures(outcome.failures);

        Ok(())
    }
}

/// Validates `config` and returns its parsed base URL
fn checked_base_url(config: &Config) -> Result<Url, HarvestError> {
    validate(config)?;
    Ok(Url::parse(&config.site.base_url)?)
}

/// Categories to walk, in catalog order, limited by `max-categories`
pub fn select_categories(categories: &[Category], scope: &ScopeConfig) -> Vec<Category> {
    let limit = scope.max_categories.unwrap_or(categories.len());
    categories.iter().take(limit).cloned().collect()
}

/// Product links to harvest, in batch order
///
/// Repeated links are dropped only when `dedupe-links` is set; the result is
/// then cut to `max-products`.
pub fn select_links(batches: &[PageLinkBatch], scope: &ScopeConfig) -> Vec<ProductLink> {
    let links = batches.iter().flat_map(|batch| batch.links.iter());

    let mut selected: Vec<ProductLink> = if scope.dedupe_links {
        let mut seen = HashSet::new();
        links
            .filter(|link| seen.insert(link.as_str()))
            .cloned()
            .collect()
    } else {
        links.cloned().collect()
    };

    if let Some(limit) = scope.max_products {
        selected.truncate(limit);
    }

    selected
}

/// Runs a complete harvest with the storefront markup parser
///
/// This is the main library entry point. It will:
/// 1. Discover the catalog's categories
/// 2. Walk the selected categories' listing pages
/// 3. Harvest the selected product pages
/// 4. Write the records to the configured CSV file
pub async fn harvest(config: Config) -> Result<RunSummary, HarvestError> {
    Coordinator::new(config)?.run_and_persist().await
}
