//! Catalog Harvest: a polite storefront catalog harvester
//!
//! This crate walks a paginated e-commerce catalog in stages (catalog index,
//! category listings, product detail pages) with bounded concurrency and
//! per-request pacing, and persists the harvested products as CSV.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;

#[cfg(test)]
pub(crate) mod test_utils;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] crawler::FetchFailure),

    #[error("Parse error: {0}")]
    Parse(#[from] crawler::ParseError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{harvest, Coordinator, MarkupParser, PageParser};
pub use state::{Category, CrawlState, PageLinkBatch, ProductLink, ProductRecord};
