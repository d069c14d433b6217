//! Crawler module for the staged catalog harvest
//!
//! This module contains the crawl pipeline, including:
//! - The paced fetch gateway and the caller-side retry policy
//! - Page parsing for the storefront layout
//! - Category discovery, pagination walking and detail harvesting
//! - Overall pipeline coordination

mod coordinator;
mod details;
mod discovery;
mod fanout;
mod fetcher;
mod pacing;
mod pagination;
mod parser;
mod retry;

pub use coordinator::{harvest, select_categories, select_links, Coordinator};
pub use details::{harvest_details, HarvestSettings};
pub use discovery::discover_categories;
pub use fanout::{fan_out, FanOut};
pub use fetcher::{build_headers, build_http_client, FetchFailure, FetchGateway, Fetcher};
pub use pacing::PacingInterval;
pub use pagination::{page_url, walk_category, WalkOutcome, WalkSettings};
pub use parser::{ListingPage, MarkupParser, PageParser, PageRole, ParseError, ParsedPage, OFFER_PARAM};
pub use retry::{fetch_with_retry, RetryPolicy};
