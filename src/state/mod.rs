//! State module for tracking harvest progress
//!
//! This module provides the data flowing between pipeline stages and the
//! run-scoped state that accumulates it.
//!
//! # Components
//!
//! - `Category`, `ProductLink`, `PageLinkBatch`, `ProductRecord`: harvested data
//! - `CrawlState`: owned accumulator for one run, read once at the end
//! - `TaskFailure`: a fan-out task that contributed nothing

mod crawl_state;
mod records;

// Re-export main types
pub use crawl_state::{CrawlState, Stage, TaskFailure};
pub use records::{Category, PageLinkBatch, ProductLink, ProductRecord};
