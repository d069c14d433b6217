//! End-of-run summary
//!
//! Condenses a finished [`CrawlState`] into counts per stage, so a run ends
//! with one report instead of only the warnings scattered through the log.

use crate::state::{CrawlState, Stage};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Summary statistics for one harvest run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    pub categories: usize,
    pub link_batches: usize,
    pub links: usize,
    pub records: usize,

    /// Failed tasks per stage
    pub failures: BTreeMap<Stage, usize>,

    /// Where the records were written, if they were
    pub output_path: Option<String>,
}

impl RunSummary {
    /// Builds a summary of `state` for a run that started at `started_at`
    pub fn from_state(state: &CrawlState, started_at: DateTime<Utc>) -> Self {
        let mut failures = BTreeMap::new();
        for failure in state.failures() {
            *failures.entry(failure.stage).or_insert(0) += 1;
        }

        Self {
            started_at,
            finished_at: Utc::now(),
            categories: state.categories().len(),
            link_batches: state.all_link_batches().len(),
            links: state.link_count(),
            records: state.all_records().len(),
            failures,
            output_path: None,
        }
    }

    pub fn with_output_path(mut self, path: impl Into<String>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds().max(0)
    }

    pub fn total_failures(&self) -> usize {
        self.failures.values().sum()
    }

    /// Emits the summary through the log
    pub fn log(&self) {
        tracing::info!(
            "Run finished in {}s: {} categories, {} batches, {} links, {} records, {} failed tasks",
            self.duration_seconds(),
            self.categories,
            self.link_batches,
            self.links,
            self.records,
            self.total_failures()
        );
        for (stage, count) in &self.failures {
            tracing::info!("  {} failures: {}", stage, count);
        }
    }
}

/// Prints a summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Run:");
    println!("  Started: {}", summary.started_at.to_rfc3339());
    println!("  Finished: {}", summary.finished_at.to_rfc3339());
    println!("  Duration: {}s", summary.duration_seconds());
    println!();

    println!("Harvested:");
    println!("  Categories: {}", summary.categories);
    println!("  Link batches: {}", summary.link_batches);
    println!("  Product links: {}", summary.links);
    println!("  Product records: {}", summary.records);
    println!();

    if !summary.failures.is_empty() {
        println!("Failed Tasks:");
        for (stage, count) in &summary.failures {
            println!("  {}: {}", stage, count);
        }
        println!();
    }

    if let Some(path) = &summary.output_path {
        println!("Output: {}", path);
    }
}
