/// Run-scoped accumulation of harvest results
///
/// The coordinator owns one `CrawlState` per run and merges each stage's
/// output into it after that stage's join completes.
use crate::state::records::{Category, PageLinkBatch, ProductLink, ProductRecord};
use std::fmt;

/// Pipeline stage a task belonged to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Discovery,
    Pagination,
    Details,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Pagination => "pagination",
            Self::Details => "details",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fan-out task that contributed nothing because it failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub stage: Stage,

    /// URL (or other identifier) the task was working on
    pub target: String,

    /// Human-readable cause
    pub error: String,
}

impl TaskFailure {
    pub fn new(stage: Stage, target: impl Into<String>, error: impl ToString) -> Self {
        Self {
            stage,
            target: target.into(),
            error: error.to_string(),
        }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.target, self.error)
    }
}

/// Accumulated results of a single harvest run
///
/// Contents only grow during a run. Accessors return exactly what has been
/// merged so far, in merge order.
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    categories: Vec<Category>,
    link_batches: Vec<PageLinkBatch>,
    records: Vec<ProductRecord>,
    failures: Vec<TaskFailure>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_categories(&mut self, categories: impl IntoIterator<Item = Category>) {
        self.categories.extend(categories);
    }

    pub fn extend_batches(&mut self, batches: impl IntoIterator<Item = PageLinkBatch>) {
        self.link_batches.extend(batches);
    }

    pub fn extend_records(&mut self, records: impl IntoIterator<Item = ProductRecord>) {
        self.records.extend(records);
    }

    pub fn record_failures(&mut self, failures: impl IntoIterator<Item = TaskFailure>) {
        self.failures.extend(failures);
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn all_link_batches(&self) -> &[PageLinkBatch] {
        &self.link_batches
    }

    pub fn all_records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn failures(&self) -> &[TaskFailure] {
        &self.failures
    }

    /// Every harvested link, batch by batch, without deduplication
    pub fn all_links(&self) -> impl Iterator<Item = &ProductLink> {
        self.link_batches.iter().flat_map(|batch| batch.links.iter())
    }

    pub fn link_count(&self) -> usize {
        self.link_batches.iter().map(PageLinkBatch::len).sum()
    }

    pub fn failures_in(&self, stage: Stage) -> usize {
        self.failures.iter().filter(|f| f.stage == stage).count()
    }
}
