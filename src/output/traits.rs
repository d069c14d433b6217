//! Output sink trait and errors

use crate::state::ProductRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for the harvested records of a run
pub trait RecordSink {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Persists every record, in the order given
    fn write(&mut self, records: &[ProductRecord]) -> OutputResult<()>;
}
