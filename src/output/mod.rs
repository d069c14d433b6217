//! Output module for persisting harvest results
//!
//! This module handles:
//! - Writing harvested product records as CSV
//! - Summarizing a finished run

mod csv_sink;
pub mod summary;
mod traits;

pub use csv_sink::{write_records, write_records_to, CsvSink, CSV_HEADER};
pub use summary::{print_summary, RunSummary};
pub use traits::{OutputError, OutputResult, RecordSink};
