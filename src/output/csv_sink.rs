//! CSV export of harvested products
//!
//! One fixed header row followed by one row per record, in accumulation
//! order. Absent fields are written as empty cells.

use crate::output::traits::{OutputResult, RecordSink};
use crate::state::ProductRecord;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column order of the exported file
pub const CSV_HEADER: [&str; 3] = ["Name", "SKU", "Price"];

/// Writes the header and every record to `writer`
pub fn write_records_to<W: Write>(records: &[ProductRecord], writer: W) -> OutputResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CSV_HEADER)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Creates (or truncates) the file at `path` and writes every record to it
///
/// The file is closed when this returns, on success and on error alike.
pub fn write_records(records: &[ProductRecord], path: &Path) -> OutputResult<()> {
    let file = File::create(path)?;
    write_records_to(records, file)?;
    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Record sink backed by a CSV file
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn name(&self) -> &str {
        "csv"
    }

    fn write(&mut self, records: &[ProductRecord]) -> OutputResult<()> {
        write_records(records, &self.path)
    }
}
