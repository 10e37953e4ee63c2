//! Report sinks for validation results.
//!
//! The reconciler pushes one [`ReportEntry`] per result as it is produced.
//! Formatting beyond JSON is left to whoever consumes the entries.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::verify::{
    CountReconciliationResult, SampleValidationResult, SchemaDiffResult, TableError,
};

/// One result record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "facet", rename_all = "snake_case")]
pub enum ReportEntry {
    Schema(SchemaDiffResult),
    Count(CountReconciliationResult),
    Sample(SampleValidationResult),
    Error(TableError),
}

impl ReportEntry {
    /// Table the entry is about.
    pub fn table(&self) -> &str {
        match self {
            ReportEntry::Schema(r) => &r.table,
            ReportEntry::Count(r) => &r.table,
            ReportEntry::Sample(r) => &r.table,
            ReportEntry::Error(r) => &r.table,
        }
    }
}

/// Accepts structured result records.
pub trait ReportSink: Send {
    /// Record one entry.
    fn record(&mut self, entry: ReportEntry) -> Result<()>;

    /// Flush buffered output. The default does nothing.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Collects entries in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Vec<ReportEntry>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in the order they were recorded.
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }
}

impl ReportSink for MemorySink {
    fn record(&mut self, entry: ReportEntry) -> Result<()> {
        self.entries.push(entry);
        Ok(())
    }
}

/// Writes one JSON object per line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ReportSink for JsonLinesSink<W> {
    fn record(&mut self, entry: ReportEntry) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &entry)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
