//! Post-migration validation of a PostgreSQL source against a MySQL target.
//!
//! Three independent checks, reported as separate facets:
//!
//! - **Schema**: every source column exists in the target table ([`diff_schemas`])
//! - **Count**: exact row count equality per table
//! - **Sample**: the first `k` rows by identity key compare equal after
//!   normalization ([`normalize`], [`are_equal`])
//!
//! A table can pass the count check and still fail the sample check; the two
//! are never merged. Per-table catalog failures are recorded and the run
//! moves on to the next table.

pub mod compare;
pub mod normalize;
pub mod rows;
pub mod schema_diff;
pub mod types;

// Re-exports
pub use compare::{are_equal, DATE_TOLERANCE_MS};
pub use normalize::normalize;
pub use rows::{compare_row, identity_keys, reconcile_sample};
pub use schema_diff::{diff_schemas, diff_table, missing_tables, TargetColumns};
pub use types::{
    ColumnOutcome, CountReconciliationResult, Facet, Mismatch, MismatchKind, RowComparison,
    SampleValidationResult, SchemaDiffResult, SchemaDiffStatus, TableError, ValidationReport,
};

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::{Config, ValidationConfig};
use crate::core::schema::{group_columns, TableSnapshot};
use crate::core::traits::CatalogReader;
use crate::error::Result;
use crate::report::{ReportEntry, ReportSink};

/// Every facet, in the order a full run performs them.
pub const ALL_FACETS: &[Facet] = &[Facet::Schema, Facet::Count, Facet::Sample];

/// Drives schema, count and sample reconciliation over two catalogs.
pub struct Reconciler {
    source: Arc<dyn CatalogReader>,
    target: Arc<dyn CatalogReader>,
    source_schema: String,
    target_schema: String,
    settings: ValidationConfig,
    config_hash: Option<String>,
}

impl Reconciler {
    /// Create a reconciler with default validation settings.
    pub fn new(
        source: Arc<dyn CatalogReader>,
        target: Arc<dyn CatalogReader>,
        source_schema: impl Into<String>,
        target_schema: impl Into<String>,
    ) -> Self {
        Self {
            source,
            target,
            source_schema: source_schema.into(),
            target_schema: target_schema.into(),
            settings: ValidationConfig::default(),
            config_hash: None,
        }
    }

    /// Create a reconciler from a loaded configuration.
    pub fn from_config(
        config: &Config,
        source: Arc<dyn CatalogReader>,
        target: Arc<dyn CatalogReader>,
    ) -> Self {
        Self::new(source, target, &config.source.schema, &config.target.schema)
            .with_settings(config.validation.clone())
            .with_config_hash(config.hash())
    }

    /// Replace the validation settings.
    pub fn with_settings(mut self, settings: ValidationConfig) -> Self {
        self.settings = settings;
        self
    }

    /// Record a configuration hash in produced reports.
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Current validation settings.
    pub fn settings(&self) -> &ValidationConfig {
        &self.settings
    }

    /// Source tables that pass the include/exclude filters, in catalog order.
    ///
    /// A failure here means the source catalog is unreachable and is returned
    /// to the caller.
    pub async fn source_tables(&self) -> Result<Vec<TableSnapshot>> {
        let columns = self.source.list_columns(&self.source_schema).await?;
        let tables: Vec<TableSnapshot> = group_columns(columns)
            .into_iter()
            .filter(|t| self.settings.includes_table(&t.name))
            .collect();
        debug!(
            "{} source tables selected from {}",
            tables.len(),
            self.source_schema
        );
        Ok(tables)
    }

    /// Diff source tables against the target catalog.
    ///
    /// A metadata failure for one table becomes an `error` entry for that
    /// table only.
    pub async fn diff_schemas(&self, tables: &[TableSnapshot]) -> Result<Vec<SchemaDiffResult>> {
        let target_tables = self.target.list_tables(&self.target_schema).await?;
        let mut results = Vec::with_capacity(tables.len());

        for table in tables {
            if !target_tables.iter().any(|t| table.has_name(t)) {
                warn!("{}: table missing in target", table.name);
                results.extend(diff_table(table, TargetColumns::Absent));
                continue;
            }

            let entries = match self
                .target
                .describe_table(&self.target_schema, &table.name)
                .await
            {
                Ok(columns) => diff_table(table, TargetColumns::Present(&columns)),
                Err(e) => {
                    warn!("{}: failed to read target columns: {}", table.name, e);
                    diff_table(table, TargetColumns::Failed(&e.to_string()))
                }
            };

            match entries.iter().filter(|e| !e.status.is_ok()).count() {
                0 => info!("{}: schema OK", table.name),
                n => warn!("{}: {} schema differences", table.name, n),
            }
            results.extend(entries);
        }

        Ok(results)
    }

    /// Compare exact row counts for one table.
    pub async fn count_table(&self, table: &str) -> Result<CountReconciliationResult> {
        let source_count = self.source.count(&self.source_schema, table).await?;
        let target_count = self.target.count(&self.target_schema, table).await?;
        let result = CountReconciliationResult::new(table, source_count, target_count);

        if result.matches {
            info!("{}: row count match ({} rows)", table, source_count);
        } else {
            warn!(
                "{}: row count mismatch (source: {}, target: {})",
                table, source_count, target_count
            );
        }

        Ok(result)
    }

    /// Reconcile the first `sample_size` rows of one table by identity key.
    pub async fn verify_table(&self, table: &str) -> Result<SampleValidationResult> {
        let key = &self.settings.identity_column;
        let source_rows = self
            .source
            .sample_rows(&self.source_schema, table, key, self.settings.sample_size)
            .await?;

        let ids = identity_keys(&source_rows, key);
        let target_rows = if ids.is_empty() {
            Vec::new()
        } else {
            self.target
                .rows_by_ids(&self.target_schema, table, key, &ids)
                .await?
        };

        let result = reconcile_sample(table, key, &source_rows, &target_rows);
        if result.passed {
            info!(
                "{}: sample OK ({} rows checked)",
                table, result.rows_checked
            );
        } else {
            warn!(
                "{}: sample mismatch ({}/{} rows matched, {} mismatches)",
                table,
                result.rows_matched,
                result.rows_checked,
                result.mismatches.len()
            );
        }

        Ok(result)
    }

    /// Run all facets.
    pub async fn run(&self, sink: &mut dyn ReportSink) -> Result<ValidationReport> {
        self.run_facets(ALL_FACETS, sink).await
    }

    /// Run the selected facets, streaming each result to `sink`.
    ///
    /// When the schema facet runs, tables that are missing or unreadable in
    /// the target are skipped by the count and sample facets.
    pub async fn run_facets(
        &self,
        facets: &[Facet],
        sink: &mut dyn ReportSink,
    ) -> Result<ValidationReport> {
        let start = Instant::now();
        let mut report = ValidationReport {
            config_hash: self.config_hash.clone(),
            ..Default::default()
        };

        let tables = self.source_tables().await?;
        info!(
            "Validating {} tables ({} → {})",
            tables.len(),
            self.source_schema,
            self.target_schema
        );

        let mut skipped: Vec<String> = Vec::new();
        if facets.contains(&Facet::Schema) {
            for entry in self.diff_schemas(&tables).await? {
                match entry.status {
                    SchemaDiffStatus::TableMissing => {
                        report.missing_tables.push(entry.table.clone());
                        skipped.push(entry.table.clone());
                    }
                    SchemaDiffStatus::Error => skipped.push(entry.table.clone()),
                    _ => {}
                }
                sink.record(ReportEntry::Schema(entry.clone()))?;
                report.schema.push(entry);
            }
        }

        for table in tables.iter().filter(|t| !skipped.contains(&t.name)) {
            if facets.contains(&Facet::Count) {
                match self.count_table(&table.name).await {
                    Ok(result) => {
                        sink.record(ReportEntry::Count(result.clone()))?;
                        report.counts.push(result);
                    }
                    Err(e) => self.record_error(&mut report, sink, &table.name, Facet::Count, e)?,
                }
            }

            if facets.contains(&Facet::Sample) {
                match self.verify_table(&table.name).await {
                    Ok(result) => {
                        sink.record(ReportEntry::Sample(result.clone()))?;
                        report.samples.push(result);
                    }
                    Err(e) => {
                        self.record_error(&mut report, sink, &table.name, Facet::Sample, e)?
                    }
                }
            }
        }

        sink.flush()?;
        report.duration_ms = start.elapsed().as_millis() as u64;

        if report.passed() {
            info!("Validation passed in {}ms", report.duration_ms);
        } else {
            warn!("Validation found differences in {}ms", report.duration_ms);
        }

        Ok(report)
    }

    fn record_error(
        &self,
        report: &mut ValidationReport,
        sink: &mut dyn ReportSink,
        table: &str,
        check: Facet,
        error: crate::error::ReconcileError,
    ) -> Result<()> {
        warn!("{}: {} check failed: {}", table, check, error);
        let entry = TableError {
            table: table.to_string(),
            check,
            message: error.to_string(),
        };
        sink.record(ReportEntry::Error(entry.clone()))?;
        report.errors.push(entry);
        Ok(())
    }
}
