//! # pg-mysql-reconcile
//!
//! Schema translation and data-fidelity validation for PostgreSQL to MySQL
//! migrations.
//!
//! This library provides:
//!
//! - **Type mapping** from PostgreSQL column types to MySQL declarations
//! - **DDL emission** of MySQL `CREATE TABLE` statements
//! - **Schema diffing** of source and target column sets
//! - **Row reconciliation**: exact row counts plus sampled value comparison
//!   that tolerates representation differences (booleans as integers,
//!   timestamps as strings, JSON as text)
//!
//! Database access sits behind the [`CatalogReader`](core::CatalogReader)
//! trait. [`SnapshotCatalog`] reads JSON catalog dumps.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pg_mysql_reconcile::{Config, MemorySink, Reconciler, SnapshotCatalog};
//!
//! #[tokio::main]
//! async fn main() -> pg_mysql_reconcile::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let source = Arc::new(SnapshotCatalog::load(&config.source.snapshot)?);
//!     let target = Arc::new(SnapshotCatalog::load(&config.target.snapshot)?);
//!
//!     let reconciler = Reconciler::from_config(&config, source, target);
//!     let report = reconciler.run(&mut MemorySink::new()).await?;
//!     println!("passed: {}", report.passed());
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod dialect;
pub mod error;
pub mod report;
pub mod verify;

// Re-exports for convenient access
pub use catalog::{SnapshotCatalog, SnapshotTable};
pub use config::{Config, SourceConfig, TargetConfig, ValidationConfig};
pub use dialect::{map_type, CreateTableBuilder, PostgresToMysqlMapper};
pub use error::{ReconcileError, Result};
pub use report::{JsonLinesSink, MemorySink, ReportEntry, ReportSink};
pub use verify::{Facet, Reconciler, ValidationReport};
