//! Core traits for dialect-agnostic validation.
//!
//! - [`CatalogReader`]: metadata and row access for one side of a migration
//! - [`TypeMapper`]: maps column types between source and target dialects
//!
//! Catalog readers are the I/O boundary. Everything behind them in this
//! crate works on data that has already been fetched.

use async_trait::async_trait;

use crate::error::Result;

use super::schema::ColumnDescriptor;
use super::value::Row;

/// Read schema metadata and rows from one database.
///
/// Implementations own their connections; the reconciler only holds a
/// shared handle and never retries or pools on their behalf.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// List table names in a schema.
    async fn list_tables(&self, schema: &str) -> Result<Vec<String>>;

    /// List every column in a schema, across all tables.
    async fn list_columns(&self, schema: &str) -> Result<Vec<ColumnDescriptor>>;

    /// Columns of a single table, in declaration order.
    ///
    /// The default implementation filters [`list_columns`](Self::list_columns);
    /// readers with a cheaper per-table query should override it.
    async fn describe_table(&self, schema: &str, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let mut columns: Vec<ColumnDescriptor> = self
            .list_columns(schema)
            .await?
            .into_iter()
            .filter(|c| c.table.eq_ignore_ascii_case(table))
            .collect();
        columns.sort_by_key(|c| c.ordinal_position);
        Ok(columns)
    }

    /// Exact row count for a table.
    async fn count(&self, schema: &str, table: &str) -> Result<i64>;

    /// Up to `limit` rows ordered ascending by `order_key`.
    async fn sample_rows(
        &self,
        schema: &str,
        table: &str,
        order_key: &str,
        limit: usize,
    ) -> Result<Vec<Row>>;

    /// Rows whose `key` column is one of `ids`, ordered ascending by `key`.
    async fn rows_by_ids(&self, schema: &str, table: &str, key: &str, ids: &[i64])
        -> Result<Vec<Row>>;

    /// Dialect identifier (e.g., "postgres", "mysql").
    fn dialect(&self) -> &str;
}

/// Maps data types between source and target database dialects.
///
/// One implementation per source→target pair.
pub trait TypeMapper: Send + Sync {
    /// Get the source dialect name.
    fn source_dialect(&self) -> &str;

    /// Get the target dialect name.
    fn target_dialect(&self) -> &str;

    /// Map a source type to a target declaration.
    ///
    /// Must be total: unknown types map to a fallback, never fail.
    fn map_type(
        &self,
        native_type: &str,
        max_length: Option<u32>,
        precision: Option<u32>,
        scale: Option<u32>,
    ) -> TypeMapping;

    /// Map a column definition from source to target.
    fn map_column(&self, col: &ColumnDescriptor) -> ColumnMapping {
        let mapping = self.map_type(&col.native_type, col.max_length, col.precision, col.scale);

        ColumnMapping {
            name: col.name.clone(),
            target_type: mapping.target_type,
            is_nullable: col.nullable,
            warning: mapping.warning,
        }
    }
}

/// Result of mapping a column from source to target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Target column name (same as source).
    pub name: String,
    /// Target data type string.
    pub target_type: String,
    /// Whether the column is nullable.
    pub is_nullable: bool,
    /// Warning message if the mapping is lossy.
    pub warning: Option<String>,
}

/// Result of mapping a type from source to target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    /// Target type string (e.g., "VARCHAR(255)", "BIGINT").
    pub target_type: String,
    /// Whether this mapping loses data or precision.
    pub is_lossy: bool,
    /// Warning message for lossy mappings.
    pub warning: Option<String>,
}

impl TypeMapping {
    /// Create a lossless type mapping.
    pub fn lossless(target_type: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            is_lossy: false,
            warning: None,
        }
    }

    /// Create a lossy type mapping with a warning.
    pub fn lossy(target_type: impl Into<String>, warning: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            is_lossy: true,
            warning: Some(warning.into()),
        }
    }
}
