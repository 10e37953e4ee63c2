//! JSON catalog snapshots.
//!
//! A snapshot is a dump of one schema: table definitions plus row data, with
//! row values in extended JSON (see [`Value::from_json`]).
//!
//! ```json
//! {
//!   "dialect": "postgres",
//!   "schema": "public",
//!   "tables": [
//!     {
//!       "name": "users",
//!       "primary_key": ["id"],
//!       "columns": [
//!         {"name": "id", "native_type": "integer", "nullable": false},
//!         {"name": "created_at", "native_type": "timestamp with time zone"}
//!       ],
//!       "row_count": 1000,
//!       "rows": [{"id": 1, "created_at": {"$date": "2024-01-15T10:30:00Z"}}]
//!     }
//!   ]
//! }
//! ```
//!
//! `row_count` defaults to the number of rows in the file, so a snapshot
//! can carry an exact count alongside a partial row sample.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::schema::{ColumnDescriptor, TableSnapshot};
use crate::core::traits::CatalogReader;
use crate::core::value::{Row, Value};
use crate::error::{ReconcileError, Result};

/// One table in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotTable {
    pub name: String,

    pub columns: Vec<ColumnDescriptor>,

    #[serde(default)]
    pub primary_key: Vec<String>,

    /// Exact row count; defaults to `rows.len()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,

    #[serde(default)]
    pub rows: Vec<Row>,
}

impl SnapshotTable {
    /// Create a table with no rows.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name: name.into(),
            columns,
            primary_key: Vec::new(),
            row_count: None,
            rows: Vec::new(),
        }
        .stamped()
    }

    /// Set the row data.
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    /// Override the reported row count.
    pub fn with_row_count(mut self, count: i64) -> Self {
        self.row_count = Some(count);
        self
    }

    /// Set the primary key columns.
    pub fn with_primary_key(mut self, columns: Vec<String>) -> Self {
        self.primary_key = columns;
        self
    }

    /// Reported row count.
    pub fn count(&self) -> i64 {
        self.row_count.unwrap_or(self.rows.len() as i64)
    }

    /// Table definition without row data.
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot::new(&self.name, self.columns.clone())
            .with_primary_key(self.primary_key.clone())
    }

    /// Fill in table names and 1-based ordinals omitted from the file.
    fn stamped(mut self) -> Self {
        for (i, column) in self.columns.iter_mut().enumerate() {
            column.table = self.name.clone();
            if column.ordinal_position == 0 {
                column.ordinal_position = i as u32 + 1;
            }
        }
        self
    }

    fn rows_ordered_by(&self, key: &str) -> Vec<(i64, &Row)> {
        let mut rows: Vec<(i64, &Row)> = self
            .rows
            .iter()
            .filter_map(|row| {
                row.iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(key))
                    .and_then(|(_, v)| v.as_i64())
                    .map(|id| (id, row))
            })
            .collect();
        rows.sort_by_key(|(id, _)| *id);
        rows
    }
}

/// A catalog reader backed by an in-memory snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotCatalog {
    pub dialect: String,
    pub schema: String,
    pub tables: Vec<SnapshotTable>,
}

impl SnapshotCatalog {
    /// Build a catalog from tables.
    pub fn new(
        dialect: impl Into<String>,
        schema: impl Into<String>,
        tables: Vec<SnapshotTable>,
    ) -> Self {
        Self {
            dialect: dialect.into(),
            schema: schema.into(),
            tables: tables.into_iter().map(SnapshotTable::stamped).collect(),
        }
    }

    /// Load a snapshot file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content).map_err(|e| match e {
            ReconcileError::Json(err) => {
                ReconcileError::Snapshot(format!("{}: {}", path.display(), err))
            }
            other => other,
        })?;
        debug!(
            "Loaded {} snapshot {} ({} tables)",
            catalog.dialect,
            path.display(),
            catalog.tables.len()
        );
        Ok(catalog)
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: SnapshotCatalog = serde_json::from_str(json)?;
        if raw.schema.is_empty() {
            return Err(ReconcileError::Snapshot("snapshot schema is empty".into()));
        }
        Ok(Self::new(raw.dialect, raw.schema, raw.tables))
    }

    /// Table definitions in file order.
    pub fn table_snapshots(&self) -> Vec<TableSnapshot> {
        self.tables.iter().map(SnapshotTable::snapshot).collect()
    }

    /// Look up a table, checking the schema first.
    fn table(&self, schema: &str, table: &str) -> Result<&SnapshotTable> {
        self.check_schema(schema)?;
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(table))
            .ok_or_else(|| {
                ReconcileError::catalog(table, format!("table not found in {}", self.schema))
            })
    }

    fn check_schema(&self, schema: &str) -> Result<()> {
        if self.schema.eq_ignore_ascii_case(schema) {
            Ok(())
        } else {
            Err(ReconcileError::Snapshot(format!(
                "snapshot holds schema '{}', not '{}'",
                self.schema, schema
            )))
        }
    }
}

#[async_trait]
impl CatalogReader for SnapshotCatalog {
    async fn list_tables(&self, schema: &str) -> Result<Vec<String>> {
        self.check_schema(schema)?;
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn list_columns(&self, schema: &str) -> Result<Vec<ColumnDescriptor>> {
        self.check_schema(schema)?;
        Ok(self
            .tables
            .iter()
            .flat_map(|t| t.columns.iter().cloned())
            .collect())
    }

    async fn describe_table(&self, schema: &str, table: &str) -> Result<Vec<ColumnDescriptor>> {
        Ok(self.table(schema, table)?.columns.clone())
    }

    async fn count(&self, schema: &str, table: &str) -> Result<i64> {
        Ok(self.table(schema, table)?.count())
    }

    async fn sample_rows(
        &self,
        schema: &str,
        table: &str,
        order_key: &str,
        limit: usize,
    ) -> Result<Vec<Row>> {
        Ok(self
            .table(schema, table)?
            .rows_ordered_by(order_key)
            .into_iter()
            .take(limit)
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn rows_by_ids(
        &self,
        schema: &str,
        table: &str,
        key: &str,
        ids: &[i64],
    ) -> Result<Vec<Row>> {
        Ok(self
            .table(schema, table)?
            .rows_ordered_by(key)
            .into_iter()
            .filter(|(id, _)| ids.contains(id))
            .map(|(_, row)| row.clone())
            .collect())
    }

    fn dialect(&self) -> &str {
        &self.dialect
    }
}

/// Build a row from `(column, value)` pairs.
pub fn row<I, K, V>(pairs: I) -> Row
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const SNAPSHOT: &str = r#"{
        "dialect": "postgres",
        "schema": "public",
        "tables": [
            {
                "name": "users",
                "primary_key": ["id"],
                "columns": [
                    {"name": "id", "native_type": "integer", "nullable": false},
                    {"name": "created_at", "native_type": "timestamp with time zone"}
                ],
                "row_count": 1000,
                "rows": [
                    {"id": 3, "created_at": {"$date": "2024-01-03T00:00:00Z"}},
                    {"id": 1, "created_at": {"$date": "2024-01-01T00:00:00Z"}},
                    {"id": 2, "created_at": null}
                ]
            },
            {"name": "empty", "columns": [{"name": "id", "native_type": "bigint"}]}
        ]
    }"#;

    #[tokio::test]
    async fn test_parse_and_list() {
        let catalog = SnapshotCatalog::from_json(SNAPSHOT).unwrap();
        assert_eq!(catalog.dialect(), "postgres");
        assert_eq!(
            catalog.list_tables("public").await.unwrap(),
            vec!["users", "empty"]
        );

        let columns = catalog.list_columns("public").await.unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[1].table, "users");
        assert_eq!(columns[1].ordinal_position, 2);
    }

    #[tokio::test]
    async fn test_counts() {
        let catalog = SnapshotCatalog::from_json(SNAPSHOT).unwrap();
        assert_eq!(catalog.count("public", "users").await.unwrap(), 1000);
        assert_eq!(catalog.count("public", "EMPTY").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sample_rows_ordered_and_limited() {
        let catalog = SnapshotCatalog::from_json(SNAPSHOT).unwrap();
        let rows = catalog.sample_rows("public", "users", "id", 2).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(
            rows[0]["created_at"],
            Value::Temporal(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_rows_by_ids() {
        let catalog = SnapshotCatalog::from_json(SNAPSHOT).unwrap();
        let rows = catalog
            .rows_by_ids("public", "users", "id", &[3, 1, 99])
            .await
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_unknown_table_and_schema() {
        let catalog = SnapshotCatalog::from_json(SNAPSHOT).unwrap();
        let err = catalog.count("public", "ghosts").await.unwrap_err();
        assert!(matches!(err, ReconcileError::Catalog { .. }));

        let err = catalog.list_tables("other").await.unwrap_err();
        assert!(matches!(err, ReconcileError::Snapshot(_)));
    }

    #[test]
    fn test_load_reports_path_on_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = SnapshotCatalog::load(&path).unwrap_err();
        assert!(matches!(err, ReconcileError::Snapshot(_)));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_table_snapshots() {
        let catalog = SnapshotCatalog::from_json(SNAPSHOT).unwrap();
        let tables = catalog.table_snapshots();
        assert_eq!(tables[0].primary_key, vec!["id"]);
        assert!(!tables[0].columns[0].nullable);
    }

    #[test]
    fn test_row_helper() {
        let r = row([("id", Value::Int(1)), ("name", Value::from("a"))]);
        assert_eq!(r.len(), 2);
        assert_eq!(r["name"], Value::from("a"));
    }
}
