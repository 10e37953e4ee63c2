//! Result types for schema, count and sample reconciliation.
//!
//! All of these are plain values, built during one run and handed to the
//! report sink. They serialize to JSON for `--output-json` and JSON Lines
//! reports.

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::value::Value;

/// Per-table schema diff status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaDiffStatus {
    /// Every source column has a target column.
    Ok,
    /// The table does not exist in the target.
    TableMissing,
    /// A source column has no target column.
    ColumnMissing,
    /// Target metadata could not be read for this table.
    Error,
}

impl SchemaDiffStatus {
    /// Check if this status is a clean match.
    pub fn is_ok(&self) -> bool {
        matches!(self, SchemaDiffStatus::Ok)
    }
}

/// One schema diff entry.
///
/// A table yields either a single `ok`/`table_missing`/`error` entry or one
/// `column_missing` entry per missing column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDiffResult {
    pub table: String,
    pub status: SchemaDiffStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
}

impl SchemaDiffResult {
    pub fn ok(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            status: SchemaDiffStatus::Ok,
            column: None,
            issue: None,
        }
    }

    pub fn table_missing(table: impl Into<String>) -> Self {
        let table = table.into();
        Self {
            issue: Some(format!("Table {} does not exist in target", table)),
            table,
            status: SchemaDiffStatus::TableMissing,
            column: None,
        }
    }

    pub fn column_missing(table: impl Into<String>, column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            table: table.into(),
            status: SchemaDiffStatus::ColumnMissing,
            issue: Some(format!("Column {} missing in target", column)),
            column: Some(column),
        }
    }

    pub fn error(table: impl Into<String>, issue: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            status: SchemaDiffStatus::Error,
            column: None,
            issue: Some(issue.into()),
        }
    }
}

/// Row count comparison for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountReconciliationResult {
    pub table: String,
    pub source_count: i64,
    pub target_count: i64,
    /// Exact equality; there is no tolerance.
    pub matches: bool,
}

impl CountReconciliationResult {
    pub fn new(table: impl Into<String>, source_count: i64, target_count: i64) -> Self {
        Self {
            table: table.into(),
            source_count,
            target_count,
            matches: source_count == target_count,
        }
    }

    /// Signed difference (source - target).
    pub fn difference(&self) -> i64 {
        self.source_count - self.target_count
    }
}

/// Why a sampled value or row failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// No target row for the source row's identity key.
    Missing,
    /// Same kind of value, different content.
    Different,
    /// Values of different kinds after normalization.
    TypeMismatch,
}

impl MismatchKind {
    /// Classify a failed column comparison.
    pub fn classify(source: &Value, normalized_target: &Value) -> Self {
        if source.kind() == normalized_target.kind() {
            MismatchKind::Different
        } else {
            MismatchKind::TypeMismatch
        }
    }
}

/// One mismatch in a sampled table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    pub row_id: i64,
    /// `None` for a missing row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub source_value: Option<Value>,
    /// `None` for a missing row or a column the target row lacks.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub target_value: Option<Value>,
    pub kind: MismatchKind,
}

/// A field that appears in the input is `Some`, even when it holds `null`.
fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl Mismatch {
    /// A source row with no target counterpart.
    pub fn missing_row(row_id: i64) -> Self {
        Self {
            row_id,
            column: None,
            source_value: None,
            target_value: None,
            kind: MismatchKind::Missing,
        }
    }
}

/// Comparison of one source column against its normalized target value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOutcome {
    pub column: String,
    pub equal: bool,
    pub source_value: Value,
    /// Target value after normalization; `None` when the target row lacks the column.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub normalized_target_value: Option<Value>,
}

impl ColumnOutcome {
    /// Classify this column as a mismatch. An absent target column is `missing`.
    pub fn mismatch_kind(&self) -> MismatchKind {
        match &self.normalized_target_value {
            Some(target) => MismatchKind::classify(&self.source_value, target),
            None => MismatchKind::Missing,
        }
    }
}

/// Column-by-column comparison of one row pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowComparison {
    pub row_id: i64,
    pub columns: Vec<ColumnOutcome>,
}

impl RowComparison {
    /// True when every compared column is equal.
    pub fn is_match(&self) -> bool {
        self.columns.iter().all(|c| c.equal)
    }

    /// Unequal columns as mismatch descriptors.
    pub fn mismatches(&self) -> Vec<Mismatch> {
        self.columns
            .iter()
            .filter(|c| !c.equal)
            .map(|c| Mismatch {
                row_id: self.row_id,
                column: Some(c.column.clone()),
                source_value: Some(c.source_value.clone()),
                target_value: c.normalized_target_value.clone(),
                kind: c.mismatch_kind(),
            })
            .collect()
    }
}

/// Outcome of sampled row reconciliation for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleValidationResult {
    pub table: String,
    pub passed: bool,
    pub rows_checked: usize,
    pub rows_matched: usize,
    pub mismatches: Vec<Mismatch>,
    /// Set when rows could not be paired at all (e.g. no identity key).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
}

/// Which check a per-table error interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Schema,
    Count,
    Sample,
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Facet::Schema => write!(f, "schema"),
            Facet::Count => write!(f, "count"),
            Facet::Sample => write!(f, "sample"),
        }
    }
}

/// A catalog failure that prevented one check for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableError {
    pub table: String,
    pub check: Facet,
    pub message: String,
}

/// Aggregated result of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub schema: Vec<SchemaDiffResult>,
    /// Source tables absent from the target (informational).
    pub missing_tables: Vec<String>,
    pub counts: Vec<CountReconciliationResult>,
    pub samples: Vec<SampleValidationResult>,
    pub errors: Vec<TableError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,
    pub duration_ms: u64,
}

impl ValidationReport {
    /// True when every facet that ran found no difference and no table errored.
    pub fn passed(&self) -> bool {
        self.schema.iter().all(|s| s.status.is_ok())
            && self.counts.iter().all(|c| c.matches)
            && self.samples.iter().all(|s| s.passed)
            && self.errors.is_empty()
    }

    /// Convert to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_result_exact_match() {
        let r = CountReconciliationResult::new("users", 1000, 999);
        assert!(!r.matches);
        assert_eq!(r.difference(), 1);
        assert!(CountReconciliationResult::new("users", 0, 0).matches);
    }

    #[test]
    fn test_schema_status_serializes_snake_case() {
        let json = serde_json::to_string(&SchemaDiffResult::table_missing("b")).unwrap();
        assert!(json.contains(r#""status":"table_missing""#));
        assert!(!json.contains("column"));
    }

    #[test]
    fn test_mismatch_kind_classification() {
        assert_eq!(
            MismatchKind::classify(&Value::Int(1), &Value::Int(2)),
            MismatchKind::Different
        );
        assert_eq!(
            MismatchKind::classify(&Value::Int(1), &Value::from("1")),
            MismatchKind::TypeMismatch
        );
    }

    #[test]
    fn test_row_comparison_mismatches() {
        let row = RowComparison {
            row_id: 7,
            columns: vec![
                ColumnOutcome {
                    column: "name".into(),
                    equal: true,
                    source_value: Value::from("a"),
                    normalized_target_value: Some(Value::from("a")),
                },
                ColumnOutcome {
                    column: "qty".into(),
                    equal: false,
                    source_value: Value::Int(1),
                    normalized_target_value: Some(Value::Null),
                },
                ColumnOutcome {
                    column: "note".into(),
                    equal: false,
                    source_value: Value::Null,
                    normalized_target_value: None,
                },
            ],
        };
        assert!(!row.is_match());
        let mismatches = row.mismatches();
        assert_eq!(mismatches.len(), 2);
        assert_eq!(mismatches[0].column.as_deref(), Some("qty"));
        assert_eq!(mismatches[0].kind, MismatchKind::TypeMismatch);
        assert_eq!(mismatches[1].column.as_deref(), Some("note"));
        assert_eq!(mismatches[1].kind, MismatchKind::Missing);
        assert_eq!(mismatches[1].target_value, None);
    }

    #[test]
    fn test_mismatch_keeps_null_values_through_json() {
        let mismatch = Mismatch {
            row_id: 3,
            column: Some("deleted_at".into()),
            source_value: Some(Value::Null),
            target_value: Some(Value::from("2024-01-01")),
            kind: MismatchKind::TypeMismatch,
        };
        let json = serde_json::to_string(&mismatch).unwrap();
        assert!(json.contains(r#""source_value":null"#));

        let parsed: Mismatch = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, mismatch);

        let missing: Mismatch = serde_json::from_str(
            &serde_json::to_string(&Mismatch::missing_row(4)).unwrap(),
        )
        .unwrap();
        assert_eq!(missing.source_value, None);
        assert_eq!(missing.target_value, None);
    }

    #[test]
    fn test_report_passed() {
        let mut report = ValidationReport::default();
        assert!(report.passed());

        report.counts.push(CountReconciliationResult::new("t", 1, 1));
        assert!(report.passed());

        report.schema.push(SchemaDiffResult::column_missing("t", "c"));
        assert!(!report.passed());
    }
}
