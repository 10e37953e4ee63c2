//! Column-set comparison between source and target snapshots.
//!
//! Columns are matched by name only, case-insensitively. Types are not
//! compared; the diff looks for structural drift such as dropped or renamed
//! columns. Output order follows the source snapshot.

use crate::core::schema::{ColumnDescriptor, TableSnapshot};

use super::types::SchemaDiffResult;

/// What is known about a table's columns on the target side.
#[derive(Debug, Clone, Copy)]
pub enum TargetColumns<'a> {
    /// The table does not exist in the target.
    Absent,
    /// The metadata query for this table failed.
    Failed(&'a str),
    /// The table exists with these columns.
    Present(&'a [ColumnDescriptor]),
}

/// Diff two sets of snapshots.
///
/// Tables missing from the target get a single `table_missing` entry and no
/// column-level entries.
pub fn diff_schemas(source: &[TableSnapshot], target: &[TableSnapshot]) -> Vec<SchemaDiffResult> {
    source
        .iter()
        .flat_map(|table| {
            let columns = match target.iter().find(|t| t.has_name(&table.name)) {
                Some(t) => TargetColumns::Present(&t.columns),
                None => TargetColumns::Absent,
            };
            diff_table(table, columns)
        })
        .collect()
}

/// Diff one source table against what is known of its target.
pub fn diff_table(source: &TableSnapshot, target: TargetColumns<'_>) -> Vec<SchemaDiffResult> {
    let columns = match target {
        TargetColumns::Absent => return vec![SchemaDiffResult::table_missing(&source.name)],
        TargetColumns::Failed(message) => {
            return vec![SchemaDiffResult::error(&source.name, message)]
        }
        TargetColumns::Present(columns) => columns,
    };

    let missing: Vec<SchemaDiffResult> = source
        .columns
        .iter()
        .filter(|sc| !columns.iter().any(|tc| tc.has_name(&sc.name)))
        .map(|sc| SchemaDiffResult::column_missing(&source.name, &sc.name))
        .collect();

    if missing.is_empty() {
        vec![SchemaDiffResult::ok(&source.name)]
    } else {
        missing
    }
}

/// Source table names with no case-insensitive match among `target_tables`.
pub fn missing_tables(source: &[TableSnapshot], target_tables: &[String]) -> Vec<String> {
    source
        .iter()
        .filter(|s| !target_tables.iter().any(|t| s.has_name(t)))
        .map(|s| s.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::types::SchemaDiffStatus;

    fn table(name: &str, columns: &[&str]) -> TableSnapshot {
        TableSnapshot::new(
            name,
            columns
                .iter()
                .map(|c| ColumnDescriptor::new(name, *c, "text"))
                .collect(),
        )
    }

    #[test]
    fn test_missing_table_has_no_column_entries() {
        let source = vec![table("a", &["id"]), table("b", &["id", "name"])];
        let target = vec![table("a", &["id"])];

        let diff = diff_schemas(&source, &target);
        assert_eq!(diff.len(), 2);
        assert_eq!(diff[0].table, "a");
        assert_eq!(diff[0].status, SchemaDiffStatus::Ok);
        assert_eq!(diff[1].table, "b");
        assert_eq!(diff[1].status, SchemaDiffStatus::TableMissing);
        assert!(diff[1].column.is_none());
    }

    #[test]
    fn test_one_entry_per_missing_column() {
        let source = vec![table("users", &["id", "email", "phone", "name"])];
        let target = vec![table("users", &["id", "name"])];

        let diff = diff_schemas(&source, &target);
        let cols: Vec<_> = diff.iter().filter_map(|d| d.column.as_deref()).collect();
        assert_eq!(cols, vec!["email", "phone"]);
        assert!(diff.iter().all(|d| d.status == SchemaDiffStatus::ColumnMissing));
    }

    #[test]
    fn test_case_insensitive_match() {
        let source = vec![table("Users", &["ID", "Email"])];
        let target = vec![table("users", &["id", "email"])];
        let diff = diff_schemas(&source, &target);
        assert_eq!(diff, vec![SchemaDiffResult::ok("Users")]);
    }

    #[test]
    fn test_extra_target_columns_ignored() {
        let source = vec![table("t", &["id"])];
        let target = vec![table("t", &["id", "migrated_at"])];
        assert_eq!(diff_schemas(&source, &target)[0].status, SchemaDiffStatus::Ok);
    }

    #[test]
    fn test_output_follows_source_order() {
        let source = vec![table("z", &["id"]), table("a", &["id"])];
        let target = vec![table("a", &["id"]), table("z", &["id"])];
        let names: Vec<_> = diff_schemas(&source, &target)
            .into_iter()
            .map(|d| d.table)
            .collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn test_failed_metadata_becomes_error_entry() {
        let source = table("t", &["id"]);
        let diff = diff_table(&source, TargetColumns::Failed("timeout"));
        assert_eq!(diff, vec![SchemaDiffResult::error("t", "timeout")]);
    }

    #[test]
    fn test_deterministic() {
        let source = vec![table("a", &["x", "y"]), table("b", &["z"])];
        let target = vec![table("a", &["x"])];
        assert_eq!(diff_schemas(&source, &target), diff_schemas(&source, &target));
    }

    #[test]
    fn test_missing_tables() {
        let source = vec![table("A", &["id"]), table("B", &["id"])];
        assert_eq!(missing_tables(&source, &["a".to_string()]), vec!["B"]);
    }
}
