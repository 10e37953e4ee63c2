//! Sampled row reconciliation.
//!
//! Both sides are sorted by the identity key and paired with a merge walk.
//! The source row decides which columns are compared; extra target columns
//! are ignored.

use tracing::debug;

use crate::core::value::{Row, Value};

use super::compare::are_equal;
use super::normalize::normalize;
use super::types::{ColumnOutcome, Mismatch, RowComparison, SampleValidationResult};

/// Compare every source column of one row pair.
///
/// A source column the target row lacks is never equal, whatever its value.
pub fn compare_row(row_id: i64, source: &Row, target: &Row) -> RowComparison {
    let columns = source
        .iter()
        .map(|(name, source_value)| {
            let normalized = lookup(target, name).map(|v| normalize(v.clone(), source_value));
            ColumnOutcome {
                column: name.clone(),
                equal: normalized
                    .as_ref()
                    .is_some_and(|n| are_equal(source_value, n, name)),
                source_value: source_value.clone(),
                normalized_target_value: normalized,
            }
        })
        .collect();

    RowComparison { row_id, columns }
}

/// Reconcile one table's sample.
///
/// A source row with no target counterpart is a `missing` mismatch and fails
/// the table; every other row is still compared. An empty sample passes.
pub fn reconcile_sample(
    table: &str,
    identity_column: &str,
    source_rows: &[Row],
    target_rows: &[Row],
) -> SampleValidationResult {
    let mut result = SampleValidationResult {
        table: table.to_string(),
        passed: true,
        rows_checked: source_rows.len(),
        rows_matched: 0,
        mismatches: Vec::new(),
        issue: None,
    };

    let source = match keyed(source_rows, identity_column) {
        Ok(rows) => rows,
        Err(position) => {
            result.passed = false;
            result.issue = Some(format!(
                "Source row {} has no integer {} column",
                position, identity_column
            ));
            return result;
        }
    };

    // Target rows without a usable key cannot pair with anything.
    let mut target: Vec<(i64, &Row)> = target_rows
        .iter()
        .filter_map(|row| identity(row, identity_column).map(|id| (id, row)))
        .collect();
    target.sort_by_key(|(id, _)| *id);

    let mut cursor = 0;
    for (id, source_row) in source {
        while cursor < target.len() && target[cursor].0 < id {
            cursor += 1;
        }

        match target.get(cursor) {
            Some((target_id, target_row)) if *target_id == id => {
                let comparison = compare_row(id, source_row, target_row);
                if comparison.is_match() {
                    result.rows_matched += 1;
                } else {
                    debug!("{}: row {} differs", table, id);
                    result.mismatches.extend(comparison.mismatches());
                }
                cursor += 1;
            }
            _ => {
                debug!("{}: row {} missing in target", table, id);
                result.mismatches.push(Mismatch::missing_row(id));
            }
        }
    }

    result.passed = result.mismatches.is_empty();
    result
}

/// Identity keys of the ids a reconciler should request from the target.
pub fn identity_keys(rows: &[Row], identity_column: &str) -> Vec<i64> {
    let mut ids: Vec<i64> = rows
        .iter()
        .filter_map(|row| identity(row, identity_column))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Rows sorted by identity key, or the position of the first row without one.
fn keyed<'a>(rows: &'a [Row], identity_column: &str) -> Result<Vec<(i64, &'a Row)>, usize> {
    let mut keyed = Vec::with_capacity(rows.len());
    for (position, row) in rows.iter().enumerate() {
        match identity(row, identity_column) {
            Some(id) => keyed.push((id, row)),
            None => return Err(position),
        }
    }
    keyed.sort_by_key(|(id, _)| *id);
    Ok(keyed)
}

fn identity(row: &Row, identity_column: &str) -> Option<i64> {
    lookup(row, identity_column).and_then(Value::as_i64)
}

/// Exact column lookup, falling back to a case-insensitive match.
fn lookup<'a>(row: &'a Row, column: &str) -> Option<&'a Value> {
    row.get(column).or_else(|| {
        row.iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    })
}
