//! Value equivalence after normalization.
//!
//! [`are_equal`] is a short-circuiting cascade:
//!
//! 1. Strict equality (numbers compare across Int/Float/Decimal)
//! 2. Both NULL
//! 3. Both temporal, within [`DATE_TOLERANCE_MS`]
//! 4. Both structured, identical compact serialization
//! 5. Both text on a `*_at` / `*date*` column, both parse as date/times within tolerance
//! 6. Otherwise not equal
//!
//! Structured equality is key-order sensitive: `{"a":1,"b":2}` and
//! `{"b":2,"a":1}` are different.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::core::value::{parse_temporal, Value};

/// Allowed drift between two date/times, in milliseconds (24 hours).
///
/// Absorbs time zone normalization differences between the two engines.
pub const DATE_TOLERANCE_MS: i64 = 86_400_000;

/// Decide whether two values are equivalent.
///
/// `column` is only consulted for timestamp-like text (rule 5).
pub fn are_equal(left: &Value, right: &Value, column: &str) -> bool {
    if strictly_equal(left, right) {
        return true;
    }

    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Temporal(a), Value::Temporal(b)) => within_tolerance(a, b),
        (Value::Json(a), Value::Json(b)) => structured_equal(a, b),
        (Value::Text(a), Value::Text(b)) if is_timestamp_column(column) => {
            timestamp_strings_within_tolerance(a, b)
        }
        _ => false,
    }
}

/// Same variant and same value, with numeric variants compared by value.
///
/// Temporal and structured values are left to their own rules.
fn strictly_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Text(a), Value::Text(b)) => a == b,
        (Value::Bytes(a), Value::Bytes(b)) => a == b,

        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Decimal(a), Value::Decimal(b)) => a == b,
        (Value::Int(i), Value::Decimal(d)) | (Value::Decimal(d), Value::Int(i)) => {
            Decimal::from(*i) == *d
        }
        (Value::Float(f), Value::Decimal(d)) | (Value::Decimal(d), Value::Float(f)) => {
            Decimal::from_f64(*f).map(|v| v == *d).unwrap_or(false)
        }
        (Value::Float(_), _) | (_, Value::Float(_)) => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },

        _ => false,
    }
}

fn within_tolerance(a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
    (*a - *b).abs() <= Duration::milliseconds(DATE_TOLERANCE_MS)
}

fn structured_equal(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    match (serde_json::to_string(a), serde_json::to_string(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Naming convention for timestamp columns: name contains `_at` or `date`.
///
/// Case-sensitive.
fn is_timestamp_column(column: &str) -> bool {
    column.contains("_at") || column.contains("date")
}

fn timestamp_strings_within_tolerance(a: &str, b: &str) -> bool {
    match (parse_temporal(a), parse_temporal(b)) {
        (Some(a), Some(b)) => within_tolerance(&a, &b),
        _ => false,
    }
}
