//! Target-side value normalization.
//!
//! PostgreSQL and MySQL persist the same logical value in different native
//! forms: booleans come back from MySQL as `TINYINT(1)`, JSON columns can
//! arrive as text, timestamps as strings. Before comparing, the target value
//! is reshaped toward the source value's representation.
//!
//! The *runtime variant* of the reference value drives the reshape; declared
//! column types are not consulted.
//!
//! Rules, first match wins:
//! - Either side NULL: target unchanged.
//! - Reference boolean: target becomes `target == 1 || target == true`.
//! - Reference temporal, target text: parse the text as a date/time.
//! - Reference structured, target text: parse the text as JSON.
//! - Reference text, target structured: canonicalize the *reference* text.
//! - Otherwise: target unchanged.
//!
//! Parse failures never propagate; they leave the value as it was.

use serde_json::Value as JsonValue;

use crate::core::value::{parse_temporal, Value};

/// Reshape `target` toward the representation of `reference`.
///
/// Total: never fails and never panics.
///
/// ```
/// use pg_mysql_reconcile::core::Value;
/// use pg_mysql_reconcile::verify::normalize;
///
/// assert_eq!(normalize(Value::Int(1), &Value::Bool(true)), Value::Bool(true));
/// assert_eq!(normalize(Value::Int(0), &Value::Bool(true)), Value::Bool(false));
/// ```
pub fn normalize(target: Value, reference: &Value) -> Value {
    match (reference, target) {
        (Value::Null, target) | (_, target @ Value::Null) => target,

        (Value::Bool(_), target) => Value::Bool(target.is_loosely_one()),

        (Value::Temporal(_), Value::Text(s)) => match parse_temporal(&s) {
            Some(dt) => Value::Temporal(dt),
            None => Value::Text(s),
        },

        (Value::Json(_), Value::Text(s)) => match serde_json::from_str::<JsonValue>(&s) {
            Ok(parsed) => Value::Json(parsed),
            Err(_) => Value::Text(s),
        },

        // Canonicalizes the reference, not the target, and drops the target
        // value. Existing reports depend on this output.
        (Value::Text(reference), Value::Json(_)) => Value::Text(canonical_json_text(reference)),

        (_, target) => target,
    }
}

/// Re-serialize JSON text compactly, or return it unchanged if it does not parse.
fn canonical_json_text(raw: &str) -> String {
    serde_json::from_str::<JsonValue>(raw)
        .and_then(|v| serde_json::to_string(&v))
        .unwrap_or_else(|_| raw.to_string())
}
