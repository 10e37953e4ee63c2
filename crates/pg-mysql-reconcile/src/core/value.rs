//! Tagged row values for cross-dialect comparison.
//!
//! Both catalog readers hand rows over as maps of column name to [`Value`].
//! The variant, not a declared column type, is what normalization and
//! equivalence checks dispatch on.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map as JsonMap, Value as JsonValue};

/// A single row: column name to value, in the reader's column order.
pub type Row = IndexMap<String, Value>;

/// Timestamp layouts with an explicit UTC offset (e.g. PostgreSQL text output).
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Timestamp layouts without an offset; interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Runtime value as produced by a catalog reader.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,

    /// Native boolean.
    Bool(bool),

    /// Integer of any width.
    Int(i64),

    /// Floating point (real/double).
    Float(f64),

    /// Fixed-point decimal (numeric/decimal).
    Decimal(Decimal),

    /// Character data.
    Text(String),

    /// Date or timestamp, normalized to UTC.
    Temporal(DateTime<Utc>),

    /// Structured data (json/jsonb/JSON).
    Json(JsonValue),

    /// Binary data (bytea/BLOB).
    Bytes(Vec<u8>),
}

/// Coarse classification of a [`Value`], used to tell a representation
/// mismatch apart from a plain value difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    Text,
    Temporal,
    Structured,
    Binary,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::Temporal => "temporal",
            ValueKind::Structured => "structured",
            ValueKind::Binary => "binary",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Classify the value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) | Value::Float(_) | Value::Decimal(_) => ValueKind::Number,
            Value::Text(_) => ValueKind::Text,
            Value::Temporal(_) => ValueKind::Temporal,
            Value::Json(_) => ValueKind::Structured,
            Value::Bytes(_) => ValueKind::Binary,
        }
    }

    /// Numeric view as `f64`, if the value is numeric.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Decimal(v) => v.to_f64(),
            _ => None,
        }
    }

    /// Integer view, accepting integral decimals, floats and numeric text.
    ///
    /// Used to read identity keys, which may arrive as `numeric` or as text
    /// depending on the reader.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Decimal(v) if v.fract().is_zero() => v.to_i64(),
            Value::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Loose "equals one" test: `value == 1 || value == true`.
    ///
    /// Numeric strings count, so `"1"` is truthy and `"0"` is not.
    #[must_use]
    pub fn is_loosely_one(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(v) => *v == 1,
            Value::Float(v) => *v == 1.0,
            Value::Decimal(v) => *v == Decimal::ONE,
            Value::Text(s) => {
                let trimmed = s.trim();
                !trimmed.is_empty() && trimmed.parse::<f64>().map(|v| v == 1.0).unwrap_or(false)
            }
            _ => false,
        }
    }

    /// Decode a value from extended JSON.
    ///
    /// Plain scalars map to the obvious variants. Single-key wrapper objects
    /// select the richer variants: `{"$date": ..}`, `{"$decimal": ..}`,
    /// `{"$hex": ..}` and `{"$json": ..}`. Anything else structured becomes
    /// [`Value::Json`]. A wrapper whose payload does not parse falls back to
    /// the payload text.
    pub fn from_json(raw: JsonValue) -> Value {
        match raw {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if n.is_u64() {
                    // Past i64::MAX; keep it exact.
                    Decimal::from_str(&n.to_string())
                        .map(Value::Decimal)
                        .unwrap_or_else(|_| Value::Float(n.as_f64().unwrap_or_default()))
                } else {
                    Value::Float(n.as_f64().unwrap_or_default())
                }
            }
            JsonValue::String(s) => Value::Text(s),
            JsonValue::Object(map) if map.len() == 1 => decode_wrapper(map),
            other => Value::Json(other),
        }
    }

    /// Encode as extended JSON (inverse of [`Value::from_json`]).
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(v) => json!(v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(v.to_string())),
            Value::Decimal(v) => json!({ "$decimal": v.to_string() }),
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Temporal(dt) => {
                json!({ "$date": dt.to_rfc3339_opts(SecondsFormat::Millis, true) })
            }
            Value::Json(v) => match v {
                JsonValue::Object(map) if map.len() == 1 && map.keys().all(|k| k.starts_with('$')) => {
                    json!({ "$json": v })
                }
                _ => v.clone(),
            },
            Value::Bytes(b) => json!({ "$hex": hex::encode(b) }),
        }
    }
}

fn decode_wrapper(map: JsonMap<String, JsonValue>) -> Value {
    let (key, inner) = match map.iter().next() {
        Some((k, v)) => (k.clone(), v.clone()),
        None => return Value::Json(JsonValue::Object(map)),
    };

    match (key.as_str(), inner) {
        ("$date", JsonValue::String(s)) => {
            parse_temporal(&s).map(Value::Temporal).unwrap_or(Value::Text(s))
        }
        ("$decimal", JsonValue::String(s)) => Decimal::from_str(s.trim())
            .map(Value::Decimal)
            .unwrap_or(Value::Text(s)),
        ("$hex", JsonValue::String(s)) => hex::decode(s.trim())
            .map(Value::Bytes)
            .unwrap_or(Value::Text(s)),
        ("$json", inner) => Value::Json(inner),
        _ => Value::Json(JsonValue::Object(map)),
    }
}

/// Parse a date/time string the way both dialects commonly render them.
///
/// Accepts RFC 3339, PostgreSQL-style `2024-01-15 10:30:00+00`, MySQL-style
/// `2024-01-15 10:30:00` (taken as UTC), bare dates (midnight UTC) and
/// RFC 2822. Returns `None` for anything else.
pub fn parse_temporal(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    None
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        JsonValue::deserialize(deserializer).map(Value::from_json)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Temporal(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Value::Json(v) => write!(f, "{}", v),
            Value::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Temporal(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
