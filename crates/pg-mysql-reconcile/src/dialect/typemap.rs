//! PostgreSQL → MySQL type mapping.
//!
//! The base mapping is a fixed lookup table. Widening of identity-shaped
//! integer columns is a separate post-processing step
//! ([`widen_identity_type`]) so callers can turn it off.

use tracing::warn;

use crate::core::schema::ColumnDescriptor;
use crate::core::traits::{ColumnMapping, TypeMapper, TypeMapping};

/// Precision used for `numeric` columns declared without precision/scale.
pub const DEFAULT_DECIMAL_PRECISION: u32 = 10;

/// Scale used for `numeric` columns declared without precision/scale.
pub const DEFAULT_DECIMAL_SCALE: u32 = 2;

/// Declaration emitted for unrecognized source types.
pub const FALLBACK_TYPE: &str = "TEXT";

/// MySQL DECIMAL limits.
const MYSQL_MAX_DECIMAL_PRECISION: u32 = 65;
const MYSQL_MAX_DECIMAL_SCALE: u32 = 30;

/// Longest CHAR(n) MySQL accepts.
const MYSQL_MAX_CHAR_LENGTH: u32 = 255;

/// PostgreSQL → MySQL type mapper.
///
/// Lossless for the common scalar types. `uuid`, `timestamptz`, `timetz` and
/// anything unrecognized are lossy and carry a warning.
///
/// Identity widening is not applied here; see
/// [`CreateTableBuilder::widen_identity_columns`](super::CreateTableBuilder::widen_identity_columns).
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresToMysqlMapper;

impl PostgresToMysqlMapper {
    pub fn new() -> Self {
        Self
    }
}

impl TypeMapper for PostgresToMysqlMapper {
    fn source_dialect(&self) -> &str {
        "postgres"
    }

    fn target_dialect(&self) -> &str {
        "mysql"
    }

    fn map_type(
        &self,
        native_type: &str,
        max_length: Option<u32>,
        precision: Option<u32>,
        scale: Option<u32>,
    ) -> TypeMapping {
        postgres_to_mysql(native_type, max_length, precision, scale)
    }

    fn map_column(&self, col: &ColumnDescriptor) -> ColumnMapping {
        let mapping = self.map_type(&col.native_type, col.max_length, col.precision, col.scale);
        if let Some(warning) = &mapping.warning {
            warn!("Column {}.{}: {}", col.table, col.name, warning);
        }

        ColumnMapping {
            name: col.name.clone(),
            target_type: mapping.target_type,
            is_nullable: col.nullable,
            warning: mapping.warning,
        }
    }
}

/// Map a PostgreSQL type to its MySQL declaration.
///
/// Total: never fails, unknown types come back as `TEXT`.
///
/// ```
/// use pg_mysql_reconcile::dialect::map_type;
///
/// assert_eq!(map_type("character varying", Some(255), None, None), "VARCHAR(255)");
/// assert_eq!(map_type("numeric", None, None, None), "DECIMAL(10,2)");
/// assert_eq!(map_type("tsvector", None, None, None), "TEXT");
/// ```
pub fn map_type(
    native_type: &str,
    max_length: Option<u32>,
    precision: Option<u32>,
    scale: Option<u32>,
) -> String {
    postgres_to_mysql(native_type, max_length, precision, scale).target_type
}

fn postgres_to_mysql(
    pg_type: &str,
    max_length: Option<u32>,
    precision: Option<u32>,
    scale: Option<u32>,
) -> TypeMapping {
    let max_length = max_length.filter(|n| *n > 0);

    match pg_type.trim().to_lowercase().as_str() {
        // Integer types ("integer" is widened in the base table)
        "bigint" | "int8" | "bigserial" | "serial8" => TypeMapping::lossless("BIGINT"),
        "integer" | "int" | "int4" | "serial" | "serial4" => TypeMapping::lossless("BIGINT"),
        "smallint" | "int2" | "smallserial" | "serial2" => TypeMapping::lossless("SMALLINT"),

        // Boolean
        "boolean" | "bool" => TypeMapping::lossless("BOOLEAN"),

        // Character types
        "text" => TypeMapping::lossless("TEXT"),
        "character varying" | "varchar" => match max_length {
            Some(n) => TypeMapping::lossless(format!("VARCHAR({})", n)),
            None => TypeMapping::lossless("TEXT"),
        },
        "character" | "char" | "bpchar" => match max_length {
            Some(n) if n <= MYSQL_MAX_CHAR_LENGTH => TypeMapping::lossless(format!("CHAR({})", n)),
            _ => TypeMapping::lossless("TEXT"),
        },

        // Date/time types
        "timestamp without time zone" | "timestamp" => TypeMapping::lossless("DATETIME"),
        "timestamp with time zone" | "timestamptz" => TypeMapping::lossy(
            "DATETIME",
            "timestamp with time zone loses its offset in MySQL DATETIME; values are stored as UTC.",
        ),
        "date" => TypeMapping::lossless("DATE"),
        "time" | "time without time zone" => TypeMapping::lossless("TIME"),
        "time with time zone" | "timetz" => {
            TypeMapping::lossy("TIME", "time with time zone loses its offset in MySQL TIME.")
        }

        // Fixed point
        "decimal" | "numeric" => map_decimal(precision, scale),

        // Floating point
        "real" | "float4" => TypeMapping::lossless("FLOAT"),
        "double precision" | "float8" => TypeMapping::lossless("DOUBLE"),

        // Structured
        "json" | "jsonb" => TypeMapping::lossless("JSON"),

        // UUID
        "uuid" => TypeMapping::lossy(
            "VARCHAR(36)",
            "UUID stored as VARCHAR(36). UUID functions unavailable.",
        ),

        // Binary
        "bytea" => TypeMapping::lossless("LONGBLOB"),

        _ => TypeMapping::lossy(
            FALLBACK_TYPE,
            format!("Unknown PostgreSQL type '{}' stored as {}.", pg_type, FALLBACK_TYPE),
        ),
    }
}

fn map_decimal(precision: Option<u32>, scale: Option<u32>) -> TypeMapping {
    match (precision, scale) {
        (Some(p), Some(s)) if p > MYSQL_MAX_DECIMAL_PRECISION => TypeMapping::lossy(
            format!(
                "DECIMAL({},{})",
                MYSQL_MAX_DECIMAL_PRECISION,
                s.min(MYSQL_MAX_DECIMAL_SCALE)
            ),
            format!(
                "Precision {} exceeds MySQL max of {}. Truncated.",
                p, MYSQL_MAX_DECIMAL_PRECISION
            ),
        ),
        (Some(p), Some(s)) if s > MYSQL_MAX_DECIMAL_SCALE || s > p => {
            let clamped = s.min(MYSQL_MAX_DECIMAL_SCALE).min(p);
            TypeMapping::lossy(
                format!("DECIMAL({},{})", p, clamped),
                format!(
                    "Scale {} exceeds MySQL limit for DECIMAL({}). Truncated to {}.",
                    s, p, clamped
                ),
            )
        }
        (Some(p), Some(s)) => TypeMapping::lossless(format!("DECIMAL({},{})", p, s)),
        _ => TypeMapping::lossless(format!(
            "DECIMAL({},{})",
            DEFAULT_DECIMAL_PRECISION, DEFAULT_DECIMAL_SCALE
        )),
    }
}

/// Check if a column name looks like an identity or foreign key (`id`, `*_id`).
pub fn is_identity_shaped(column: &str) -> bool {
    let lower = column.to_lowercase();
    lower == "id" || (lower.ends_with("_id") && lower.len() > 3)
}

/// Widen an integer declaration to BIGINT for identity-shaped columns.
///
/// Applied after the base mapping. Non-integer declarations and other
/// column names pass through unchanged.
pub fn widen_identity_type(column: &str, declaration: &str) -> String {
    if !is_identity_shaped(column) {
        return declaration.to_string();
    }

    match declaration.to_uppercase().as_str() {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" => "BIGINT".to_string(),
        _ => declaration.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_table() {
        let cases: &[(&str, &str)] = &[
            ("bigint", "BIGINT"),
            ("integer", "BIGINT"),
            ("smallint", "SMALLINT"),
            ("boolean", "BOOLEAN"),
            ("text", "TEXT"),
            ("timestamp without time zone", "DATETIME"),
            ("timestamp with time zone", "DATETIME"),
            ("date", "DATE"),
            ("time", "TIME"),
            ("real", "FLOAT"),
            ("double precision", "DOUBLE"),
            ("json", "JSON"),
            ("jsonb", "JSON"),
            ("uuid", "VARCHAR(36)"),
            ("bytea", "LONGBLOB"),
        ];
        for (pg, mysql) in cases {
            assert_eq!(map_type(pg, None, None, None), *mysql, "mapping {}", pg);
        }
    }

    #[test]
    fn test_varchar_length() {
        assert_eq!(map_type("character varying", Some(255), None, None), "VARCHAR(255)");
        assert_eq!(map_type("varchar", Some(20), None, None), "VARCHAR(20)");
        assert_eq!(map_type("character varying", None, None, None), "TEXT");
        assert_eq!(map_type("character varying", Some(0), None, None), "TEXT");
    }

    #[test]
    fn test_numeric_precision() {
        assert_eq!(map_type("numeric", None, Some(10), Some(2)), "DECIMAL(10,2)");
        assert_eq!(map_type("decimal", None, Some(18), Some(4)), "DECIMAL(18,4)");
        assert_eq!(map_type("numeric", None, None, None), "DECIMAL(10,2)");
        // Half-specified falls back to the default pair
        assert_eq!(map_type("numeric", None, Some(12), None), "DECIMAL(10,2)");
    }

    #[test]
    fn test_numeric_precision_clamped() {
        let mapping = postgres_to_mysql("numeric", None, Some(100), Some(40));
        assert_eq!(mapping.target_type, "DECIMAL(65,30)");
        assert!(mapping.is_lossy);
    }

    #[test]
    fn test_numeric_scale_clamped() {
        let mapping = postgres_to_mysql("numeric", None, Some(40), Some(35));
        assert_eq!(mapping.target_type, "DECIMAL(40,30)");
        assert!(mapping.is_lossy);

        let mapping = postgres_to_mysql("numeric", None, Some(5), Some(8));
        assert_eq!(mapping.target_type, "DECIMAL(5,5)");
        assert!(mapping.is_lossy);

        assert!(!postgres_to_mysql("numeric", None, Some(65), Some(30)).is_lossy);
    }

    #[test]
    fn test_unknown_type_falls_back_to_text() {
        for t in ["tsvector", "interval", "point", "", "ARRAY", "mystery_type"] {
            let mapping = postgres_to_mysql(t, Some(10), Some(5), Some(1));
            assert_eq!(mapping.target_type, "TEXT");
            assert!(mapping.is_lossy);
        }
    }

    #[test]
    fn test_mapping_is_never_empty() {
        let types = ["bigint", "character varying", "numeric", "uuid", "weird"];
        let lengths = [None, Some(1), Some(70000)];
        for t in types {
            for len in lengths {
                assert!(!map_type(t, len, len, Some(0)).is_empty());
            }
        }
    }

    #[test]
    fn test_case_insensitive_lookup() {
        assert_eq!(map_type("BIGINT", None, None, None), "BIGINT");
        assert_eq!(map_type("Character Varying", Some(5), None, None), "VARCHAR(5)");
    }

    #[test]
    fn test_catalog_aliases() {
        assert_eq!(map_type("int4", None, None, None), "BIGINT");
        assert_eq!(map_type("float8", None, None, None), "DOUBLE");
        assert_eq!(map_type("bpchar", Some(3), None, None), "CHAR(3)");
        assert_eq!(map_type("character", Some(1000), None, None), "TEXT");
    }

    #[test]
    fn test_uuid_and_timestamptz_are_lossy() {
        assert!(postgres_to_mysql("uuid", None, None, None).is_lossy);
        assert!(postgres_to_mysql("timestamp with time zone", None, None, None).is_lossy);
        assert!(!postgres_to_mysql("timestamp without time zone", None, None, None).is_lossy);
    }

    #[test]
    fn test_is_identity_shaped() {
        assert!(is_identity_shaped("id"));
        assert!(is_identity_shaped("ID"));
        assert!(is_identity_shaped("user_id"));
        assert!(!is_identity_shaped("_id"));
        assert!(!is_identity_shaped("valid"));
        assert!(!is_identity_shaped("identity"));
    }

    #[test]
    fn test_widen_identity_type() {
        assert_eq!(widen_identity_type("id", "SMALLINT"), "BIGINT");
        assert_eq!(widen_identity_type("account_id", "INT"), "BIGINT");
        assert_eq!(widen_identity_type("account_id", "VARCHAR(36)"), "VARCHAR(36)");
        assert_eq!(widen_identity_type("quantity", "SMALLINT"), "SMALLINT");
    }

    #[test]
    fn test_mapper_does_not_widen() {
        let mapper = PostgresToMysqlMapper::new();
        let col = ColumnDescriptor::new("orders", "customer_id", "smallint");
        assert_eq!(mapper.map_column(&col).target_type, "SMALLINT");

        let price = ColumnDescriptor::new("orders", "price", "numeric").with_precision(40, 35);
        let mapping = mapper.map_column(&price);
        assert_eq!(mapping.target_type, "DECIMAL(40,30)");
        assert!(mapping.warning.is_some());
        assert_eq!(mapper.source_dialect(), "postgres");
        assert_eq!(mapper.target_dialect(), "mysql");
    }
}
