//! MySQL `CREATE TABLE` emission for PostgreSQL table snapshots.

use tracing::{debug, warn};

use crate::core::identifier::{qualify_mysql, quote_mysql};
use crate::core::schema::{ColumnDescriptor, TableSnapshot};
use crate::core::traits::TypeMapper;
use crate::error::Result;

use super::typemap::widen_identity_type;

/// Table options appended to every emitted `CREATE TABLE`.
const TABLE_OPTIONS: &str = "ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci";

/// A PostgreSQL column default translated for MySQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultClause {
    /// Sequence-backed default, emitted as `AUTO_INCREMENT`.
    AutoIncrement,
    /// Literal or function default, emitted as `DEFAULT <expr>`.
    Value(String),
    /// No MySQL equivalent; the default is omitted.
    Dropped,
}

/// Translate a PostgreSQL default expression.
///
/// ```
/// use pg_mysql_reconcile::dialect::{translate_default, DefaultClause};
///
/// assert_eq!(translate_default("nextval('users_id_seq'::regclass)"), DefaultClause::AutoIncrement);
/// assert_eq!(translate_default("'draft'::character varying"), DefaultClause::Value("'draft'".into()));
/// assert_eq!(translate_default("true"), DefaultClause::Value("1".into()));
/// ```
pub fn translate_default(expr: &str) -> DefaultClause {
    let trimmed = expr.trim();
    let lower = trimmed.to_lowercase();

    if lower.starts_with("nextval(") {
        return DefaultClause::AutoIncrement;
    }

    match lower.as_str() {
        "now()" | "current_timestamp" | "localtimestamp" | "transaction_timestamp()" => {
            return DefaultClause::Value("CURRENT_TIMESTAMP".to_string())
        }
        "true" => return DefaultClause::Value("1".to_string()),
        "false" => return DefaultClause::Value("0".to_string()),
        "null" => return DefaultClause::Value("NULL".to_string()),
        _ => {}
    }

    if let Some(literal) = string_literal(trimmed) {
        return DefaultClause::Value(literal.to_string());
    }

    if is_numeric_literal(trimmed) {
        return DefaultClause::Value(trimmed.to_string());
    }

    DefaultClause::Dropped
}

/// Strip a trailing `::type` cast from a quoted literal, e.g. `'a''b'::text` → `'a''b'`.
fn string_literal(expr: &str) -> Option<&str> {
    if !expr.starts_with('\'') {
        return None;
    }

    let bytes = expr.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            let rest = &expr[i + 1..];
            return (rest.is_empty() || rest.starts_with("::")).then(|| &expr[..=i]);
        }
        i += 1;
    }

    None
}

fn is_numeric_literal(expr: &str) -> bool {
    let body = expr
        .strip_prefix('(')
        .and_then(|e| e.strip_suffix(')'))
        .unwrap_or(expr);
    let body = body.strip_prefix('-').unwrap_or(body);
    !body.is_empty()
        && body.chars().all(|c| c.is_ascii_digit() || c == '.')
        && body.chars().filter(|c| *c == '.').count() <= 1
        && body.chars().any(|c| c.is_ascii_digit())
}

/// MySQL rejects literal defaults on these types; only `DEFAULT (<expr>)` is accepted.
fn needs_expression_default(target_type: &str) -> bool {
    let upper = target_type.to_uppercase();
    upper.ends_with("TEXT") || upper.ends_with("BLOB") || upper == "JSON" || upper == "GEOMETRY"
}

/// Builds MySQL `CREATE TABLE` statements from source snapshots.
pub struct CreateTableBuilder<'a> {
    mapper: &'a dyn TypeMapper,
    widen_identity_columns: bool,
    target_schema: Option<String>,
}

impl<'a> CreateTableBuilder<'a> {
    /// Create a builder that maps column types with `mapper`.
    pub fn new(mapper: &'a dyn TypeMapper) -> Self {
        Self {
            mapper,
            widen_identity_columns: false,
            target_schema: None,
        }
    }

    /// Widen integer `id` / `*_id` columns to BIGINT after mapping.
    pub fn widen_identity_columns(mut self, enabled: bool) -> Self {
        self.widen_identity_columns = enabled;
        self
    }

    /// Qualify the table name with a target database.
    pub fn target_schema(mut self, schema: impl Into<String>) -> Self {
        self.target_schema = Some(schema.into());
        self
    }

    /// Render the `CREATE TABLE` statement for one table.
    pub fn build(&self, table: &TableSnapshot) -> Result<String> {
        // InnoDB only accepts AUTO_INCREMENT on the leading column of a key.
        let leading_key = table.primary_key.first().map(String::as_str);

        let mut lines = Vec::with_capacity(table.columns.len() + 1);
        for column in &table.columns {
            let is_leading_key = leading_key.is_some_and(|k| column.has_name(k));
            lines.push(self.column_definition(column, is_leading_key)?);
        }

        if !table.primary_key.is_empty() {
            let pk_cols: Vec<String> = table
                .primary_key
                .iter()
                .map(|c| quote_mysql(c))
                .collect::<Result<_>>()?;
            lines.push(format!("PRIMARY KEY ({})", pk_cols.join(", ")));
        }

        let qualified = match &self.target_schema {
            Some(schema) => qualify_mysql(schema, &table.name)?,
            None => quote_mysql(&table.name)?,
        };

        debug!("Generated DDL for {} ({} columns)", table.name, table.columns.len());

        Ok(format!(
            "CREATE TABLE {} (\n    {}\n) {}",
            qualified,
            lines.join(",\n    "),
            TABLE_OPTIONS
        ))
    }

    /// Render a single column definition.
    fn column_definition(&self, column: &ColumnDescriptor, is_leading_key: bool) -> Result<String> {
        let mapping = self.mapper.map_column(column);
        let target_type = if self.widen_identity_columns {
            widen_identity_type(&column.name, &mapping.target_type)
        } else {
            mapping.target_type
        };

        let mut def = format!("{} {}", quote_mysql(&column.name)?, target_type);
        if !column.nullable {
            def.push_str(" NOT NULL");
        }

        if let Some(expr) = &column.default_expr {
            match translate_default(expr) {
                DefaultClause::AutoIncrement if is_leading_key => def.push_str(" AUTO_INCREMENT"),
                DefaultClause::AutoIncrement => warn!(
                    "Column {}.{}: sequence default on a non-key column, AUTO_INCREMENT omitted",
                    column.table, column.name
                ),
                DefaultClause::Value(value) if needs_expression_default(&target_type) => {
                    def.push_str(&format!(" DEFAULT ({})", value));
                }
                DefaultClause::Value(value) => {
                    def.push_str(" DEFAULT ");
                    def.push_str(&value);
                }
                DefaultClause::Dropped => warn!(
                    "Column {}.{}: default {:?} has no MySQL equivalent, omitted",
                    column.table, column.name, expr
                ),
            }
        }

        Ok(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PostgresToMysqlMapper;

    fn users() -> TableSnapshot {
        TableSnapshot::new(
            "users",
            vec![
                ColumnDescriptor::new("", "id", "integer")
                    .not_null()
                    .with_default("nextval('users_id_seq'::regclass)"),
                ColumnDescriptor::new("", "email", "character varying").with_max_length(255),
                ColumnDescriptor::new("", "active", "boolean").with_default("true"),
                ColumnDescriptor::new("", "created_at", "timestamp with time zone")
                    .with_default("now()"),
            ],
        )
        .with_primary_key(vec!["id".to_string()])
    }

    #[test]
    fn test_build_create_table() {
        let mapper = PostgresToMysqlMapper::new();
        let ddl = CreateTableBuilder::new(&mapper).build(&users()).unwrap();

        assert_eq!(
            ddl,
            "CREATE TABLE `users` (\n    \
             `id` BIGINT NOT NULL AUTO_INCREMENT,\n    \
             `email` VARCHAR(255),\n    \
             `active` BOOLEAN DEFAULT 1,\n    \
             `created_at` DATETIME DEFAULT CURRENT_TIMESTAMP,\n    \
             PRIMARY KEY (`id`)\n\
             ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci"
        );
    }

    #[test]
    fn test_text_and_json_defaults_use_expression_form() {
        let mapper = PostgresToMysqlMapper::new();
        let table = TableSnapshot::new(
            "docs",
            vec![
                ColumnDescriptor::new("docs", "meta", "jsonb").with_default("'{}'::jsonb"),
                ColumnDescriptor::new("docs", "note", "text").with_default("'x'::text"),
                ColumnDescriptor::new("docs", "title", "character varying")
                    .with_max_length(40)
                    .with_default("'untitled'::character varying"),
                ColumnDescriptor::new("docs", "price", "numeric")
                    .with_precision(12, 4)
                    .with_default("0"),
            ],
        );

        let ddl = CreateTableBuilder::new(&mapper).build(&table).unwrap();
        assert!(ddl.contains("`meta` JSON DEFAULT ('{}')"));
        assert!(ddl.contains("`note` TEXT DEFAULT ('x')"));
        assert!(ddl.contains("`title` VARCHAR(40) DEFAULT 'untitled'"));
        assert!(ddl.contains("`price` DECIMAL(12,4) DEFAULT 0"));
    }

    #[test]
    fn test_sequence_default_outside_key_drops_auto_increment() {
        let mapper = PostgresToMysqlMapper::new();
        let no_key = TableSnapshot::new(
            "events",
            vec![ColumnDescriptor::new("events", "id", "integer")
                .not_null()
                .with_default("nextval('events_id_seq'::regclass)")],
        );
        let ddl = CreateTableBuilder::new(&mapper).build(&no_key).unwrap();
        assert!(ddl.contains("`id` BIGINT NOT NULL\n)"));
        assert!(!ddl.contains("AUTO_INCREMENT"));
        assert!(!ddl.contains("PRIMARY KEY"));

        let trailing_key = TableSnapshot::new(
            "line_items",
            vec![
                ColumnDescriptor::new("line_items", "order_id", "bigint").not_null(),
                ColumnDescriptor::new("line_items", "seq", "integer")
                    .not_null()
                    .with_default("nextval('line_items_seq'::regclass)"),
            ],
        )
        .with_primary_key(vec!["order_id".to_string(), "seq".to_string()]);
        let ddl = CreateTableBuilder::new(&mapper).build(&trailing_key).unwrap();
        assert!(!ddl.contains("AUTO_INCREMENT"));
        assert!(ddl.contains("PRIMARY KEY (`order_id`, `seq`)"));
    }

    #[test]
    fn test_build_qualified_and_widened() {
        let mapper = PostgresToMysqlMapper::new();
        let table = TableSnapshot::new(
            "orders",
            vec![ColumnDescriptor::new("", "customer_id", "smallint")],
        );

        let ddl = CreateTableBuilder::new(&mapper)
            .target_schema("shop")
            .widen_identity_columns(true)
            .build(&table)
            .unwrap();

        assert!(ddl.starts_with("CREATE TABLE `shop`.`orders` ("));
        assert!(ddl.contains("`customer_id` BIGINT"));
    }

    #[test]
    fn test_column_order_follows_declaration() {
        let mapper = PostgresToMysqlMapper::new();
        let ddl = CreateTableBuilder::new(&mapper).build(&users()).unwrap();
        let id = ddl.find("`id`").unwrap();
        let email = ddl.find("`email`").unwrap();
        let created = ddl.find("`created_at`").unwrap();
        assert!(id < email && email < created);
    }

    #[test]
    fn test_rejects_invalid_identifier() {
        let mapper = PostgresToMysqlMapper::new();
        let table = TableSnapshot::new("bad\0name", vec![ColumnDescriptor::new("", "id", "bigint")]);
        assert!(CreateTableBuilder::new(&mapper).build(&table).is_err());
    }

    #[test]
    fn test_translate_default() {
        assert_eq!(
            translate_default("nextval('orders_id_seq'::regclass)"),
            DefaultClause::AutoIncrement
        );
        assert_eq!(
            translate_default("CURRENT_TIMESTAMP"),
            DefaultClause::Value("CURRENT_TIMESTAMP".into())
        );
        assert_eq!(translate_default("false"), DefaultClause::Value("0".into()));
        assert_eq!(translate_default("42"), DefaultClause::Value("42".into()));
        assert_eq!(translate_default("-1.5"), DefaultClause::Value("-1.5".into()));
        assert_eq!(translate_default("(-3)"), DefaultClause::Value("(-3)".into()));
        assert_eq!(
            translate_default("'it''s'::text"),
            DefaultClause::Value("'it''s'".into())
        );
        assert_eq!(translate_default("'{}'::jsonb"), DefaultClause::Value("'{}'".into()));
        assert_eq!(translate_default("gen_random_uuid()"), DefaultClause::Dropped);
        assert_eq!(translate_default("'a' || 'b'"), DefaultClause::Dropped);
        assert_eq!(translate_default("1.2.3"), DefaultClause::Dropped);
    }
}
