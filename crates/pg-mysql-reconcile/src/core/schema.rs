//! Column and table metadata as reported by catalog readers.
//!
//! These types are dialect-neutral: the same structs describe a PostgreSQL
//! source table and the MySQL table it was migrated into.

use serde::{Deserialize, Serialize};

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Owning table name. May be omitted inside a snapshot table entry.
    #[serde(default)]
    pub table: String,

    /// Column name.
    pub name: String,

    /// Native type as reported by catalog metadata (e.g. "character varying").
    pub native_type: String,

    /// Whether the column allows NULL.
    #[serde(default = "default_true")]
    pub nullable: bool,

    /// Default expression in the source dialect, verbatim.
    #[serde(default)]
    pub default_expr: Option<String>,

    /// Maximum length for character types.
    #[serde(default)]
    pub max_length: Option<u32>,

    /// Numeric precision.
    #[serde(default)]
    pub precision: Option<u32>,

    /// Numeric scale.
    #[serde(default)]
    pub scale: Option<u32>,

    /// Ordinal position (1-based). Zero means "unknown", in which case
    /// the reader's order is kept.
    #[serde(default)]
    pub ordinal_position: u32,
}

fn default_true() -> bool {
    true
}

impl ColumnDescriptor {
    /// Create a nullable column with no length/precision information.
    pub fn new(
        table: impl Into<String>,
        name: impl Into<String>,
        native_type: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            native_type: native_type.into(),
            nullable: true,
            default_expr: None,
            max_length: None,
            precision: None,
            scale: None,
            ordinal_position: 0,
        }
    }

    /// Set the maximum length.
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Set numeric precision and scale.
    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Mark the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Set the default expression.
    pub fn with_default(mut self, expr: impl Into<String>) -> Self {
        self.default_expr = Some(expr.into());
        self
    }

    /// Case-insensitive name comparison.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// One table's columns in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Table name.
    pub name: String,

    /// Column definitions in declaration order.
    pub columns: Vec<ColumnDescriptor>,

    /// Primary key column names (only used for DDL emission).
    #[serde(default)]
    pub primary_key: Vec<String>,
}

impl TableSnapshot {
    /// Create a snapshot, stamping each column with the table name.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        let name = name.into();
        let columns = columns
            .into_iter()
            .map(|mut c| {
                c.table = name.clone();
                c
            })
            .collect();
        Self {
            name,
            columns,
            primary_key: Vec::new(),
        }
    }

    /// Set the primary key columns.
    pub fn with_primary_key(mut self, columns: Vec<String>) -> Self {
        self.primary_key = columns;
        self
    }

    /// Find a column by name (case-insensitive).
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.has_name(name))
    }

    /// Case-insensitive table name comparison.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Group a flat column listing into per-table snapshots.
///
/// Tables appear in order of first occurrence; columns within a table are
/// ordered by `ordinal_position` (stable, so readers that leave it at zero
/// keep their own order).
pub fn group_columns(columns: Vec<ColumnDescriptor>) -> Vec<TableSnapshot> {
    let mut tables: Vec<TableSnapshot> = Vec::new();

    for column in columns {
        match tables.iter_mut().find(|t| t.name == column.table) {
            Some(table) => table.columns.push(column),
            None => tables.push(TableSnapshot {
                name: column.table.clone(),
                columns: vec![column],
                primary_key: Vec::new(),
            }),
        }
    }

    for table in &mut tables {
        table.columns.sort_by_key(|c| c.ordinal_position);
    }

    tables
}
