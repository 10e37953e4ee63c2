//! Configuration type definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source catalog configuration (PostgreSQL).
    pub source: SourceConfig,

    /// Target catalog configuration (MySQL).
    pub target: TargetConfig,

    /// Validation behavior configuration.
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Source catalog (PostgreSQL) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Database type (always "postgres" for now).
    #[serde(default = "default_postgres")]
    pub r#type: String,

    /// Source schema (default: "public").
    #[serde(default = "default_public_schema")]
    pub schema: String,

    /// Path to the catalog snapshot file.
    pub snapshot: PathBuf,
}

/// Target catalog (MySQL) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Database type (always "mysql" for now).
    #[serde(default = "default_mysql")]
    pub r#type: String,

    /// Target database. MySQL has no separate schema level.
    pub schema: String,

    /// Path to the catalog snapshot file.
    pub snapshot: PathBuf,
}

/// Validation behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Rows sampled per table for value reconciliation (default: 5).
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Integer key used to order and pair sampled rows (default: "id").
    #[serde(default = "default_identity_column")]
    pub identity_column: String,

    /// Widen integer `id` / `*_id` columns to BIGINT in emitted DDL (default: true).
    #[serde(default = "default_true")]
    pub widen_identity_columns: bool,

    /// Only validate tables matching one of these glob patterns (empty = all).
    #[serde(default)]
    pub include_tables: Vec<String>,

    /// Skip tables matching any of these glob patterns.
    #[serde(default)]
    pub exclude_tables: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            identity_column: default_identity_column(),
            widen_identity_columns: true,
            include_tables: Vec::new(),
            exclude_tables: Vec::new(),
        }
    }
}

impl ValidationConfig {
    /// Check a table name against the include/exclude filters.
    ///
    /// Matching is case-insensitive; excludes win over includes.
    pub fn includes_table(&self, table: &str) -> bool {
        let included = self.include_tables.is_empty()
            || self.include_tables.iter().any(|p| glob_match(p, table));
        included && !self.exclude_tables.iter().any(|p| glob_match(p, table))
    }
}

/// Case-insensitive glob match supporting `*` and `?`.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    let name: Vec<char> = name.to_lowercase().chars().collect();

    let (mut p, mut n) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while n < name.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == name[n]) {
            p += 1;
            n += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, n));
            p += 1;
        } else if let Some((sp, sn)) = star {
            p = sp + 1;
            n = sn + 1;
            star = Some((sp, sn + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}

fn default_postgres() -> String {
    "postgres".to_string()
}

fn default_mysql() -> String {
    "mysql".to_string()
}

fn default_public_schema() -> String {
    "public".to_string()
}

fn default_sample_size() -> usize {
    5
}

fn default_identity_column() -> String {
    "id".to_string()
}

fn default_true() -> bool {
    true
}
