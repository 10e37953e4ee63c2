//! Error types for the reconciliation library.

use thiserror::Error;

/// Exit code for configuration errors (bad YAML, missing fields).
pub const EXIT_CONFIG_ERROR: u8 = 1;

/// Exit code for a validation run that completed and found differences.
pub const EXIT_VALIDATION_FAILED: u8 = 2;

/// Exit code for catalog and snapshot errors.
pub const EXIT_CATALOG_ERROR: u8 = 3;

/// Exit code for I/O errors (missing files, unwritable sinks).
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for reconciliation operations.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A catalog reader failed to answer a query for a table
    #[error("Catalog error for table {table}: {message}")]
    Catalog { table: String, message: String },

    /// Catalog snapshot file is malformed
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReconcileError {
    /// Create a Catalog error for a specific table.
    pub fn catalog(table: impl Into<String>, message: impl Into<String>) -> Self {
        ReconcileError::Catalog {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            ReconcileError::Config(_) | ReconcileError::Yaml(_) => EXIT_CONFIG_ERROR,
            ReconcileError::Catalog { .. }
            | ReconcileError::Snapshot(_)
            | ReconcileError::Json(_) => EXIT_CATALOG_ERROR,
            ReconcileError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;
