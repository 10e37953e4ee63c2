//! Configuration validation.

use super::Config;
use crate::error::{ReconcileError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.source.schema.is_empty() {
        return Err(ReconcileError::Config("source.schema is required".into()));
    }
    if config.source.snapshot.as_os_str().is_empty() {
        return Err(ReconcileError::Config("source.snapshot is required".into()));
    }
    if config.source.r#type != "postgres" {
        return Err(ReconcileError::Config(format!(
            "source.type must be 'postgres', got '{}'",
            config.source.r#type
        )));
    }

    // Target validation
    if config.target.schema.is_empty() {
        return Err(ReconcileError::Config("target.schema is required".into()));
    }
    if config.target.snapshot.as_os_str().is_empty() {
        return Err(ReconcileError::Config("target.snapshot is required".into()));
    }
    if config.target.r#type != "mysql" {
        return Err(ReconcileError::Config(format!(
            "target.type must be 'mysql', got '{}'",
            config.target.r#type
        )));
    }

    // Validation settings
    if config.validation.sample_size == 0 {
        return Err(ReconcileError::Config(
            "validation.sample_size must be at least 1".into(),
        ));
    }
    if config.validation.identity_column.trim().is_empty() {
        return Err(ReconcileError::Config(
            "validation.identity_column cannot be empty".into(),
        ));
    }

    Ok(())
}
