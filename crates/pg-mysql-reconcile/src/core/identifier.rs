//! Identifier validation and MySQL quoting for emitted DDL.
//!
//! Identifiers cannot be bound as statement parameters, so generated DDL
//! quotes them instead. Names are checked for null bytes and length before
//! quoting.

use crate::error::{ReconcileError, Result};

/// MySQL identifier length limit, in characters.
const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Validate an identifier before it is spliced into DDL.
///
/// Rejects empty names, names containing null bytes, and names longer than
/// MySQL accepts.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ReconcileError::Config(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(ReconcileError::Config(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(ReconcileError::Config(format!(
            "Identifier exceeds MySQL maximum of {} characters: {:?}",
            MAX_IDENTIFIER_LENGTH, name
        )));
    }

    Ok(())
}

/// Quote a MySQL identifier using backticks.
///
/// ```ignore
/// assert_eq!(quote_mysql("users")?, "`users`");
/// assert_eq!(quote_mysql("table`name")?, "`table``name`");
/// ```
pub fn quote_mysql(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("`{}`", name.replace('`', "``")))
}

/// Qualify a MySQL table name with its database.
pub fn qualify_mysql(schema: &str, table: &str) -> Result<String> {
    Ok(format!("{}.{}", quote_mysql(schema)?, quote_mysql(table)?))
}
