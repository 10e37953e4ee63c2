//! Core abstractions shared by the mapper, the diff engine and the reconciler.
//!
//! - [`schema`]: column and table metadata
//! - [`value`]: tagged row values
//! - [`traits`]: catalog reader and type mapper seams
//! - [`identifier`]: identifier validation and quoting

pub mod identifier;
pub mod schema;
pub mod traits;
pub mod value;

pub use schema::{group_columns, ColumnDescriptor, TableSnapshot};
pub use traits::{CatalogReader, ColumnMapping, TypeMapper, TypeMapping};
pub use value::{parse_temporal, Row, Value, ValueKind};
