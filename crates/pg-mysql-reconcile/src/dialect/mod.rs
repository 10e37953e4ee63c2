//! Type mapping and DDL emission for PostgreSQL → MySQL.
//!
//! # Available Mappers
//!
//! - [`PostgresToMysqlMapper`]: PostgreSQL → MySQL (uuid, timestamptz and unknown types are lossy)
//!
//! # Usage
//!
//! ```rust,ignore
//! let mapper = PostgresToMysqlMapper::new();
//! let ddl = CreateTableBuilder::new(&mapper)
//!     .widen_identity_columns(true)
//!     .build(&table)?;
//! ```

mod ddl;
mod typemap;

pub use ddl::{translate_default, CreateTableBuilder, DefaultClause};
pub use typemap::{
    is_identity_shaped, map_type, widen_identity_type, PostgresToMysqlMapper,
    DEFAULT_DECIMAL_PRECISION, DEFAULT_DECIMAL_SCALE, FALLBACK_TYPE,
};
