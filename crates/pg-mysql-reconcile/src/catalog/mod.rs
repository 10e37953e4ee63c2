//! Catalog reader implementations.

mod snapshot;

pub use snapshot::{row, SnapshotCatalog, SnapshotTable};
