//! University catalog: records, derived index, snapshots and the backing file.

/// Lookup structures derived from the records.
pub mod index;
/// Typed university records.
pub mod record;
/// Immutable catalog state at one version.
pub mod snapshot;
/// Catalog JSON file access.
pub mod source;
/// Lock-guarded handle over the current snapshot.
pub mod store;

pub use index::{CatalogIndex, MatchProfile};
pub use record::{Status, UniversityRecord};
pub use snapshot::{CatalogSnapshot, CatalogStats};
pub use source::{parse_upload, CatalogSource};
pub use store::CatalogStore;
