//! legacy attribute migration
//!
//! rewrites old flat block attributes into the nested `conditions` array
//! format stored in HTML comment markers, exactly once per marker.

mod batch;
mod legacy;
mod marker;
mod store;

pub use batch::{pending, run, ContentStore, FlagStore, MigrationSummary};
pub use legacy::payload_is_legacy;
pub use marker::{scan, BLOCK_NAME};
pub use store::{DirStore, FileFlagStore};

// re-export the rest for library consumers
#[allow(unused_imports)]
pub use legacy::{has_pending, migrate_content, migrate_content_at};
#[allow(unused_imports)]
pub use marker::{apply_edits, Edit, Marker};
#[allow(unused_imports)]
pub use store::StoreError;
