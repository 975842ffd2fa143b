//! Institution directory snapshot used by search

mod refresher;
mod snapshot;

pub use refresher::{RefreshOutcome, SnapshotRefresher, DEFAULT_SNAPSHOT_PAGE_SIZE};
pub use snapshot::{DirectorySnapshot, SharedSnapshot};
