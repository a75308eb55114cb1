//! Cross-process aggregation.
//!
//! Snapshots from many processes are folded into an [`ArchiveDirectory`]
//! keyed by content hash (or canonical id when the hash is unknown). The
//! fold is a pure function of the snapshots, so the directory can be rebuilt
//! from a [`SnapshotStore`] in any order, or updated one snapshot at a time
//! through an [`Aggregator`].

mod aggregator;
mod directory;
mod store;
mod views;

pub use aggregator::Aggregator;
pub use directory::{
    AggregatedArchive, ApplicationEntry, ArchiveDirectory, MergeStats, ProcessReference,
};
pub use store::{read_snapshot_file, snapshot_files, SnapshotStore, StoreStats};
pub use views::{
    ApplicationMetadata, ApplicationSummary, ApplicationView, ArchiveDetail, DirectoryRow,
    ProcessEntry,
};
