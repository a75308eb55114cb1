//! Shared aggregator: the archive directory behind a lock, plus
//! user-editable application labels.

use super::directory::{ArchiveDirectory, MergeStats};
use super::views::{ApplicationMetadata, ApplicationView, ArchiveDetail, DirectoryRow};
use crate::snapshot::ProcessSnapshot;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe front for an [`ArchiveDirectory`].
#[derive(Debug, Default)]
pub struct Aggregator {
    directory: RwLock<ArchiveDirectory>,
    metadata: RwLock<HashMap<String, ApplicationMetadata>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-built directory, e.g. one rebuilt from disk.
    pub fn from_directory(directory: ArchiveDirectory) -> Self {
        Self {
            directory: RwLock::new(directory),
            metadata: RwLock::default(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ArchiveDirectory> {
        self.directory.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ArchiveDirectory> {
        self.directory
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Fold one snapshot into the directory.
    pub fn ingest(&self, snapshot: &ProcessSnapshot) -> MergeStats {
        let stats = self.write().merge_snapshot(snapshot);
        tracing::info!(
            "Ingested snapshot from {}: {} records merged, {} skipped",
            snapshot.app_id(),
            stats.merged,
            stats.skipped
        );
        stats
    }

    /// Join a whole directory, e.g. one built by another aggregator.
    pub fn absorb(&self, other: ArchiveDirectory) {
        self.write().merge(other);
    }

    /// Copy of the current directory.
    pub fn directory(&self) -> ArchiveDirectory {
        self.read().clone()
    }

    pub fn rows(&self, loaded_only: bool) -> Vec<DirectoryRow> {
        let directory = self.read();
        if loaded_only {
            directory.loaded_rows()
        } else {
            directory.rows()
        }
    }

    pub fn detail(&self, key: &str) -> Option<ArchiveDetail> {
        self.read().detail(key)
    }

    /// Replace the labels of a known application. Returns `false` if the
    /// application has never reported.
    pub fn set_metadata(&self, app_id: &str, metadata: ApplicationMetadata) -> bool {
        if self.read().application(app_id).is_none() {
            return false;
        }
        self.metadata
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(app_id.to_string(), metadata);
        true
    }

    pub fn metadata(&self, app_id: &str) -> ApplicationMetadata {
        self.metadata
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(app_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Application list with labels, ordered by id.
    pub fn applications(&self) -> Vec<ApplicationView> {
        let summaries = self.read().applications();
        let metadata = self.metadata.read().unwrap_or_else(PoisonError::into_inner);
        summaries
            .into_iter()
            .map(|summary| ApplicationView {
                metadata: metadata.get(&summary.app_id).cloned().unwrap_or_default(),
                summary,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{ApplicationIdentity, RuntimeInfo};
    use crate::model::{CanonicalId, ContentHash, InventoryRecord};
    use std::sync::Arc;
    use std::thread;

    fn snapshot(app: &str, hash: &str) -> ProcessSnapshot {
        let mut record = InventoryRecord::new(CanonicalId::new("/lib/x.jar"));
        record.content_hash = ContentHash::new(hash);
        record.loaded = true;
        ProcessSnapshot::new(
            ApplicationIdentity::with_id(app, &RuntimeInfo::default()),
            vec![record],
        )
    }

    #[test]
    fn test_concurrent_ingest() {
        let aggregator = Arc::new(Aggregator::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let aggregator = Arc::clone(&aggregator);
                thread::spawn(move || {
                    aggregator.ingest(&snapshot(&format!("app{i}"), "H1"));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let rows = aggregator.rows(false);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].process_count, 4);
        assert_eq!(rows[0].loaded_process_count, 4);
    }

    #[test]
    fn test_metadata_only_for_known_apps() {
        let aggregator = Aggregator::new();
        let labels = ApplicationMetadata {
            name: Some("billing".into()),
            description: None,
            tags: vec!["prod".into()],
        };
        assert!(!aggregator.set_metadata("app1", labels.clone()));

        aggregator.ingest(&snapshot("app1", "H1"));
        assert!(aggregator.set_metadata("app1", labels.clone()));
        assert_eq!(aggregator.metadata("app1"), labels);

        let apps = aggregator.applications();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].metadata.name.as_deref(), Some("billing"));
        assert_eq!(apps[0].summary.archive_count, 1);
    }

    #[test]
    fn test_absorb_matches_direct_ingest() {
        let direct = Aggregator::new();
        direct.ingest(&snapshot("app1", "H1"));
        direct.ingest(&snapshot("app2", "H2"));

        let sharded = Aggregator::from_directory(ArchiveDirectory::from_snapshots(&[snapshot(
            "app1", "H1",
        )]));
        sharded.absorb(ArchiveDirectory::from_snapshots(&[snapshot("app2", "H2")]));

        assert_eq!(direct.directory(), sharded.directory());
    }
}
