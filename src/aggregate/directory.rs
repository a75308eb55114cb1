//! The deduplicated archive directory and its merge function.
//!
//! Every field is joined with a commutative, associative, idempotent
//! operation, so the directory is the same regardless of the order or
//! grouping in which snapshots are folded in.

use super::views::{ApplicationSummary, ArchiveDetail, DirectoryRow, ProcessEntry};
use crate::identity::ApplicationIdentity;
use crate::model::{CanonicalId, ContentHash, DedupKey, InventoryRecord, ManifestAttributes};
use crate::snapshot::ProcessSnapshot;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// One process's observation of an archive at one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessReference {
    pub loaded: bool,
    pub last_accessed: DateTime<Utc>,
}

impl ProcessReference {
    fn join(&mut self, other: Self) {
        self.loaded |= other.loaded;
        self.last_accessed = self.last_accessed.max(other.last_accessed);
    }
}

/// Aggregate state for one dedup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedArchive {
    key: DedupKey,
    file_name: String,
    size: Option<u64>,
    manifest: Option<ManifestAttributes>,
    /// app id -> canonical path -> reference
    references: BTreeMap<String, BTreeMap<CanonicalId, ProcessReference>>,
}

impl AggregatedArchive {
    fn from_record(app_id: &str, record: &InventoryRecord) -> Self {
        let mut archive = Self {
            key: record.dedup_key(),
            file_name: record.file_name.clone(),
            size: record.size,
            manifest: record.manifest.clone().filter(|m| !m.is_empty()),
            references: BTreeMap::new(),
        };
        archive.add_reference(app_id, record);
        archive
    }

    fn add_reference(&mut self, app_id: &str, record: &InventoryRecord) {
        let reference = ProcessReference {
            loaded: record.loaded,
            last_accessed: record.last_accessed,
        };
        self.references
            .entry(app_id.to_string())
            .or_default()
            .entry(record.id.clone())
            .and_modify(|existing| existing.join(reference))
            .or_insert(reference);
    }

    /// Widen unknown metadata and union the references.
    fn join(&mut self, other: Self) {
        self.file_name = join_name(std::mem::take(&mut self.file_name), other.file_name);
        self.size = join_option(self.size, other.size);
        self.manifest = join_manifest(self.manifest.take(), other.manifest);
        for (app_id, paths) in other.references {
            let mine = self.references.entry(app_id).or_default();
            for (path, reference) in paths {
                mine.entry(path)
                    .and_modify(|existing| existing.join(reference))
                    .or_insert(reference);
            }
        }
    }

    pub fn key(&self) -> &DedupKey {
        &self.key
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The content hash, or the unknown marker for path-keyed archives.
    pub fn checksum(&self) -> ContentHash {
        match &self.key {
            DedupKey::Hash(hash) => hash.clone(),
            DedupKey::Id(_) => ContentHash::unknown(),
        }
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn manifest(&self) -> Option<&ManifestAttributes> {
        self.manifest.as_ref()
    }

    /// Number of distinct processes referencing this archive.
    pub fn process_count(&self) -> usize {
        self.references.len()
    }

    /// Number of distinct processes that loaded from this archive at any path.
    pub fn loaded_process_count(&self) -> usize {
        self.references
            .values()
            .filter(|paths| paths.values().any(|r| r.loaded))
            .count()
    }

    pub fn is_referenced_by(&self, app_id: &str) -> bool {
        self.references.contains_key(app_id)
    }

    fn is_loaded_by(&self, app_id: &str) -> bool {
        self.references
            .get(app_id)
            .is_some_and(|paths| paths.values().any(|r| r.loaded))
    }

    pub fn row(&self) -> DirectoryRow {
        DirectoryRow {
            key: self.key.clone(),
            file_name: self.file_name.clone(),
            checksum: self.checksum(),
            size: self.size,
            process_count: self.process_count(),
            loaded_process_count: self.loaded_process_count(),
        }
    }

    pub fn detail(&self) -> ArchiveDetail {
        let processes = self
            .references
            .iter()
            .flat_map(|(app_id, paths)| {
                paths.iter().map(move |(path, reference)| ProcessEntry {
                    app_id: app_id.clone(),
                    path: path.clone(),
                    loaded: reference.loaded,
                    last_accessed: reference.last_accessed,
                })
            })
            .collect();
        ArchiveDetail {
            row: self.row(),
            manifest: self.manifest.clone(),
            processes,
        }
    }
}

/// Per-application bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationEntry {
    pub identity: ApplicationIdentity,
    pub first_seen: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl ApplicationEntry {
    fn join(&mut self, other: Self) {
        if other.identity < self.identity {
            self.identity = other.identity;
        }
        self.first_seen = self.first_seen.min(other.first_seen);
        self.last_updated = self.last_updated.max(other.last_updated);
    }
}

/// Counts from folding one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub merged: usize,
    pub skipped: usize,
}

/// Deduplicated directory of archives across processes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveDirectory {
    archives: BTreeMap<DedupKey, AggregatedArchive>,
    applications: BTreeMap<String, ApplicationEntry>,
}

impl ArchiveDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold any number of snapshots into a fresh directory.
    pub fn from_snapshots<'a, I>(snapshots: I) -> Self
    where
        I: IntoIterator<Item = &'a ProcessSnapshot>,
    {
        let mut directory = Self::new();
        for snapshot in snapshots {
            directory.merge_snapshot(snapshot);
        }
        directory
    }

    /// Fold one snapshot in. Malformed records are skipped with a warning.
    pub fn merge_snapshot(&mut self, snapshot: &ProcessSnapshot) -> MergeStats {
        let app_id = snapshot.app_id();
        let mut stats = MergeStats::default();

        self.join_application(
            app_id.to_string(),
            ApplicationEntry {
                identity: snapshot.identity.clone(),
                first_seen: snapshot.captured_at,
                last_updated: snapshot.captured_at,
            },
        );

        for record in &snapshot.records {
            if self.merge_record(app_id, record) {
                stats.merged += 1;
            } else {
                stats.skipped += 1;
            }
        }
        tracing::debug!(
            "Merged {} records from {} ({} skipped)",
            stats.merged,
            app_id,
            stats.skipped
        );
        stats
    }

    /// Fold one record observed by `app_id`. Returns `false` if skipped.
    pub fn merge_record(&mut self, app_id: &str, record: &InventoryRecord) -> bool {
        if record.id.value().trim().is_empty() {
            tracing::warn!("Skipping record with empty id from {}", app_id);
            return false;
        }
        match self.archives.get_mut(&record.dedup_key()) {
            Some(existing) => {
                existing.join(AggregatedArchive::from_record(app_id, record));
            }
            None => {
                let archive = AggregatedArchive::from_record(app_id, record);
                self.archives.insert(archive.key.clone(), archive);
            }
        }
        true
    }

    /// Join another directory into this one.
    pub fn merge(&mut self, other: ArchiveDirectory) {
        for (key, archive) in other.archives {
            match self.archives.get_mut(&key) {
                Some(existing) => existing.join(archive),
                None => {
                    self.archives.insert(key, archive);
                }
            }
        }
        for (app_id, entry) in other.applications {
            self.join_application(app_id, entry);
        }
    }

    fn join_application(&mut self, app_id: String, entry: ApplicationEntry) {
        match self.applications.get_mut(&app_id) {
            Some(existing) => existing.join(entry),
            None => {
                self.applications.insert(app_id, entry);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.archives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    pub fn get(&self, key: &DedupKey) -> Option<&AggregatedArchive> {
        self.archives.get(key)
    }

    /// Look up by the textual key: a content hash first, then a canonical id.
    pub fn find(&self, key: &str) -> Option<&AggregatedArchive> {
        self.archives
            .get(&DedupKey::Hash(ContentHash::new(key)))
            .or_else(|| self.archives.get(&DedupKey::Id(CanonicalId::new(key))))
    }

    pub fn archives(&self) -> impl Iterator<Item = &AggregatedArchive> {
        self.archives.values()
    }

    /// Flat view, one row per dedup key, ordered by key.
    pub fn rows(&self) -> Vec<DirectoryRow> {
        self.archives.values().map(AggregatedArchive::row).collect()
    }

    /// Flat view restricted to archives loaded by at least one process.
    pub fn loaded_rows(&self) -> Vec<DirectoryRow> {
        self.archives
            .values()
            .filter(|a| a.loaded_process_count() > 0)
            .map(AggregatedArchive::row)
            .collect()
    }

    /// Detail view for one textual key.
    pub fn detail(&self, key: &str) -> Option<ArchiveDetail> {
        self.find(key).map(AggregatedArchive::detail)
    }

    pub fn application(&self, app_id: &str) -> Option<&ApplicationEntry> {
        self.applications.get(app_id)
    }

    /// One summary per application, ordered by id.
    pub fn applications(&self) -> Vec<ApplicationSummary> {
        self.applications
            .iter()
            .map(|(app_id, entry)| ApplicationSummary {
                app_id: app_id.clone(),
                command_line: entry.identity.command_line.clone(),
                runtime_version: entry.identity.runtime_version.clone(),
                first_seen: entry.first_seen,
                last_updated: entry.last_updated,
                archive_count: self
                    .archives
                    .values()
                    .filter(|a| a.is_referenced_by(app_id))
                    .count(),
                loaded_count: self
                    .archives
                    .values()
                    .filter(|a| a.is_loaded_by(app_id))
                    .count(),
            })
            .collect()
    }

    /// Archives referenced by one application.
    pub fn rows_for_application(&self, app_id: &str) -> Vec<DirectoryRow> {
        self.archives
            .values()
            .filter(|a| a.is_referenced_by(app_id))
            .map(AggregatedArchive::row)
            .collect()
    }
}

fn join_name(a: String, b: String) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b,
        (_, true) => a,
        _ => a.min(b),
    }
}

fn join_option<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn join_manifest(
    a: Option<ManifestAttributes>,
    b: Option<ManifestAttributes>,
) -> Option<ManifestAttributes> {
    match (a, b) {
        (Some(a), Some(b)) => {
            if b.iter().cmp(a.iter()).is_lt() {
                Some(b)
            } else {
                Some(a)
            }
        }
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::RuntimeInfo;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    fn record(path: &str, hash: &str, loaded: bool) -> InventoryRecord {
        let mut record = InventoryRecord::new(CanonicalId::new(path));
        record.content_hash = ContentHash::new(hash);
        record.loaded = loaded;
        record.first_seen = at(0);
        record.last_accessed = at(10);
        record
    }

    fn snapshot(app: &str, records: Vec<InventoryRecord>) -> ProcessSnapshot {
        let mut snapshot = ProcessSnapshot::new(
            ApplicationIdentity::with_id(app, &RuntimeInfo::default()),
            records,
        );
        snapshot.captured_at = at(100);
        snapshot
    }

    #[test]
    fn test_same_hash_two_processes_one_row() {
        let directory = ArchiveDirectory::from_snapshots(&[
            snapshot("app1", vec![record("/a/lib.jar", "H1", true)]),
            snapshot("app2", vec![record("/b/lib.jar", "H1", false)]),
        ]);

        let rows = directory.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key.as_str(), "H1");
        assert_eq!(rows[0].process_count, 2);
        assert_eq!(rows[0].loaded_process_count, 1);
    }

    #[test]
    fn test_unknown_hash_keys_by_path() {
        let directory = ArchiveDirectory::from_snapshots(&[
            snapshot("app1", vec![record("/a/lib.jar", "?", true)]),
            snapshot("app2", vec![record("/b/lib.jar", "?", true)]),
        ]);
        assert_eq!(directory.len(), 2);
        assert!(directory.find("/a/lib.jar").is_some());
        assert!(!directory.find("/a/lib.jar").unwrap().checksum().is_known());
    }

    #[test]
    fn test_repeat_reports_idempotent() {
        let snap = snapshot("app1", vec![record("/a/lib.jar", "H1", true)]);
        let mut directory = ArchiveDirectory::from_snapshots([&snap]);
        let once = directory.clone();
        directory.merge_snapshot(&snap);
        assert_eq!(directory, once);
        assert_eq!(directory.rows()[0].loaded_process_count, 1);
    }

    #[test]
    fn test_metadata_widened_not_overwritten() {
        let mut first = record("/a/lib.jar", "H1", false);
        first.size = None;
        let mut second = record("/b/lib.jar", "H1", false);
        second.size = Some(42);
        let mut manifest = ManifestAttributes::new();
        manifest.insert("Implementation-Title".into(), "lib".into());
        second.manifest = Some(manifest);

        let directory = ArchiveDirectory::from_snapshots(&[
            snapshot("app1", vec![first]),
            snapshot("app2", vec![second]),
        ]);
        let archive = directory.find("H1").unwrap();
        assert_eq!(archive.size(), Some(42));
        assert_eq!(archive.manifest().unwrap()["Implementation-Title"], "lib");
    }

    #[test]
    fn test_empty_id_skipped() {
        let mut directory = ArchiveDirectory::new();
        let stats = directory.merge_snapshot(&snapshot(
            "app1",
            vec![record("", "H1", true), record("/a.jar", "H2", true)],
        ));
        assert_eq!(stats, MergeStats { merged: 1, skipped: 1 });
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_detail_lists_every_path() {
        let directory = ArchiveDirectory::from_snapshots(&[snapshot(
            "app1",
            vec![
                record("/a/lib.jar", "H1", true),
                record("file:/app.jar!/BOOT-INF/lib/lib.jar", "H1", false),
            ],
        )]);
        let detail = directory.detail("H1").unwrap();
        assert_eq!(detail.row.process_count, 1);
        assert_eq!(detail.processes.len(), 2);
        assert!(detail.processes.iter().any(|p| p.loaded));
    }

    #[test]
    fn test_loaded_rows_and_applications() {
        let directory = ArchiveDirectory::from_snapshots(&[
            snapshot(
                "app1",
                vec![record("/a.jar", "H1", true), record("/b.jar", "H2", false)],
            ),
            snapshot("app2", vec![record("/b.jar", "H2", false)]),
        ]);
        let loaded = directory.loaded_rows();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].key.as_str(), "H1");

        let apps = directory.applications();
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].app_id, "app1");
        assert_eq!(apps[0].archive_count, 2);
        assert_eq!(apps[0].loaded_count, 1);
        assert_eq!(apps[1].loaded_count, 0);
        assert_eq!(directory.rows_for_application("app2").len(), 1);
    }

    #[test]
    fn test_merge_directories_matches_single_fold() {
        let a = snapshot("app1", vec![record("/a.jar", "H1", true)]);
        let b = snapshot("app2", vec![record("/a.jar", "H1", false), record("/c.jar", "?", true)]);

        let whole = ArchiveDirectory::from_snapshots([&a, &b]);
        let mut left = ArchiveDirectory::from_snapshots([&b]);
        left.merge(ArchiveDirectory::from_snapshots([&a]));
        assert_eq!(whole, left);
    }
}
