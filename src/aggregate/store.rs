//! File-based snapshot persistence.

use super::directory::ArchiveDirectory;
use crate::error::{ErrorContext, InventoryError, Result};
use crate::snapshot::ProcessSnapshot;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const SNAPSHOT_EXTENSION: &str = "json";

/// Directory of stored process snapshots.
///
/// Each snapshot is one JSON file named `<app id>.<millis>.json`, with a
/// `-<n>` suffix before the extension when that name is taken. The
/// directory can always be rebuilt by folding every stored file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Open a store, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| InventoryError::io(&dir, e))?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist one snapshot and return the written path.
    ///
    /// Files are never overwritten: a name already taken by an earlier save
    /// in the same millisecond gets a `-<n>` suffix.
    pub fn save(&self, snapshot: &ProcessSnapshot) -> Result<PathBuf> {
        let stem = format!(
            "{}.{}",
            file_safe(snapshot.app_id()),
            snapshot.captured_at.timestamp_millis()
        );
        let data = snapshot.to_json()?;
        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                format!("{stem}.{SNAPSHOT_EXTENSION}")
            } else {
                format!("{stem}-{attempt}.{SNAPSHOT_EXTENSION}")
            };
            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(data.as_bytes())
                        .map_err(|e| InventoryError::io(&path, e))?;
                    tracing::debug!("Stored snapshot {}", path.display());
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(InventoryError::io(&path, e)),
            }
        }
    }

    /// Paths of all stored snapshot files, sorted.
    pub fn paths(&self) -> Result<Vec<PathBuf>> {
        snapshot_files(&self.dir)
    }

    /// Every readable snapshot. Unreadable files are skipped with a warning.
    pub fn load_all(&self) -> Result<Vec<ProcessSnapshot>> {
        Ok(self
            .paths()?
            .iter()
            .filter_map(|path| match read_snapshot_file(path) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::warn!("Skipping unreadable snapshot {}: {}", path.display(), e);
                    None
                }
            })
            .collect())
    }

    /// Fold every stored snapshot into a fresh directory.
    pub fn rebuild(&self) -> Result<ArchiveDirectory> {
        let snapshots = self.load_all()?;
        let directory = ArchiveDirectory::from_snapshots(&snapshots);
        tracing::info!(
            "Rebuilt directory from {} snapshots: {} archives",
            snapshots.len(),
            directory.len()
        );
        Ok(directory)
    }

    /// Remove every stored snapshot. Stops at the first file that cannot be
    /// removed.
    pub fn clear(&self) -> Result<()> {
        remove_all(&self.paths()?)
    }

    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats::default();
        if let Ok(paths) = self.paths() {
            for path in paths {
                stats.total_snapshots += 1;
                if let Ok(metadata) = fs::metadata(&path) {
                    stats.total_size += metadata.len();
                }
            }
        }
        stats
    }
}

/// Snapshot store statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub total_snapshots: usize,
    /// Total size in bytes
    pub total_size: u64,
}

/// Read and leniently decode one snapshot file.
pub fn read_snapshot_file(path: &Path) -> Result<ProcessSnapshot> {
    let data = fs::read_to_string(path).map_err(|e| InventoryError::io(path, e))?;
    ProcessSnapshot::from_json(&data).with_context(|| format!("reading {}", path.display()))
}

/// Snapshot files directly inside `dir`, sorted.
pub fn snapshot_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| InventoryError::io(dir, e))? {
        let path = entry?.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == SNAPSHOT_EXTENSION)
        {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn remove_all(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        fs::remove_file(path).map_err(|e| InventoryError::io(path, e))?;
    }
    Ok(())
}

fn file_safe(app_id: &str) -> String {
    let safe: String = app_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if safe.is_empty() {
        "unknown".to_string()
    } else {
        safe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{ApplicationIdentity, RuntimeInfo};
    use crate::model::{CanonicalId, ContentHash, InventoryRecord};

    fn snapshot(app: &str) -> ProcessSnapshot {
        let mut record = InventoryRecord::new(CanonicalId::new("/lib/x.jar"));
        record.content_hash = ContentHash::new("H1");
        ProcessSnapshot::new(
            ApplicationIdentity::with_id(app, &RuntimeInfo::default()),
            vec![record],
        )
    }

    #[test]
    fn test_save_and_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshots")).unwrap();
        store.save(&snapshot("app1")).unwrap();
        store.save(&snapshot("app2")).unwrap();

        let directory = store.rebuild().unwrap();
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.rows()[0].process_count, 2);
        assert_eq!(store.stats().total_snapshots, 2);
    }

    #[test]
    fn test_unreadable_files_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        store.save(&snapshot("app1")).unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.paths().unwrap().len(), 2);
        assert_eq!(store.load_all().unwrap().len(), 1);

        store.clear().unwrap();
        assert!(store.paths().unwrap().is_empty());
    }

    #[test]
    fn test_same_millisecond_saves_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        let snapshot = snapshot("app1");

        let first = store.save(&snapshot).unwrap();
        let second = store.save(&snapshot).unwrap();
        let third = store.save(&snapshot).unwrap();
        assert_ne!(first, second);
        assert_ne!(second, third);
        assert!(second.to_string_lossy().ends_with("-1.json"));
        assert_eq!(store.stats().total_snapshots, 3);
        assert_eq!(store.load_all().unwrap().len(), 3);
    }

    #[test]
    fn test_removal_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept.json");
        fs::write(&kept, "{}").unwrap();
        let missing = dir.path().join("missing.json");

        let err = remove_all(&[missing.clone(), kept.clone()]).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
        assert!(kept.exists());
    }

    #[test]
    fn test_file_safe_names() {
        assert_eq!(file_safe("abc123"), "abc123");
        assert_eq!(file_safe("a/b:c"), "a_b_c");
        assert_eq!(file_safe(""), "unknown");
    }
}
