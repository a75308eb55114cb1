//! Concurrent per-process inventory store.

use crate::model::{CanonicalId, ContentHash, InventoryRecord, ManifestAttributes};
use crate::reports::{InventoryReport, ReportError, ReportGenerator, TableReporter};
use crate::utils::HashSupplier;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};

/// One live inventory entry.
///
/// Every field is updated on its own; entries are never replaced or removed,
/// so a concurrent snapshot always sees a fully constructed entry.
#[derive(Debug)]
struct LiveEntry {
    id: CanonicalId,
    file_name: String,
    first_seen: DateTime<Utc>,
    size: OnceLock<u64>,
    /// Set once hashing has been attempted, possibly to the unknown marker
    hash: OnceLock<ContentHash>,
    loaded: AtomicBool,
    declared: AtomicBool,
    last_accessed: Mutex<DateTime<Utc>>,
    manifest: OnceLock<ManifestAttributes>,
}

impl LiveEntry {
    fn new(id: CanonicalId) -> Self {
        let now = Utc::now();
        Self {
            file_name: id.file_name(),
            id,
            first_seen: now,
            size: OnceLock::new(),
            hash: OnceLock::new(),
            loaded: AtomicBool::new(false),
            declared: AtomicBool::new(false),
            last_accessed: Mutex::new(now),
            manifest: OnceLock::new(),
        }
    }

    fn touch(&self) {
        let mut last = self
            .last_accessed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *last = Utc::now();
    }

    fn to_record(&self) -> InventoryRecord {
        let last_accessed = *self
            .last_accessed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        InventoryRecord {
            id: self.id.clone(),
            file_name: self.file_name.clone(),
            size: self.size.get().copied(),
            content_hash: self.hash.get().cloned().unwrap_or_default(),
            loaded: self.loaded.load(Ordering::Acquire),
            declared: self.declared.load(Ordering::Acquire),
            manifest: self.manifest.get().cloned(),
            first_seen: self.first_seen,
            last_accessed,
        }
    }
}

/// Thread-safe map from [`CanonicalId`] to inventory entry.
///
/// The map lock is only held to look up or insert an entry. Hashing runs
/// outside it, at most once per id.
#[derive(Debug, Default)]
pub struct InventoryStore {
    entries: RwLock<HashMap<CanonicalId, Arc<LiveEntry>>>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(&self, id: &CanonicalId) -> Option<Arc<LiveEntry>> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn get_or_insert(&self, id: &CanonicalId) -> Arc<LiveEntry> {
        if let Some(entry) = self.lookup(id) {
            return entry;
        }
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(
            entries
                .entry(id.clone())
                .or_insert_with(|| Arc::new(LiveEntry::new(id.clone()))),
        )
    }

    /// Record an archive found by static classpath enumeration.
    ///
    /// Creates the entry if absent. Fields that are already known are never
    /// overwritten. The supplier is invoked synchronously, only if no hash
    /// has been attempted for this id yet; a failing supplier leaves the
    /// unknown marker and is not retried.
    pub fn register_declared(
        &self,
        id: &CanonicalId,
        size: Option<u64>,
        supplier: Option<HashSupplier>,
    ) -> InventoryRecord {
        let entry = self.get_or_insert(id);
        if let Some(size) = size {
            let _ = entry.size.set(size);
        }
        if let Some(supplier) = supplier {
            entry.hash.get_or_init(|| supplier.hash());
        }
        entry.declared.store(true, Ordering::Release);
        entry.to_record()
    }

    /// Mark an archive as the source of at least one loaded class.
    ///
    /// Creates a placeholder entry when the id has not been declared. Returns
    /// `true` if this call flipped the loaded flag.
    pub fn mark_loaded(&self, id: &CanonicalId) -> bool {
        let entry = self.get_or_insert(id);
        let was_loaded = entry.loaded.swap(true, Ordering::AcqRel);
        entry.touch();
        !was_loaded
    }

    /// Attach manifest attributes. No-op for unknown ids, empty maps, or
    /// entries that already carry a manifest.
    ///
    /// Returns `true` if the attributes were stored.
    pub fn attach_manifest(&self, id: &CanonicalId, attributes: ManifestAttributes) -> bool {
        if attributes.is_empty() {
            return false;
        }
        match self.lookup(id) {
            Some(entry) => entry.manifest.set(attributes).is_ok(),
            None => false,
        }
    }

    /// Copy of one entry.
    pub fn get(&self, id: &CanonicalId) -> Option<InventoryRecord> {
        self.lookup(id).map(|entry| entry.to_record())
    }

    pub fn contains(&self, id: &CanonicalId) -> bool {
        self.lookup(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time copy of every entry, sorted by id.
    pub fn snapshot(&self) -> Vec<InventoryRecord> {
        let entries: Vec<Arc<LiveEntry>> = self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        let mut records: Vec<InventoryRecord> = entries.iter().map(|e| e.to_record()).collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    /// Write the default textual summary of the current snapshot.
    pub fn report(&self, sink: &mut dyn Write) -> Result<(), ReportError> {
        self.report_with(&TableReporter::plain(), sink)
    }

    /// Write the current snapshot with the given generator.
    pub fn report_with(
        &self,
        generator: &dyn ReportGenerator,
        sink: &mut dyn Write,
    ) -> Result<(), ReportError> {
        let report = InventoryReport::from_records(self.snapshot());
        generator.write_report(&report, sink)
    }
}
