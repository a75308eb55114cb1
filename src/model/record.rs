//! Point-in-time inventory records.

use super::{CanonicalId, ContentHash, IdKind};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered manifest attributes (insertion order of the manifest file).
pub type ManifestAttributes = IndexMap<String, String>;

/// Immutable copy of one inventory entry, as returned by
/// [`InventoryStore::snapshot`](crate::inventory::InventoryStore::snapshot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Canonical identifier (never changes after creation)
    pub id: CanonicalId,
    /// Simple file name derived from the id
    pub file_name: String,
    /// Size in bytes, `None` when unknown
    #[serde(default)]
    pub size: Option<u64>,
    /// Content hash or the unknown marker
    #[serde(default)]
    pub content_hash: ContentHash,
    /// At least one class was loaded from this archive
    #[serde(default)]
    pub loaded: bool,
    /// Found by static classpath enumeration
    #[serde(default)]
    pub declared: bool,
    /// Manifest attributes, captured once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ManifestAttributes>,
    pub first_seen: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

impl InventoryRecord {
    /// A fresh record for `id` with nothing known about it yet.
    pub fn new(id: CanonicalId) -> Self {
        let now = Utc::now();
        Self {
            file_name: id.file_name(),
            id,
            size: None,
            content_hash: ContentHash::unknown(),
            loaded: false,
            declared: false,
            manifest: None,
            first_seen: now,
            last_accessed: now,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.id.is_top_level()
    }

    pub fn is_nested(&self) -> bool {
        self.id.is_nested()
    }

    pub fn kind(&self) -> IdKind {
        self.id.kind()
    }

    /// True for top-level archives (not directories or modules).
    pub fn is_top_level_archive(&self) -> bool {
        self.kind() == IdKind::Archive
    }

    /// Key used to unify this archive across processes: the content hash
    /// when known, else the canonical id.
    pub fn dedup_key(&self) -> DedupKey {
        if self.content_hash.is_known() {
            DedupKey::Hash(self.content_hash.clone())
        } else {
            DedupKey::Id(self.id.clone())
        }
    }
}

/// Cross-process identity of an archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum DedupKey {
    /// Proven-identical content
    Hash(ContentHash),
    /// Fallback when the content hash is unknown
    Id(CanonicalId),
}

impl DedupKey {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Hash(h) => h.as_str(),
            Self::Id(id) => id.value(),
        }
    }

    pub fn is_content_hash(&self) -> bool {
        matches!(self, Self::Hash(_))
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format a byte count base 1024 with one decimal (`512B`, `1.5KB`, `2.0MB`).
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];
    if bytes < 1024 {
        return format!("{bytes}B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    value /= 1024.0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1}{}", UNITS[unit])
}
