//! Read views over the archive directory.

use crate::model::{human_size, CanonicalId, ContentHash, DedupKey, ManifestAttributes};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the flat directory view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRow {
    pub key: DedupKey,
    pub file_name: String,
    pub checksum: ContentHash,
    pub size: Option<u64>,
    /// Distinct processes referencing the archive
    pub process_count: usize,
    /// Distinct processes that loaded from it
    pub loaded_process_count: usize,
}

impl DirectoryRow {
    pub fn display_size(&self) -> String {
        self.size.map_or_else(|| "?".to_string(), human_size)
    }
}

/// A single process/path observation in the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessEntry {
    pub app_id: String,
    pub path: CanonicalId,
    pub loaded: bool,
    pub last_accessed: DateTime<Utc>,
}

/// Detail view for one archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveDetail {
    #[serde(flatten)]
    pub row: DirectoryRow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ManifestAttributes>,
    pub processes: Vec<ProcessEntry>,
}

/// Per-application summary derived from the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub app_id: String,
    pub command_line: String,
    pub runtime_version: String,
    pub first_seen: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub archive_count: usize,
    pub loaded_count: usize,
}

/// User-editable labels attached to an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl ApplicationMetadata {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.tags.is_empty()
    }
}

/// Application list entry: summary plus labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub summary: ApplicationSummary,
    #[serde(flatten)]
    pub metadata: ApplicationMetadata,
}
