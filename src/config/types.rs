//! Configuration types for jarscope.
//!
//! Provides structured configuration for inventory tracking, reporting and
//! aggregation.

use super::defaults::{ConfigPreset, DEFAULT_FILE_NAME_WIDTH, DEFAULT_HASH_PREFIX_LEN};
use crate::reports::{ReportConfig, ReportFormat};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// CLI arguments are layered over file settings with [`AppConfig::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Per-process inventory behavior
    pub inventory: InventoryConfig,
    /// Report output
    pub report: OutputConfig,
    /// Cross-process aggregation
    pub aggregate: AggregateConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Start from a named preset instead of the defaults.
    pub fn from_preset(preset: ConfigPreset) -> Self {
        Self {
            config: AppConfig::from_preset(preset),
        }
    }

    /// Enable or disable content hashing of declared archives.
    pub const fn compute_hashes(mut self, enabled: bool) -> Self {
        self.config.inventory.compute_hashes = enabled;
        self
    }

    /// Enable or disable manifest reading on first load.
    pub const fn read_manifests(mut self, enabled: bool) -> Self {
        self.config.inventory.read_manifests = enabled;
        self
    }

    /// Set the output format.
    pub const fn output_format(mut self, format: ReportFormat) -> Self {
        self.config.report.format = format;
        self
    }

    /// Set the output file.
    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.report.file = file;
        self
    }

    /// Disable colored output. `false` leaves the current setting alone.
    pub const fn no_color(mut self, no_color: bool) -> Self {
        if no_color {
            self.config.report.color = false;
        }
        self
    }

    /// Set the file name column width.
    pub const fn file_name_width(mut self, width: usize) -> Self {
        self.config.report.file_name_width = width;
        self
    }

    /// Set the snapshot directory.
    pub fn snapshot_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config.aggregate.snapshot_dir = dir;
        self
    }

    /// Only list archives loaded by at least one process.
    pub const fn loaded_only(mut self, loaded_only: bool) -> Self {
        self.config.aggregate.loaded_only = loaded_only;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Section types
// ============================================================================

/// Inventory recording behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct InventoryConfig {
    /// Hash declared archives (SHA-256)
    pub compute_hashes: bool,
    /// Read `META-INF/MANIFEST.MF` the first time a source is loaded from
    pub read_manifests: bool,
    /// Log the first load from every source at info level
    pub announce_sources: bool,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            compute_hashes: true,
            read_manifests: true,
            announce_sources: true,
        }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: ReportFormat,
    /// Output file path (None for stdout)
    pub file: Option<PathBuf>,
    /// Colored terminal output
    pub color: bool,
    /// Width of the file name column (minimum 8)
    pub file_name_width: usize,
    /// Hash characters shown in tables (1 to 64)
    pub hash_prefix_len: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Table,
            file: None,
            color: true,
            file_name_width: DEFAULT_FILE_NAME_WIDTH,
            hash_prefix_len: DEFAULT_HASH_PREFIX_LEN,
        }
    }
}

impl OutputConfig {
    /// Layout options for the reporters.
    pub fn to_report_config(&self) -> ReportConfig {
        ReportConfig {
            file_name_width: self.file_name_width,
            hash_prefix_len: self.hash_prefix_len,
            title: None,
        }
    }
}

/// Cross-process aggregation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AggregateConfig {
    /// Directory where process snapshots are stored
    pub snapshot_dir: Option<PathBuf>,
    /// Only list archives loaded by at least one process
    pub loaded_only: bool,
}
