//! Default configurations and presets for jarscope.
//!
//! Provides named presets for common use cases and default values.

use super::types::{AggregateConfig, AppConfig, InventoryConfig, OutputConfig};
use crate::reports::ReportFormat;

/// Default width of the file name column.
pub const DEFAULT_FILE_NAME_WIDTH: usize = 40;

/// Default number of hash characters shown in tables.
pub const DEFAULT_HASH_PREFIX_LEN: usize = 12;

/// Narrowest usable file name column.
pub const MIN_FILE_NAME_WIDTH: usize = 8;

/// Longest accepted hash prefix.
pub const MAX_HASH_PREFIX_LEN: usize = 64;

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Hashes, manifests and colored tables
    Default,
    /// CI/CD: JSON output, no color
    CiCd,
    /// Lightweight: no hashing, no manifest reads, quiet
    Lightweight,
}

impl ConfigPreset {
    /// Get the preset name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::CiCd => "ci-cd",
            Self::Lightweight => "lightweight",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::Default),
            "ci-cd" | "ci" | "pipeline" => Some(Self::CiCd),
            "lightweight" | "light" | "minimal" => Some(Self::Lightweight),
            _ => None,
        }
    }

    /// Get a description of this preset.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Default => "Full inventory with hashes and manifests, colored tables",
            Self::CiCd => "Machine-readable JSON output for pipelines",
            Self::Lightweight => "Load tracking only; no hashing or manifest reads",
        }
    }

    /// Get all available presets.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::CiCd, Self::Lightweight]
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl AppConfig {
    /// Create an `AppConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::CiCd => Self::ci_cd_preset(),
            ConfigPreset::Lightweight => Self::lightweight_preset(),
        }
    }

    fn ci_cd_preset() -> Self {
        Self {
            report: OutputConfig {
                format: ReportFormat::Json,
                color: false,
                ..OutputConfig::default()
            },
            ..Self::default()
        }
    }

    fn lightweight_preset() -> Self {
        Self {
            inventory: InventoryConfig {
                compute_hashes: false,
                read_manifests: false,
                announce_sources: false,
            },
            report: OutputConfig::default(),
            aggregate: AggregateConfig::default(),
        }
    }
}
