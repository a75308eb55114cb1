//! Configuration module for jarscope.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - Named presets for common use cases
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use jarscope::config::{AppConfig, ConfigPreset};
//!
//! let config = AppConfig::default();
//! let config = AppConfig::from_preset(ConfigPreset::CiCd);
//! let config = AppConfig::builder()
//!     .compute_hashes(false)
//!     .loaded_only(true)
//!     .build();
//!
//! use jarscope::config::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.jarscope.yaml` file in the working directory or
//! `~/.config/jarscope/`:
//!
//! ```yaml
//! inventory:
//!   compute_hashes: true
//! report:
//!   format: table
//!   hash_prefix_len: 12
//! aggregate:
//!   snapshot_dir: /var/lib/jarscope/snapshots
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    ConfigPreset, DEFAULT_FILE_NAME_WIDTH, DEFAULT_HASH_PREFIX_LEN, MAX_HASH_PREFIX_LEN,
    MIN_FILE_NAME_WIDTH,
};
pub use types::{AggregateConfig, AppConfig, AppConfigBuilder, InventoryConfig, OutputConfig};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// Editors can use it to validate and autocomplete `.jarscope.yaml` files.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lists_sections() {
        let schema = generate_json_schema();
        assert!(schema.contains("inventory"));
        assert!(schema.contains("hash_prefix_len"));
        assert!(schema.contains("snapshot_dir"));
    }
}
