//! Configuration validation for jarscope.

use super::defaults::{MAX_HASH_PREFIX_LEN, MIN_FILE_NAME_WIDTH};
use super::types::{AggregateConfig, AppConfig, InventoryConfig, OutputConfig};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.inventory.validate());
        errors.extend(self.report.validate());
        errors.extend(self.aggregate.validate());
        errors
    }
}

impl Validatable for InventoryConfig {
    fn validate(&self) -> Vec<ConfigError> {
        // Only boolean flags
        Vec::new()
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.file_name_width < MIN_FILE_NAME_WIDTH {
            errors.push(ConfigError {
                field: "report.file_name_width".to_string(),
                message: format!(
                    "File name width must be at least {MIN_FILE_NAME_WIDTH}, got {}",
                    self.file_name_width
                ),
            });
        }

        if !(1..=MAX_HASH_PREFIX_LEN).contains(&self.hash_prefix_len) {
            errors.push(ConfigError {
                field: "report.hash_prefix_len".to_string(),
                message: format!(
                    "Hash prefix length must be between 1 and {MAX_HASH_PREFIX_LEN}, got {}",
                    self.hash_prefix_len
                ),
            });
        }

        if let Some(ref file_path) = self.file {
            if let Some(parent) = file_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    errors.push(ConfigError {
                        field: "report.file".to_string(),
                        message: format!("Parent directory does not exist: {}", parent.display()),
                    });
                }
            }
        }

        errors
    }
}

impl Validatable for AggregateConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(ref dir) = self.snapshot_dir {
            if dir.is_file() {
                errors.push(ConfigError {
                    field: "aggregate.snapshot_dir".to_string(),
                    message: format!("Not a directory: {}", dir.display()),
                });
            }
        }
        errors
    }
}
