//! Shared orchestration for the command handlers.
//!
//! Loading snapshots, rendering a report and routing it to stdout or a
//! file are the same steps for every subcommand.

mod output;

pub use output::{should_use_color, write_output, OutputTarget};

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// A requested archive or application was not found
    pub const NOT_FOUND: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 2;
}

/// Platform-specific data directory utilities
pub mod dirs {
    use std::path::PathBuf;

    /// Default directory for process snapshots.
    ///
    /// `$XDG_DATA_HOME/jarscope/snapshots` on Linux, the platform data
    /// directory elsewhere, `./.jarscope/snapshots` as a last resort.
    #[must_use]
    pub fn default_snapshot_dir() -> PathBuf {
        ::dirs::data_local_dir()
            .map(|d| d.join("jarscope"))
            .unwrap_or_else(|| PathBuf::from(".jarscope"))
            .join("snapshots")
    }
}
