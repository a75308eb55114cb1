//! **Archive usage inventory for class-loading processes.**
//!
//! `jarscope` answers two questions about a running process: which archives
//! are on its load path, and which of them it actually loaded classes from.
//! Many processes' answers are then aggregated into one directory that shows,
//! per archive, how many applications ship it and how many really use it.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: [`CanonicalId`] and the identifier normalizer. Archive
//!   addresses arrive in several dialects (`file:` URLs, plain paths,
//!   `jar:nested:` loader URLs, inline `/!` nested forms); all of them
//!   collapse to one canonical id per logical archive.
//! - **[`inventory`]**: the per-process [`InventoryStore`] and the
//!   [`InventoryRecorder`] entry points for class-load and classpath
//!   observations. Repeated or out-of-order observations converge.
//! - **[`manifest`]**: manifest lookup in archives, nested archives and class
//!   directories, plus the line-oriented manifest parser.
//! - **[`identity`]**: the stable application id computed from the command
//!   line, the runtime and the content hashes of the top-level archives.
//! - **[`snapshot`]**: [`ProcessSnapshot`], one process's inventory plus its
//!   identity.
//! - **[`aggregate`]**: the content-addressed [`ArchiveDirectory`], whose
//!   merge is order independent, and the file-based [`SnapshotStore`].
//! - **[`reports`]**: table and JSON renderings of inventories and the
//!   directory.
//!
//! ## Getting Started
//!
//! ```no_run
//! use jarscope::{InventoryRecorder, ProcessSnapshot, RuntimeInfo};
//! use jarscope::config::InventoryConfig;
//! use jarscope::utils::HashSupplier;
//!
//! let recorder = InventoryRecorder::new(InventoryConfig::default());
//! recorder.classpath_declared(
//!     "file:/app/lib/a.jar",
//!     Some(1024),
//!     Some(HashSupplier::from_file("/app/lib/a.jar")),
//! );
//! recorder.class_load_observed(Some("jar:file:/app/lib/a.jar!/com/example/A.class"));
//!
//! let runtime = RuntimeInfo::new("java -jar app.jar", "21", "Vendor", "/opt/jdk");
//! let snapshot = ProcessSnapshot::capture(recorder.store(), &runtime);
//! println!("{}", snapshot.app_id());
//! ```
//!
//! ## Aggregating Snapshots
//!
//! ```no_run
//! use jarscope::aggregate::SnapshotStore;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SnapshotStore::new("/var/lib/jarscope/snapshots")?;
//!     let directory = store.rebuild()?;
//!     for row in directory.loaded_rows() {
//!         println!("{} used by {} processes", row.file_name, row.loaded_process_count);
//!     }
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod inventory;
pub mod manifest;
pub mod model;
pub mod pipeline;
pub mod reports;
pub mod snapshot;
pub mod utils;

// Re-export main types for convenience
pub use aggregate::{Aggregator, ArchiveDirectory, SnapshotStore};
pub use config::{AppConfig, AppConfigBuilder, ConfigPreset};
pub use config::{ConfigError, Validatable};
pub use error::{ErrorContext, InventoryError, Result};
pub use identity::{compute_application_id, ApplicationIdentity, RuntimeInfo};
pub use inventory::{InventoryRecorder, InventoryStore};
pub use model::{CanonicalId, ContentHash, DedupKey, IdKind, InventoryRecord, ManifestAttributes};
pub use reports::{ReportFormat, ReportGenerator};
pub use snapshot::ProcessSnapshot;
