//! Capture command handler.
//!
//! Builds a process snapshot from an explicit list of archives: every
//! archive (and, optionally, every archive packaged inside it) is declared
//! with its size and hash, then the given locations are marked as loaded.

use crate::aggregate::SnapshotStore;
use crate::config::{AppConfig, InventoryConfig};
use crate::identity::RuntimeInfo;
use crate::inventory::InventoryRecorder;
use crate::model::{has_archive_extension, ENTRY_SEPARATOR, FILE_SCHEME};
use crate::pipeline::{dirs, exit_codes, write_output, OutputTarget};
use crate::snapshot::ProcessSnapshot;
use crate::utils::HashSupplier;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;
use zip::ZipArchive;

/// Options for the capture command
#[derive(Debug, Clone, Default)]
pub struct CaptureOptions {
    /// Archives on the load path
    pub archives: Vec<PathBuf>,
    /// Raw locations classes were loaded from
    pub loaded: Vec<String>,
    /// Runtime description used for the application id
    pub runtime: RuntimeInfo,
    /// Also declare archives packaged inside each archive
    pub nested: bool,
    /// Store the snapshot in the snapshot directory
    pub save: bool,
}

/// Declare, load and snapshot.
pub fn capture_snapshot(
    options: &CaptureOptions,
    config: &InventoryConfig,
) -> Result<ProcessSnapshot> {
    let recorder = InventoryRecorder::new(config.clone());

    for archive in &options.archives {
        let path = archive
            .canonicalize()
            .with_context(|| format!("Cannot access {}", archive.display()))?;
        let size = std::fs::metadata(&path)
            .with_context(|| format!("Cannot stat {}", path.display()))?
            .len();
        let raw = file_url(&path);
        recorder.classpath_declared(&raw, Some(size), Some(HashSupplier::from_file(&path)));

        if options.nested && has_archive_extension(&path.to_string_lossy()) {
            declare_nested(&recorder, &path);
        }
    }

    for location in &options.loaded {
        if recorder.class_load_observed(Some(location.as_str())).is_none() {
            tracing::warn!("Ignoring blank load location");
        }
    }

    Ok(ProcessSnapshot::capture(recorder.store(), &options.runtime))
}

fn declare_nested(recorder: &InventoryRecorder, outer: &Path) {
    let entries = match nested_archives(outer) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Cannot list entries of {}: {}", outer.display(), e);
            return;
        }
    };
    let outer_url = file_url(outer);
    for (entry, size) in entries {
        let raw = format!("{outer_url}{ENTRY_SEPARATOR}{entry}");
        let supplier = HashSupplier::from_nested_entry(outer, entry);
        recorder.classpath_declared(&raw, Some(size), Some(supplier));
    }
}

/// Percent-encoded `file:` URL of an absolute path, in the single-slash
/// form class loaders report (`file:/opt/my%20libs/a.jar`).
fn file_url(path: &Path) -> String {
    match Url::from_file_path(path) {
        Ok(url) => match url.as_str().strip_prefix("file:///") {
            Some(rest) => format!("{FILE_SCHEME}/{rest}"),
            None => url.to_string(),
        },
        Err(()) => format!("{FILE_SCHEME}{}", path.display()),
    }
}

/// Archive entries of a zip archive with their uncompressed sizes.
fn nested_archives(outer: &Path) -> zip::result::ZipResult<Vec<(String, u64)>> {
    let mut archive = ZipArchive::new(File::open(outer)?)?;
    let mut entries = Vec::new();
    for index in 0..archive.len() {
        let file = archive.by_index(index)?;
        if file.is_file() && has_archive_extension(file.name()) {
            entries.push((file.name().to_string(), file.size()));
        }
    }
    Ok(entries)
}

/// Run the capture command
pub fn run_capture(options: CaptureOptions, config: &AppConfig) -> Result<i32> {
    let snapshot = capture_snapshot(&options, &config.inventory)?;
    tracing::info!(
        "Captured {} records for application {}",
        snapshot.records.len(),
        snapshot.app_id()
    );

    if options.save {
        let dir = config
            .aggregate
            .snapshot_dir
            .clone()
            .unwrap_or_else(dirs::default_snapshot_dir);
        let store = SnapshotStore::new(dir)?;
        let path = store.save(&snapshot)?;
        tracing::info!("Snapshot stored at {}", path.display());
    }

    let mut json = snapshot.to_json()?;
    json.push('\n');
    let target = OutputTarget::from_option(config.report.file.clone());
    write_output(&json, &target, false)?;
    Ok(exit_codes::SUCCESS)
}
