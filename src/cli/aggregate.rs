//! Aggregate command handler.
//!
//! Folds stored process snapshots into the archive directory and prints the
//! flat view, one archive's detail, or the application list.

use super::emit;
use crate::aggregate::{read_snapshot_file, snapshot_files, Aggregator, ApplicationMetadata};
use crate::config::AppConfig;
use crate::pipeline::{dirs, exit_codes};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Options for the aggregate command
#[derive(Debug, Clone, Default)]
pub struct AggregateOptions {
    /// Snapshot files or directories; empty means the configured snapshot dir
    pub paths: Vec<PathBuf>,
    /// Show the detail view of one archive (hash or canonical id)
    pub detail: Option<String>,
    /// List applications instead of archives
    pub applications: bool,
    /// Only list archives referenced by this application
    pub application: Option<String>,
    /// YAML map of application id to labels
    pub labels: Option<PathBuf>,
}

/// Expand files and directories into the snapshot files to load.
pub fn collect_snapshot_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(snapshot_files(path)?);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            anyhow::bail!("No such snapshot file or directory: {}", path.display());
        }
    }
    Ok(files)
}

/// Load application labels from a YAML file.
pub fn load_labels(path: &Path) -> Result<BTreeMap<String, ApplicationMetadata>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read labels from {}", path.display()))?;
    serde_yaml_ng::from_str(&content)
        .with_context(|| format!("Failed to parse labels in {}", path.display()))
}

/// Fold every readable snapshot under `paths` into a fresh aggregator.
fn build_aggregator(paths: &[PathBuf]) -> Result<Aggregator> {
    let aggregator = Aggregator::new();
    let mut skipped = 0usize;
    for file in collect_snapshot_paths(paths)? {
        match read_snapshot_file(&file) {
            Ok(snapshot) => {
                aggregator.ingest(&snapshot);
            }
            Err(e) => {
                skipped += 1;
                tracing::warn!("Skipping {}: {}", file.display(), e);
            }
        }
    }
    if skipped > 0 {
        tracing::warn!("{} snapshot files could not be read", skipped);
    }
    Ok(aggregator)
}

/// Run the aggregate command
pub fn run_aggregate(options: AggregateOptions, config: &AppConfig) -> Result<i32> {
    let paths = if options.paths.is_empty() {
        vec![config
            .aggregate
            .snapshot_dir
            .clone()
            .unwrap_or_else(dirs::default_snapshot_dir)]
    } else {
        options.paths
    };

    let aggregator = build_aggregator(&paths)?;

    if let Some(labels) = &options.labels {
        for (app_id, metadata) in load_labels(labels)? {
            if !aggregator.set_metadata(&app_id, metadata) {
                tracing::warn!("Labels for unknown application {}", app_id);
            }
        }
    }

    let output = &config.report;
    let layout = output.to_report_config();

    if let Some(key) = &options.detail {
        let Some(detail) = aggregator.detail(key) else {
            eprintln!("No archive with key {key}");
            return Ok(exit_codes::NOT_FOUND);
        };
        emit(output, layout, |reporter| reporter.generate_detail_report(&detail))?;
        return Ok(exit_codes::SUCCESS);
    }

    if options.applications {
        let applications = aggregator.applications();
        emit(output, layout, |reporter| {
            reporter.generate_applications_report(&applications)
        })?;
        return Ok(exit_codes::SUCCESS);
    }

    let rows = match &options.application {
        Some(app_id) => {
            let directory = aggregator.directory();
            if directory.application(app_id).is_none() {
                eprintln!("No application with id {app_id}");
                return Ok(exit_codes::NOT_FOUND);
            }
            let mut rows = directory.rows_for_application(app_id);
            if config.aggregate.loaded_only {
                rows.retain(|row| row.loaded_process_count > 0);
            }
            rows
        }
        None => aggregator.rows(config.aggregate.loaded_only),
    };

    emit(output, layout, |reporter| reporter.generate_directory_report(&rows))?;
    Ok(exit_codes::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SnapshotStore;
    use crate::identity::{ApplicationIdentity, RuntimeInfo};
    use crate::model::{CanonicalId, ContentHash, InventoryRecord};
    use crate::reports::ReportFormat;
    use crate::snapshot::ProcessSnapshot;
    use tempfile::TempDir;

    fn snapshot(app: &str, loaded: bool) -> ProcessSnapshot {
        let mut record = InventoryRecord::new(CanonicalId::new("/lib/x.jar"));
        record.content_hash = ContentHash::new("H1");
        record.loaded = loaded;
        ProcessSnapshot::new(
            ApplicationIdentity::with_id(app, &RuntimeInfo::default()),
            vec![record],
        )
    }

    fn json_config(out: &Path) -> AppConfig {
        AppConfig::builder()
            .output_format(ReportFormat::Json)
            .output_file(Some(out.to_path_buf()))
            .build()
    }

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_collect_rejects_missing_paths() {
        assert!(collect_snapshot_paths(&[PathBuf::from("/nonexistent/snapshots")]).is_err());
    }

    #[test]
    fn test_aggregate_directory_of_snapshots() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path().join("snaps")).unwrap();
        store.save(&snapshot("app1", true)).unwrap();
        store.save(&snapshot("app2", false)).unwrap();
        std::fs::write(store.dir().join("broken.json"), "{").unwrap();

        let out = tmp.path().join("out.json");
        let options = AggregateOptions {
            paths: vec![store.dir().to_path_buf()],
            ..AggregateOptions::default()
        };
        let code = run_aggregate(options, &json_config(&out)).unwrap();
        assert_eq!(code, exit_codes::SUCCESS);

        let value = read_json(&out);
        assert_eq!(value["archive_count"], 1);
        assert_eq!(value["archives"][0]["process_count"], 2);
        assert_eq!(value["archives"][0]["loaded_process_count"], 1);
    }

    #[test]
    fn test_unknown_detail_key() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path()).unwrap();
        store.save(&snapshot("app1", true)).unwrap();

        let options = AggregateOptions {
            paths: vec![tmp.path().to_path_buf()],
            detail: Some("nope".into()),
            ..AggregateOptions::default()
        };
        let out = tmp.path().join("out.json");
        assert_eq!(
            run_aggregate(options, &json_config(&out)).unwrap(),
            exit_codes::NOT_FOUND
        );
    }

    #[test]
    fn test_applications_with_labels() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path().join("snaps")).unwrap();
        store.save(&snapshot("app1", true)).unwrap();
        let labels = tmp.path().join("labels.yaml");
        std::fs::write(&labels, "app1:\n  name: billing\n  tags: [prod]\n").unwrap();

        let out = tmp.path().join("apps.json");
        let options = AggregateOptions {
            paths: vec![store.dir().to_path_buf()],
            applications: true,
            labels: Some(labels),
            ..AggregateOptions::default()
        };
        run_aggregate(options, &json_config(&out)).unwrap();

        let value = read_json(&out);
        assert_eq!(value["application_count"], 1);
        assert_eq!(value["applications"][0]["app_id"], "app1");
        assert_eq!(value["applications"][0]["name"], "billing");
        assert_eq!(value["applications"][0]["tags"][0], "prod");
    }
}
