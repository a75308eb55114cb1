//! Report command handler.
//!
//! Renders the inventory report of one stored process snapshot.

use super::emit;
use crate::aggregate::read_snapshot_file;
use crate::config::OutputConfig;
use crate::pipeline::exit_codes;
use crate::reports::InventoryReport;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the report command
pub fn run_report(snapshot_path: &Path, output: &OutputConfig) -> Result<i32> {
    let snapshot = read_snapshot_file(snapshot_path)
        .with_context(|| format!("Failed to load snapshot {}", snapshot_path.display()))?;

    tracing::info!(
        "Loaded snapshot of {} with {} records",
        snapshot.app_id(),
        snapshot.records.len()
    );

    let title = if snapshot.identity.command_line.is_empty() {
        format!("Application {}", snapshot.app_id())
    } else {
        format!(
            "Application {} ({})",
            snapshot.app_id(),
            snapshot.identity.command_line
        )
    };
    let layout = output.to_report_config().with_title(title);
    let report = InventoryReport::from_records(snapshot.records);

    emit(output, layout, |reporter| {
        reporter.generate_inventory_report(&report)
    })?;
    Ok(exit_codes::SUCCESS)
}
