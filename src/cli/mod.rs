//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand
//! and returns the process exit code.

mod aggregate;
mod capture;
mod manifest;
mod normalize;
mod report;

pub use aggregate::{collect_snapshot_paths, load_labels, run_aggregate, AggregateOptions};
pub use capture::{capture_snapshot, run_capture, CaptureOptions};
pub use manifest::run_manifest;
pub use normalize::{normalize_locations, run_normalize, NormalizedLocation};
pub use report::run_report;

// Re-export config types used by handlers
pub use crate::config::{AppConfig, OutputConfig};

use crate::pipeline::{should_use_color, write_output, OutputTarget};
use crate::reports::{create_reporter_with_options, ReportConfig, ReportGenerator};
use anyhow::Result;

/// Reporter for `output`, colored only when writing to a terminal.
fn reporter_for(
    output: &OutputConfig,
    target: &OutputTarget,
    layout: ReportConfig,
) -> Box<dyn ReportGenerator> {
    let use_color = should_use_color(!output.color, target);
    create_reporter_with_options(output.format, use_color, layout)
}

/// Render with the configured reporter and write to the configured target.
fn emit<F>(output: &OutputConfig, layout: ReportConfig, render: F) -> Result<()>
where
    F: FnOnce(&dyn ReportGenerator) -> Result<String, crate::reports::ReportError>,
{
    let target = OutputTarget::from_option(output.file.clone());
    let reporter = reporter_for(output, &target, layout);
    let content = render(reporter.as_ref())?;
    write_output(&content, &target, false)
}
