//! Normalize command handler.
//!
//! Shows the canonical identifier each raw location string collapses to.

use crate::config::OutputConfig;
use crate::model::{CanonicalId, IdKind};
use crate::pipeline::{exit_codes, write_output, OutputTarget};
use crate::reports::ReportFormat;
use anyhow::Result;
use serde::Serialize;

/// One raw location and what it normalizes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedLocation {
    pub raw: String,
    /// `None` for blank input
    pub id: Option<CanonicalId>,
    pub kind: Option<IdKind>,
    pub file_name: Option<String>,
}

/// Normalize every location in order.
pub fn normalize_locations<S: AsRef<str>>(locations: &[S]) -> Vec<NormalizedLocation> {
    locations
        .iter()
        .map(|raw| {
            let raw = raw.as_ref();
            let id = CanonicalId::from_raw(raw);
            NormalizedLocation {
                raw: raw.to_string(),
                kind: id.as_ref().map(CanonicalId::kind),
                file_name: id.as_ref().map(CanonicalId::file_name),
                id,
            }
        })
        .collect()
}

/// Run the normalize command
pub fn run_normalize(locations: &[String], output: &OutputConfig) -> Result<i32> {
    let normalized = normalize_locations(locations);
    tracing::debug!("Normalized {} locations", normalized.len());

    let content = match output.format {
        ReportFormat::Json => {
            let mut json = serde_json::to_string_pretty(&normalized)?;
            json.push('\n');
            json
        }
        ReportFormat::Table => render_table(&normalized),
    };

    let target = OutputTarget::from_option(output.file.clone());
    write_output(&content, &target, false)?;
    Ok(exit_codes::SUCCESS)
}

fn render_table(normalized: &[NormalizedLocation]) -> String {
    let mut out = String::new();
    for entry in normalized {
        out.push_str(&entry.raw);
        out.push('\n');
        match (&entry.id, entry.kind) {
            (Some(id), Some(kind)) => {
                out.push_str(&format!("  -> {id} ({})\n", kind_label(kind)));
            }
            _ => out.push_str("  -> (ignored)\n"),
        }
    }
    out
}

const fn kind_label(kind: IdKind) -> &'static str {
    match kind {
        IdKind::Archive => "archive",
        IdKind::NestedArchive => "nested archive",
        IdKind::Directory => "directory",
        IdKind::RuntimeModule => "runtime module",
        IdKind::Other => "other",
    }
}
