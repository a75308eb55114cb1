//! Report generation for inventories and the aggregated directory.
//!
//! Two output formats:
//! - Table: summary block, details table and legend for terminals
//! - JSON: structured data for programmatic integration

mod json;
mod summary;
mod table;
mod types;

pub use json::JsonReporter;
pub use summary::{pct, report_order, InventoryReport, InventorySummary};
pub use table::TableReporter;
pub use types::{ReportConfig, ReportFormat};

use crate::aggregate::{ApplicationView, ArchiveDetail, DirectoryRow};
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Format error: {0}")]
    FormatError(#[from] std::fmt::Error),
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Generate a report for one process inventory
    fn generate_inventory_report(&self, report: &InventoryReport) -> Result<String, ReportError>;

    /// Generate the flat directory view
    fn generate_directory_report(&self, rows: &[DirectoryRow]) -> Result<String, ReportError>;

    /// Generate the detail view for one archive
    fn generate_detail_report(&self, detail: &ArchiveDetail) -> Result<String, ReportError>;

    /// Generate the list of known applications
    fn generate_applications_report(
        &self,
        applications: &[ApplicationView],
    ) -> Result<String, ReportError>;

    /// Write an inventory report to a writer
    fn write_report(
        &self,
        report: &InventoryReport,
        writer: &mut dyn Write,
    ) -> Result<(), ReportError> {
        let text = self.generate_inventory_report(report)?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Get the format this generator produces
    fn format(&self) -> ReportFormat;
}

/// Create a report generator for the given format
#[must_use]
pub fn create_reporter(format: ReportFormat) -> Box<dyn ReportGenerator> {
    create_reporter_with_options(format, true, ReportConfig::default())
}

/// Create a report generator with color and layout control
#[must_use]
pub fn create_reporter_with_options(
    format: ReportFormat,
    use_color: bool,
    config: ReportConfig,
) -> Box<dyn ReportGenerator> {
    match format {
        ReportFormat::Table => {
            let reporter = TableReporter::new().with_config(config);
            if use_color {
                Box::new(reporter)
            } else {
                Box::new(reporter.no_color())
            }
        }
        ReportFormat::Json => Box::new(JsonReporter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_reporter_formats() {
        assert_eq!(create_reporter(ReportFormat::Table).format(), ReportFormat::Table);
        assert_eq!(create_reporter(ReportFormat::Json).format(), ReportFormat::Json);
    }
}
