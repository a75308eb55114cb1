//! JSON report generator.

use super::{InventoryReport, InventorySummary, ReportError, ReportFormat, ReportGenerator};
use crate::aggregate::{ApplicationView, ArchiveDetail, DirectoryRow};
use crate::model::InventoryRecord;
use chrono::Utc;
use serde::Serialize;

/// JSON report generator
#[derive(Debug, Clone)]
pub struct JsonReporter {
    /// Pretty print output
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// Set pretty printing
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ReportError> {
        let encoded = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        encoded
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| ReportError::SerializationError(e.to_string()))
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for JsonReporter {
    fn generate_inventory_report(&self, report: &InventoryReport) -> Result<String, ReportError> {
        self.encode(&JsonInventoryReport {
            metadata: JsonReportMetadata::now(),
            summary: &report.summary,
            records: &report.records,
        })
    }

    fn generate_directory_report(&self, rows: &[DirectoryRow]) -> Result<String, ReportError> {
        self.encode(&JsonDirectoryReport {
            metadata: JsonReportMetadata::now(),
            archive_count: rows.len(),
            archives: rows,
        })
    }

    fn generate_detail_report(&self, detail: &ArchiveDetail) -> Result<String, ReportError> {
        self.encode(detail)
    }

    fn generate_applications_report(
        &self,
        applications: &[ApplicationView],
    ) -> Result<String, ReportError> {
        self.encode(&JsonApplicationsReport {
            metadata: JsonReportMetadata::now(),
            application_count: applications.len(),
            applications,
        })
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }
}

#[derive(Serialize)]
struct JsonReportMetadata {
    tool: ToolInfo,
    generated_at: String,
}

impl JsonReportMetadata {
    fn now() -> Self {
        Self {
            tool: ToolInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    version: String,
}

#[derive(Serialize)]
struct JsonInventoryReport<'a> {
    metadata: JsonReportMetadata,
    summary: &'a InventorySummary,
    records: &'a [InventoryRecord],
}

#[derive(Serialize)]
struct JsonDirectoryReport<'a> {
    metadata: JsonReportMetadata,
    archive_count: usize,
    archives: &'a [DirectoryRow],
}

#[derive(Serialize)]
struct JsonApplicationsReport<'a> {
    metadata: JsonReportMetadata,
    application_count: usize,
    applications: &'a [ApplicationView],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CanonicalId, ContentHash};

    #[test]
    fn test_inventory_json_shape() {
        let mut record = InventoryRecord::new(CanonicalId::new("/a.jar"));
        record.loaded = true;
        record.size = Some(10);
        let report = InventoryReport::from_records(vec![record]);

        let text = JsonReporter::new().generate_inventory_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["metadata"]["tool"]["name"], "jarscope");
        assert_eq!(value["summary"]["total"], 1);
        assert_eq!(value["summary"]["total_bytes"], 10);
        assert_eq!(value["records"][0]["id"], "/a.jar");
    }

    #[test]
    fn test_directory_json_shape() {
        let rows = vec![DirectoryRow {
            key: crate::model::DedupKey::Hash(ContentHash::new("H1")),
            file_name: "a.jar".into(),
            checksum: ContentHash::new("H1"),
            size: None,
            process_count: 2,
            loaded_process_count: 1,
        }];
        let text = JsonReporter::new()
            .pretty(false)
            .generate_directory_report(&rows)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["archive_count"], 1);
        assert_eq!(value["archives"][0]["key"]["type"], "hash");
        assert_eq!(value["archives"][0]["key"]["value"], "H1");
        assert_eq!(value["archives"][0]["process_count"], 2);
        assert!(value["archives"][0]["size"].is_null());
    }
}
