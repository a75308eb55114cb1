//! Tabular terminal reports.

use super::{InventoryReport, ReportConfig, ReportError, ReportFormat, ReportGenerator};
use crate::aggregate::{ApplicationView, ArchiveDetail, DirectoryRow};
use crate::model::human_size;

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "yellow" => format!("\x1b[33m{text}\x1b[0m"),
            "cyan" => format!("\x1b[36m{text}\x1b[0m"),
            "bold" => format!("\x1b[1m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

/// Tabular reporter with a summary block, a details table and a legend.
#[derive(Debug, Clone)]
pub struct TableReporter {
    /// Use colored output
    colored: bool,
    config: ReportConfig,
}

impl TableReporter {
    /// Create a new table reporter
    #[must_use]
    pub fn new() -> Self {
        Self {
            colored: true,
            config: ReportConfig::default(),
        }
    }

    /// Uncolored reporter with default layout.
    #[must_use]
    pub fn plain() -> Self {
        Self::new().no_color()
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: ReportConfig) -> Self {
        self.config = config;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    fn hash_header(&self) -> (String, usize) {
        let label = format!("SHA256({})", self.config.hash_prefix_len);
        let width = self.config.hash_prefix_len.max(label.len());
        (label, width)
    }

    fn title(&self, lines: &mut Vec<String>) {
        if let Some(title) = &self.config.title {
            lines.push(self.color(title, "bold"));
            lines.push(String::new());
        }
    }
}

impl Default for TableReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for TableReporter {
    fn generate_inventory_report(&self, report: &InventoryReport) -> Result<String, ReportError> {
        let s = &report.summary;
        let mut lines = Vec::new();
        self.title(&mut lines);

        lines.push(self.color("Summary", "bold"));
        lines.push(self.color(&"-".repeat(72), "dim"));
        lines.push(format!("Total archives   : {}", s.total));
        lines.push(format!("Loaded           : {} ({:.1}%)", s.loaded, s.loaded_pct));
        lines.push(format!(
            "Top-level        : {} (loaded {}, {:.1}%)",
            s.top_level, s.top_level_loaded, s.top_level_loaded_pct
        ));
        lines.push(format!(
            "Nested           : {} (loaded {}, {:.1}%)",
            s.nested, s.nested_loaded, s.nested_loaded_pct
        ));
        if s.total_bytes > 0 {
            lines.push(format!(
                "Total size       : {} ({} bytes)",
                human_size(s.total_bytes),
                s.total_bytes
            ));
            lines.push(format!(
                "Loaded size      : {} ({} bytes, {:.1}%)",
                human_size(s.loaded_bytes),
                s.loaded_bytes,
                s.loaded_bytes_pct
            ));
        }
        lines.push(String::new());

        let (hash_label, hash_width) = self.hash_header();
        let name_width = self.config.file_name_width;
        let header = format!(
            "{:<3} L T {:>8} {:>12} {:<hash_width$} {:<name_width$} FULL-PATH / ID",
            "#", "SIZE", "BYTES", hash_label, "FILENAME"
        );
        let rule = "-".repeat(header.chars().count());

        lines.push(self.color("Details", "bold"));
        lines.push(self.color(&rule, "dim"));
        lines.push(self.color(&header, "bold"));
        lines.push(self.color(&rule, "dim"));

        for (index, record) in report.records.iter().enumerate() {
            let loaded = if record.loaded {
                self.color("Y", "green")
            } else {
                "-".to_string()
            };
            let tier = if record.is_top_level() { "T" } else { "N" };
            let (size_human, size_bytes) = match record.size {
                Some(size) => (human_size(size), size.to_string()),
                None => ("?".to_string(), "?".to_string()),
            };
            lines.push(format!(
                "{:<3} {} {} {:>8} {:>12} {:<hash_width$} {:<name_width$} {}",
                index + 1,
                loaded,
                tier,
                size_human,
                size_bytes,
                record.content_hash.prefix(self.config.hash_prefix_len),
                truncate(&record.file_name, name_width),
                record.id
            ));
        }

        lines.push(self.color(&rule, "dim"));
        lines.push(format!(
            "Legend: L=Loaded, T=Top-level, N=Nested. Size is human-readable (base 1024). Hash truncated to {} chars.",
            self.config.hash_prefix_len
        ));

        Ok(lines.join("\n") + "\n")
    }

    fn generate_directory_report(&self, rows: &[DirectoryRow]) -> Result<String, ReportError> {
        let mut lines = Vec::new();
        self.title(&mut lines);

        let (hash_label, hash_width) = self.hash_header();
        let name_width = self.config.file_name_width;
        let header = format!(
            "{:<4} {:>5} {:>6} {:>8} {:<hash_width$} {:<name_width$} KEY",
            "#", "PROCS", "LOADED", "SIZE", hash_label, "FILENAME"
        );
        let rule = "-".repeat(header.chars().count());
        lines.push(self.color(&header, "bold"));
        lines.push(self.color(&rule, "dim"));

        for (index, row) in rows.iter().enumerate() {
            lines.push(format!(
                "{:<4} {:>5} {:>6} {:>8} {:<hash_width$} {:<name_width$} {}",
                index + 1,
                row.process_count,
                row.loaded_process_count,
                row.display_size(),
                row.checksum.prefix(self.config.hash_prefix_len),
                truncate(&row.file_name, name_width),
                row.key
            ));
        }

        lines.push(self.color(&rule, "dim"));
        let loaded = rows.iter().filter(|r| r.loaded_process_count > 0).count();
        lines.push(format!(
            "{} archives, {} loaded by at least one process",
            rows.len(),
            loaded
        ));
        Ok(lines.join("\n") + "\n")
    }

    fn generate_detail_report(&self, detail: &ArchiveDetail) -> Result<String, ReportError> {
        let row = &detail.row;
        let mut lines = Vec::new();
        self.title(&mut lines);

        lines.push(self.color(&row.file_name, "bold"));
        lines.push(format!("{}  {}", self.color("Key:", "cyan"), row.key));
        lines.push(format!("{}  {}", self.color("Checksum:", "cyan"), row.checksum));
        let size = match row.size {
            Some(size) => format!("{} ({size} bytes)", human_size(size)),
            None => "?".to_string(),
        };
        lines.push(format!("{}  {}", self.color("Size:", "cyan"), size));
        lines.push(format!(
            "{}  {} ({} loaded)",
            self.color("Processes:", "cyan"),
            row.process_count,
            row.loaded_process_count
        ));

        if let Some(manifest) = &detail.manifest {
            lines.push(String::new());
            lines.push(self.color("Manifest", "bold"));
            for (key, value) in manifest {
                lines.push(format!("  {key}: {value}"));
            }
        }

        lines.push(String::new());
        lines.push(self.color("References", "bold"));
        for process in &detail.processes {
            let loaded = if process.loaded {
                self.color("Y", "green")
            } else {
                "-".to_string()
            };
            lines.push(format!(
                "  {} {} {} {}",
                loaded,
                process.last_accessed.format("%Y-%m-%d %H:%M:%S"),
                truncate(&process.app_id, 16),
                process.path
            ));
        }
        Ok(lines.join("\n") + "\n")
    }

    fn generate_applications_report(
        &self,
        applications: &[ApplicationView],
    ) -> Result<String, ReportError> {
        let mut lines = Vec::new();
        self.title(&mut lines);

        let header = format!(
            "{:<16} {:>8} {:>6} {:<19} {:<24} COMMAND",
            "APP", "ARCHIVES", "LOADED", "LAST UPDATED", "NAME"
        );
        let rule = "-".repeat(header.chars().count());
        lines.push(self.color(&header, "bold"));
        lines.push(self.color(&rule, "dim"));

        for app in applications {
            let summary = &app.summary;
            lines.push(format!(
                "{:<16} {:>8} {:>6} {:<19} {:<24} {}",
                truncate(&summary.app_id, 16),
                summary.archive_count,
                summary.loaded_count,
                summary.last_updated.format("%Y-%m-%d %H:%M:%S"),
                truncate(app.metadata.name.as_deref().unwrap_or("-"), 24),
                summary.command_line
            ));
            if !app.metadata.tags.is_empty() {
                lines.push(format!(
                    "{:<16} {}",
                    "",
                    self.color(&format!("tags: {}", app.metadata.tags.join(", ")), "dim")
                ));
            }
        }

        lines.push(self.color(&rule, "dim"));
        lines.push(format!("{} applications", applications.len()));
        Ok(lines.join("\n") + "\n")
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Table
    }
}

/// Truncate a string to fit within `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_len).collect()
    }
}
