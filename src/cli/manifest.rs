//! Manifest command handler.
//!
//! Resolves a raw location to its manifest and prints the main attributes.

use crate::config::OutputConfig;
use crate::manifest::{read_manifest_at, ManifestLocation};
use crate::pipeline::{exit_codes, write_output, OutputTarget};
use crate::reports::ReportFormat;
use anyhow::{Context, Result};
use std::io::ErrorKind;

/// Run the manifest command
pub fn run_manifest(location: &str, output: &OutputConfig) -> Result<i32> {
    let Some(resolved) = ManifestLocation::resolve(location) else {
        anyhow::bail!("{location} does not name an archive or class directory");
    };

    let attributes = match read_manifest_at(&resolved) {
        Ok(attributes) => attributes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            eprintln!("No manifest found at {resolved}");
            return Ok(exit_codes::NOT_FOUND);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read manifest from {resolved}"));
        }
    };

    let content = match output.format {
        ReportFormat::Json => {
            let mut json = serde_json::to_string_pretty(&serde_json::json!({
                "location": resolved.to_string(),
                "attributes": attributes,
            }))?;
            json.push('\n');
            json
        }
        ReportFormat::Table => {
            let mut text = format!("Manifest of {resolved}\n");
            for (key, value) in &attributes {
                text.push_str(&format!("  {key}: {value}\n"));
            }
            text
        }
    };

    let target = OutputTarget::from_option(output.file.clone());
    write_output(&content, &target, false)?;
    Ok(exit_codes::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    #[test]
    fn test_manifest_written_as_json() {
        let tmp = tempfile::TempDir::new().unwrap();
        let jar = tmp.path().join("app.jar");
        let mut writer = zip::ZipWriter::new(std::fs::File::create(&jar).unwrap());
        writer
            .start_file("META-INF/MANIFEST.MF", SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(b"Manifest-Version: 1.0\r\nMain-Class: com.example.App\r\n")
            .unwrap();
        writer.finish().unwrap();

        let out = tmp.path().join("manifest.json");
        let output = OutputConfig {
            format: ReportFormat::Json,
            file: Some(out.clone()),
            ..OutputConfig::default()
        };
        let code = run_manifest(&jar.display().to_string(), &output).unwrap();
        assert_eq!(code, exit_codes::SUCCESS);

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(value["attributes"]["Main-Class"], "com.example.App");
    }

    #[test]
    fn test_missing_archive_is_not_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        let jar = tmp.path().join("missing.jar");
        let code = run_manifest(&jar.display().to_string(), &OutputConfig::default()).unwrap();
        assert_eq!(code, exit_codes::NOT_FOUND);
    }

    #[test]
    fn test_runtime_module_rejected() {
        assert!(run_manifest("jrt:/java.base", &OutputConfig::default()).is_err());
    }
}
