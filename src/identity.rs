//! Application identity: a stable hash for one logical execution.
//!
//! The id covers the command line, the runtime, and the set of top-level
//! archive checksums. Checksum discovery order does not matter.

use crate::model::{ContentHash, InventoryRecord};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Description of the runtime a process runs on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RuntimeInfo {
    /// Full command line of the process
    pub command_line: String,
    /// Runtime version string
    pub version: String,
    /// Runtime vendor
    pub vendor: String,
    /// Runtime installation path
    pub path: String,
}

impl RuntimeInfo {
    pub fn new(
        command_line: impl Into<String>,
        version: impl Into<String>,
        vendor: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            command_line: command_line.into(),
            version: version.into(),
            vendor: vendor.into(),
            path: path.into(),
        }
    }
}

/// Identity of one monitored process execution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct ApplicationIdentity {
    /// Lowercase hex SHA-256
    pub id: String,
    pub command_line: String,
    pub runtime_version: String,
    pub runtime_vendor: String,
    pub runtime_path: String,
}

impl ApplicationIdentity {
    /// Compute the identity from the runtime and the top-level archives among
    /// `records`. Nested archives, directories and modules do not contribute.
    pub fn compute(runtime: &RuntimeInfo, records: &[InventoryRecord]) -> Self {
        let checksums = records
            .iter()
            .filter(|r| r.is_top_level_archive())
            .map(|r| &r.content_hash);
        Self {
            id: compute_application_id(runtime, checksums),
            command_line: runtime.command_line.clone(),
            runtime_version: runtime.version.clone(),
            runtime_vendor: runtime.vendor.clone(),
            runtime_path: runtime.path.clone(),
        }
    }

    /// Identity with an externally supplied id.
    pub fn with_id(id: impl Into<String>, runtime: &RuntimeInfo) -> Self {
        Self {
            id: id.into(),
            command_line: runtime.command_line.clone(),
            runtime_version: runtime.version.clone(),
            runtime_vendor: runtime.vendor.clone(),
            runtime_path: runtime.path.clone(),
        }
    }

    pub fn runtime(&self) -> RuntimeInfo {
        RuntimeInfo::new(
            self.command_line.as_str(),
            self.runtime_version.as_str(),
            self.runtime_vendor.as_str(),
            self.runtime_path.as_str(),
        )
    }
}

/// Digest, in order: command line, runtime version, runtime vendor, runtime
/// path, then every known checksum sorted lexicographically.
///
/// Unknown-marker checksums are dropped before sorting. Duplicates are kept.
pub fn compute_application_id<'a, I>(runtime: &RuntimeInfo, checksums: I) -> String
where
    I: IntoIterator<Item = &'a ContentHash>,
{
    let mut known: Vec<&str> = checksums
        .into_iter()
        .filter(|c| c.is_known())
        .map(ContentHash::as_str)
        .collect();
    known.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(runtime.command_line.as_bytes());
    hasher.update(runtime.version.as_bytes());
    hasher.update(runtime.vendor.as_bytes());
    hasher.update(runtime.path.as_bytes());
    for checksum in known {
        hasher.update(checksum.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CanonicalId;

    fn runtime() -> RuntimeInfo {
        RuntimeInfo::new("java -jar app.jar", "21", "Eclipse Adoptium", "/opt/jdk")
    }

    fn hashes(values: &[&str]) -> Vec<ContentHash> {
        values.iter().map(|v| ContentHash::new(*v)).collect()
    }

    #[test]
    fn test_known_vector() {
        let id = compute_application_id(&runtime(), &hashes(&["BBB", "AAA"]));
        assert_eq!(
            id,
            "aae8757c8dae370f2d818b026841550719c801c8197440f99691f90090d05d07"
        );
    }

    #[test]
    fn test_empty_inputs() {
        let id = compute_application_id(&RuntimeInfo::default(), &Vec::<ContentHash>::new());
        assert_eq!(
            id,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_order_independent_and_unknown_excluded() {
        let a = compute_application_id(&runtime(), &hashes(&["AAA", "?", "BBB"]));
        let b = compute_application_id(&runtime(), &hashes(&["BBB", "AAA"]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_any_input_change_changes_id() {
        let base = compute_application_id(&runtime(), &hashes(&["AAA"]));
        let mut other = runtime();
        other.vendor.push('x');
        assert_ne!(base, compute_application_id(&other, &hashes(&["AAA"])));
        assert_ne!(base, compute_application_id(&runtime(), &hashes(&["AAB"])));
    }

    #[test]
    fn test_compute_uses_top_level_archives_only() {
        let mut top = InventoryRecord::new(CanonicalId::new("/app/a.jar"));
        top.content_hash = ContentHash::new("AAA");
        let mut nested = InventoryRecord::new(CanonicalId::new("file:/app/a.jar!/lib/b.jar"));
        nested.content_hash = ContentHash::new("BBB");
        let mut dir = InventoryRecord::new(CanonicalId::new("/app/classes/"));
        dir.content_hash = ContentHash::new("CCC");

        let identity = ApplicationIdentity::compute(&runtime(), &[top, nested, dir]);
        assert_eq!(
            identity.id,
            compute_application_id(&runtime(), &hashes(&["AAA"]))
        );
        assert_eq!(identity.runtime(), runtime());
    }
}
