//! Integration tests for the per-process inventory.
//!
//! These tests drive the recorder the way the class-load observer and the
//! classpath scanner would, against real archives on disk.

use jarscope::{
    config::InventoryConfig,
    model::{CanonicalId, ContentHash, IdKind},
    utils::{digest_bytes, HashSupplier},
    InventoryRecorder, InventoryStore, ProcessSnapshot, RuntimeInfo,
};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

// ============================================================================
// Test Fixtures
// ============================================================================

fn write_jar(path: &Path, entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, data) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
    std::fs::read(path).unwrap()
}

/// An executable archive with one nested library.
struct BootJar {
    _tmp: TempDir,
    outer: PathBuf,
    outer_bytes: Vec<u8>,
    inner_bytes: Vec<u8>,
}

impl BootJar {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let inner_path = tmp.path().join("inner.jar");
        let inner_bytes = write_jar(
            &inner_path,
            &[
                (
                    "META-INF/MANIFEST.MF",
                    b"Manifest-Version: 1.0\nImplementation-Title: inner\n",
                ),
                ("com/example/Inner.class", b"\xca\xfe\xba\xbe"),
            ],
        );
        let outer = tmp.path().join("app.jar");
        let outer_bytes = write_jar(
            &outer,
            &[
                (
                    "META-INF/MANIFEST.MF",
                    b"Manifest-Version: 1.0\nMain-Class: com.example.App\n",
                ),
                ("BOOT-INF/lib/inner.jar", &inner_bytes),
            ],
        );
        let outer = outer.canonicalize().unwrap();
        Self {
            _tmp: tmp,
            outer,
            outer_bytes,
            inner_bytes,
        }
    }

    fn outer_url(&self) -> String {
        format!("file:{}", self.outer.display())
    }

    fn nested_loader_url(&self) -> String {
        format!("jar:nested:{}/!BOOT-INF/lib/inner.jar!/", self.outer.display())
    }

    fn inline_nested_url(&self) -> String {
        format!("file:{}/!BOOT-INF/lib/inner.jar!/", self.outer.display())
    }

    fn nested_id(&self) -> CanonicalId {
        CanonicalId::new(format!(
            "file:{}!/BOOT-INF/lib/inner.jar",
            self.outer.display()
        ))
    }
}

// ============================================================================
// Recorder Tests
// ============================================================================

mod recorder_tests {
    use super::*;

    #[test]
    fn test_declare_then_load_nested_archive() {
        let jar = BootJar::new();
        let recorder = InventoryRecorder::new(InventoryConfig::default());

        recorder.classpath_declared(
            &jar.inline_nested_url(),
            Some(jar.inner_bytes.len() as u64),
            Some(HashSupplier::from_nested_entry(
                &jar.outer,
                "BOOT-INF/lib/inner.jar",
            )),
        );
        let id = recorder
            .class_load_observed(Some(jar.nested_loader_url().as_str()))
            .unwrap();
        assert_eq!(id, jar.nested_id());

        let store = recorder.store();
        assert_eq!(store.len(), 1);
        let record = store.get(&id).unwrap();
        assert!(record.loaded);
        assert!(record.declared);
        assert_eq!(record.kind(), IdKind::NestedArchive);
        assert_eq!(record.file_name, "inner.jar");
        assert_eq!(record.content_hash, digest_bytes(&jar.inner_bytes));
        assert_eq!(
            record.manifest.unwrap()["Implementation-Title"],
            "inner"
        );
    }

    #[test]
    fn test_load_then_declare_converges() {
        let jar = BootJar::new();

        let first = InventoryRecorder::new(InventoryConfig::default());
        first.classpath_declared(
            &jar.outer_url(),
            Some(jar.outer_bytes.len() as u64),
            Some(HashSupplier::from_file(&jar.outer)),
        );
        let class_url = format!("jar:{}!/com/example/App.class", jar.outer_url());
        first.class_load_observed(Some(class_url.as_str()));

        let second = InventoryRecorder::new(InventoryConfig::default());
        let entry_url = format!("{}!/", jar.outer_url());
        second.class_load_observed(Some(entry_url.as_str()));
        second.classpath_declared(
            &jar.outer_url(),
            Some(jar.outer_bytes.len() as u64),
            Some(HashSupplier::from_file(&jar.outer)),
        );

        let a = first.store().snapshot();
        let b = second.store().snapshot();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a[0].id, b[0].id);
        assert_eq!(a[0].loaded, b[0].loaded);
        assert_eq!(a[0].size, b[0].size);
        assert_eq!(a[0].content_hash, b[0].content_hash);
        assert_eq!(a[0].manifest, b[0].manifest);
        assert_eq!(a[0].manifest.as_ref().unwrap()["Main-Class"], "com.example.App");
    }

    #[test]
    fn test_unreadable_archive_degrades_to_unknown() {
        let recorder = InventoryRecorder::new(InventoryConfig::default());
        let record = recorder
            .classpath_declared(
                "file:/nonexistent/lib/gone.jar",
                None,
                Some(HashSupplier::from_file("/nonexistent/lib/gone.jar")),
            )
            .unwrap();
        assert_eq!(record.content_hash, ContentHash::unknown());
        assert_eq!(record.size, None);

        recorder.class_load_observed(Some("file:/nonexistent/lib/gone.jar"));
        let record = recorder
            .store()
            .get(&CanonicalId::new("file:/nonexistent/lib/gone.jar"))
            .unwrap();
        assert!(record.loaded);
        assert!(record.manifest.is_none());
    }

    #[test]
    fn test_null_and_blank_locations_ignored() {
        let recorder = InventoryRecorder::new(InventoryConfig::default());
        assert!(recorder.class_load_observed(None).is_none());
        assert!(recorder.class_load_observed(Some("  ")).is_none());
        assert!(recorder.store().is_empty());
    }

    #[test]
    fn test_concurrent_loads_announce_once() {
        let jar = BootJar::new();
        let recorder = Arc::new(InventoryRecorder::new(InventoryConfig::default()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let recorder = Arc::clone(&recorder);
                let raw = if i % 2 == 0 {
                    jar.nested_loader_url()
                } else {
                    jar.inline_nested_url()
                };
                thread::spawn(move || {
                    for _ in 0..50 {
                        recorder.class_load_observed(Some(raw.as_str()));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(recorder.store().len(), 1);
        assert_eq!(recorder.announced_count(), 1);
        assert!(recorder.store().get(&jar.nested_id()).unwrap().loaded);
    }
}

// ============================================================================
// Snapshot and Report Tests
// ============================================================================

mod snapshot_tests {
    use super::*;

    #[test]
    fn test_identity_ignores_nested_archives() {
        let jar = BootJar::new();
        let runtime = RuntimeInfo::new("java -jar app.jar", "21", "Vendor", "/opt/jdk");

        let only_top = InventoryStore::new();
        only_top.register_declared(
            &CanonicalId::from_raw(&jar.outer_url()).unwrap(),
            None,
            Some(HashSupplier::from_bytes(jar.outer_bytes.clone())),
        );

        let with_nested = InventoryStore::new();
        with_nested.register_declared(
            &CanonicalId::from_raw(&jar.outer_url()).unwrap(),
            None,
            Some(HashSupplier::from_bytes(jar.outer_bytes.clone())),
        );
        with_nested.register_declared(
            &jar.nested_id(),
            None,
            Some(HashSupplier::from_bytes(jar.inner_bytes.clone())),
        );

        let a = ProcessSnapshot::capture(&only_top, &runtime);
        let b = ProcessSnapshot::capture(&with_nested, &runtime);
        assert_eq!(a.app_id(), b.app_id());
        assert_eq!(a.app_id().len(), 64);
    }

    #[test]
    fn test_snapshot_json_survives_bad_record() {
        let store = InventoryStore::new();
        store.mark_loaded(&CanonicalId::new("/lib/a.jar"));
        let snapshot = ProcessSnapshot::capture(&store, &RuntimeInfo::default());

        let mut value: serde_json::Value =
            serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        value["records"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!({"id": 42}));

        let decoded = ProcessSnapshot::from_json(&value.to_string()).unwrap();
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.records[0].id, CanonicalId::new("/lib/a.jar"));
        assert_eq!(decoded.app_id(), snapshot.app_id());
    }

    #[test]
    fn test_store_report_lists_loaded_first() {
        let store = InventoryStore::new();
        store.register_declared(&CanonicalId::new("/lib/zzz-unused.jar"), Some(10), None);
        store.register_declared(&CanonicalId::new("/lib/aaa-used.jar"), Some(2048), None);
        store.mark_loaded(&CanonicalId::new("/lib/aaa-used.jar"));

        let mut out = Vec::new();
        store.report(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Total archives   : 2"));
        assert!(text.contains("Loaded           : 1 (50.0%)"));
        let used = text.find("aaa-used.jar").unwrap();
        let unused = text.find("zzz-unused.jar").unwrap();
        assert!(used < unused);
    }
}
