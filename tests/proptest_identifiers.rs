//! Property-based tests for identifier normalization and application ids.
//!
//! Ensures the normalizer handles arbitrary input without panicking, and that
//! the equivalences between location dialects hold across random paths.

use jarscope::model::{CanonicalId, ContentHash, IdKind};
use jarscope::{compute_application_id, RuntimeInfo};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,10}"
}

fn dir_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..4).prop_map(|parts| format!("/{}", parts.join("/")))
}

fn archive_path() -> impl Strategy<Value = String> {
    (dir_path(), segment()).prop_map(|(dir, name)| format!("{dir}/{name}.jar"))
}

fn inner_archive() -> impl Strategy<Value = String> {
    (prop::collection::vec(segment(), 0..3), segment()).prop_map(|(dirs, name)| {
        let mut parts = dirs;
        parts.push(format!("{name}.jar"));
        parts.join("/")
    })
}

fn norm(raw: &str) -> Option<String> {
    CanonicalId::from_raw(raw).map(|id| id.value().to_string())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn normalize_doesnt_panic(s in "\\PC{0,200}") {
        if let Some(id) = CanonicalId::from_raw(&s) {
            let _ = id.kind();
            let _ = id.file_name();
            let _ = id.container();
            let _ = id.inner_path();
        }
    }

    #[test]
    fn blank_input_is_ignored(s in "[ \\t]{0,10}") {
        prop_assert_eq!(CanonicalId::from_raw(&s), None);
    }

    #[test]
    fn nested_dialects_converge(outer in archive_path(), inner in inner_archive()) {
        let expected = format!("file:{outer}!/{inner}");
        let loader = norm(&format!("jar:nested:{outer}/!{inner}!/"));
        let inline = norm(&format!("file:{outer}/!{inner}!/"));
        let inline_bare = norm(&format!("file:{outer}/!{inner}"));
        prop_assert_eq!(loader.as_deref(), Some(expected.as_str()));
        prop_assert_eq!(inline.as_deref(), Some(expected.as_str()));
        prop_assert_eq!(inline_bare.as_deref(), Some(expected.as_str()));
        prop_assert_eq!(
            CanonicalId::new(expected.clone()).kind(),
            IdKind::NestedArchive
        );
    }

    #[test]
    fn archive_entry_suffixes_stripped(
        archive in archive_path(),
        entry in prop::collection::vec(segment(), 0..4),
    ) {
        let url = format!("file:{archive}");
        let with_entry = format!("jar:{url}!/{}", entry.join("/"));
        prop_assert_eq!(norm(&with_entry), Some(url.clone()));
        prop_assert_eq!(norm(&format!("{url}!/")), Some(url));
    }

    #[test]
    fn directories_get_one_trailing_slash(dir in dir_path(), slashes in 0usize..3) {
        let raw = format!("file:{dir}{}", "/".repeat(slashes));
        let normalized = norm(&raw).unwrap();
        prop_assert_eq!(normalized, format!("file:{dir}/"));
    }

    #[test]
    fn normalization_is_idempotent(
        outer in archive_path(),
        inner in inner_archive(),
        dir in dir_path(),
        pick in 0usize..5,
    ) {
        let raw = match pick {
            0 => format!("jar:nested:{outer}/!{inner}!/"),
            1 => format!("file:{outer}/!{inner}!/"),
            2 => format!("jar:file:{outer}!/com/example/A.class"),
            3 => format!("file:{dir}"),
            _ => format!("jrt:{dir}"),
        };
        let once = norm(&raw).unwrap();
        prop_assert_eq!(norm(&once), Some(once.clone()));
    }

    #[test]
    fn application_id_ignores_checksum_order(
        hashes in prop::collection::vec("[A-Za-z0-9_-]{43}", 0..8),
        command_line in "\\PC{0,40}",
    ) {
        let runtime = RuntimeInfo::new(command_line, "21", "Vendor", "/opt/jdk");
        let checksums: Vec<ContentHash> = hashes.iter().map(ContentHash::new).collect();
        let mut reversed = checksums.clone();
        reversed.reverse();
        let mut with_unknown = checksums.clone();
        with_unknown.push(ContentHash::unknown());

        let id = compute_application_id(&runtime, &checksums);
        prop_assert_eq!(&id, &compute_application_id(&runtime, &reversed));
        prop_assert_eq!(&id, &compute_application_id(&runtime, &with_unknown));
        prop_assert_eq!(id.len(), 64);
    }
}
