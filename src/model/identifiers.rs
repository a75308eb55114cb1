//! Canonical identifiers for archives, directories and runtime modules.
//!
//! The same physical archive reaches the inventory through two very different
//! paths: the static classpath scan and the class-load observer. Each speaks its
//! own dialect of location string, so both are funnelled through
//! [`CanonicalId::normalize`]. The recognised forms, in priority order:
//!
//! 1. **Nested loader** - `jar:nested:/app/outer.jar/!BOOT-INF/lib/inner.jar!/`
//! 2. **Inline nested** - `file:/app/outer.jar/!BOOT-INF/lib/inner.jar!/`
//! 3. **Plain archive or directory** - `file:/app/lib/a.jar`,
//!    `file:/app/lib/a.jar!/com/example/`, `file:/app/classes`
//! 4. **Runtime module** - `jrt:/java.base`
//! 5. **Foreign** - any other scheme
//!
//! Forms 4 and 5 are kept verbatim up to the first `!`.
//!
//! Forms 1 and 2 converge on `file:/app/outer.jar!/BOOT-INF/lib/inner.jar`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pseudo-scheme used by nested-archive class loaders.
pub const NESTED_LOADER_PREFIX: &str = "jar:nested:";
/// Generic archive URL wrapper (`jar:file:/a.jar!/entry`).
pub const JAR_URL_PREFIX: &str = "jar:";
/// File scheme prefix.
pub const FILE_SCHEME: &str = "file:";
/// Runtime module scheme.
pub const RUNTIME_MODULE_SCHEME: &str = "jrt:";
/// Canonical archive extension.
pub const ARCHIVE_EXTENSION: &str = ".jar";
/// Separator between the outer archive and an inner path in raw nested forms.
pub const NESTED_MARKER: &str = "/!";
/// Entry-within-archive separator used by canonical nested ids.
pub const ENTRY_SEPARATOR: &str = "!/";

/// Which raw location form a string was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationForm {
    /// `jar:nested:<outer>/!<inner>[!/]`
    NestedLoader,
    /// `file:<outer>/!<inner>[!/]`
    InlineNested,
    /// A file-scheme or scheme-less location naming an archive
    PlainArchive,
    /// A file-scheme or scheme-less location naming a directory
    Directory,
    /// `jrt:` module location
    RuntimeModule,
    /// Anything else
    Foreign,
}

impl LocationForm {
    /// Detect the form of a raw location string.
    ///
    /// This is the single scheme-detection routine shared by the normalizer
    /// and the manifest resolver.
    pub fn detect(raw: &str) -> Self {
        if raw.starts_with(NESTED_LOADER_PREFIX) {
            return Self::NestedLoader;
        }
        let unwrapped = strip_jar_wrappers(raw);
        if is_file_like(unwrapped) && split_nested(unwrapped).is_some() {
            return Self::InlineNested;
        }
        if unwrapped.starts_with(RUNTIME_MODULE_SCHEME) {
            return Self::RuntimeModule;
        }
        if is_file_like(unwrapped) {
            let plain = normalize_plain(unwrapped);
            return if plain.ends_with('/') {
                Self::Directory
            } else {
                Self::PlainArchive
            };
        }
        Self::Foreign
    }
}

/// Kind of a canonical identifier, derived from its normalized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdKind {
    /// Top-level archive
    Archive,
    /// Archive nested inside another archive
    NestedArchive,
    /// Exploded class directory
    Directory,
    /// Runtime module
    RuntimeModule,
    /// Unrecognised scheme
    Other,
}

/// Canonical identifier of one logical archive, directory or module within a
/// process.
///
/// Two raw locations denoting the same archive always normalize to the same
/// `CanonicalId`. Ordering and hashing use the normalized string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalId {
    value: String,
}

impl CanonicalId {
    /// Wrap a string that is already in canonical form.
    ///
    /// Scanners that build nested ids themselves (`file:/a.jar!/lib/b.jar`)
    /// use this directly; everything else should go through [`normalize`].
    ///
    /// [`normalize`]: CanonicalId::normalize
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Normalize a raw location. `None` and blank input yield `None`.
    ///
    /// Total and pure: unrecognised input is returned verbatim, minus any `!`
    /// entry suffix.
    pub fn normalize(raw: Option<&str>) -> Option<Self> {
        let raw = raw?;
        if raw.trim().is_empty() {
            return None;
        }
        Some(Self::new(normalize_location(raw)))
    }

    /// Convenience wrapper around [`CanonicalId::normalize`] for non-null input.
    pub fn from_raw(raw: &str) -> Option<Self> {
        Self::normalize(Some(raw))
    }

    /// Get the canonical ID value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Classify this identifier.
    pub fn kind(&self) -> IdKind {
        let v = self.value.as_str();
        if v.starts_with(RUNTIME_MODULE_SCHEME) {
            IdKind::RuntimeModule
        } else if v.contains(ENTRY_SEPARATOR) {
            IdKind::NestedArchive
        } else if !is_file_like(v) {
            IdKind::Other
        } else if has_archive_extension(v) {
            IdKind::Archive
        } else if v.ends_with('/') {
            IdKind::Directory
        } else {
            IdKind::Other
        }
    }

    /// True if this id names something packaged inside another archive.
    pub fn is_nested(&self) -> bool {
        self.value.contains(ENTRY_SEPARATOR)
    }

    /// True if this id has no nested separator.
    pub fn is_top_level(&self) -> bool {
        !self.is_nested()
    }

    /// The outer archive of a nested id, `None` for top-level ids.
    pub fn container(&self) -> Option<&str> {
        self.value
            .find(ENTRY_SEPARATOR)
            .map(|idx| &self.value[..idx])
    }

    /// The path inside the container, or the whole value for top-level ids.
    pub fn inner_path(&self) -> &str {
        match self.value.find(ENTRY_SEPARATOR) {
            Some(idx) => &self.value[idx + ENTRY_SEPARATOR.len()..],
            None => &self.value,
        }
    }

    /// Simple file name: last segment after the last `!/` and path separator.
    pub fn file_name(&self) -> String {
        let tail = match self.value.rfind(ENTRY_SEPARATOR) {
            Some(idx) => &self.value[idx + ENTRY_SEPARATOR.len()..],
            None => self.value.as_str(),
        };
        let tail = tail.trim_end_matches(['/', '\\']);
        let name = match tail.rfind(['/', '\\']) {
            Some(idx) => &tail[idx + 1..],
            None => tail,
        };
        name.to_string()
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl AsRef<str> for CanonicalId {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

// ============================================================================
// Normalization rules
// ============================================================================

fn normalize_location(raw: &str) -> String {
    match LocationForm::detect(raw) {
        LocationForm::NestedLoader => {
            let rest = &raw[NESTED_LOADER_PREFIX.len()..];
            match split_nested(rest) {
                Some((outer, inner)) => assemble_nested(outer, inner),
                None => {
                    let rest = rest.strip_suffix(ENTRY_SEPARATOR).unwrap_or(rest);
                    normalize_plain(&with_file_scheme(rest))
                }
            }
        }
        LocationForm::InlineNested => {
            let unwrapped = strip_jar_wrappers(raw);
            match split_nested(unwrapped) {
                Some((outer, inner)) => assemble_nested(outer, inner),
                None => normalize_plain(unwrapped),
            }
        }
        LocationForm::PlainArchive | LocationForm::Directory => {
            normalize_plain(strip_jar_wrappers(raw))
        }
        LocationForm::RuntimeModule | LocationForm::Foreign => {
            strip_entry_suffix(raw).to_string()
        }
    }
}

/// Drop an `!...` entry suffix; a leading `!` is kept.
fn strip_entry_suffix(s: &str) -> &str {
    match s.find('!') {
        Some(idx) if idx > 0 => &s[..idx],
        _ => s,
    }
}

/// Split `<outer>/!<inner>[!/]` into its parts. The inner part loses any
/// trailing `!/`; an empty outer or inner part is not a nested form.
fn split_nested(path: &str) -> Option<(&str, &str)> {
    let idx = path.find(NESTED_MARKER)?;
    if idx == 0 {
        return None;
    }
    let outer = &path[..idx];
    let inner = &path[idx + NESTED_MARKER.len()..];
    let inner = inner.strip_suffix(ENTRY_SEPARATOR).unwrap_or(inner);
    if inner.is_empty() {
        return None;
    }
    Some((outer, inner))
}

fn assemble_nested(outer: &str, inner: &str) -> String {
    format!("{}{}{}", with_file_scheme(outer), ENTRY_SEPARATOR, inner)
}

/// Rule 3: archives are kept, entry markers are stripped, directories get
/// exactly one trailing separator. A `!/` suffix that itself names an archive
/// is a canonical nested id and survives, which keeps normalization
/// idempotent.
fn normalize_plain(s: &str) -> String {
    if let Some(idx) = s.find(ENTRY_SEPARATOR) {
        let outer = &s[..idx];
        let rest = &s[idx + ENTRY_SEPARATOR.len()..];
        let inner = rest.split('!').next().unwrap_or_default();
        if has_archive_extension(outer) && has_archive_extension(inner) {
            return format!("{outer}{ENTRY_SEPARATOR}{inner}");
        }
    }

    let base = strip_entry_suffix(s);
    if has_archive_extension(base) {
        base.to_string()
    } else {
        format!("{}/", base.trim_end_matches('/'))
    }
}

fn with_file_scheme(path: &str) -> String {
    if path.starts_with(FILE_SCHEME) {
        path.to_string()
    } else {
        format!("{FILE_SCHEME}{path}")
    }
}

/// Strip leading `jar:` wrappers, but never the nested-loader pseudo-scheme.
fn strip_jar_wrappers(mut raw: &str) -> &str {
    while raw.starts_with(JAR_URL_PREFIX) && !raw.starts_with(NESTED_LOADER_PREFIX) {
        raw = &raw[JAR_URL_PREFIX.len()..];
    }
    raw
}

/// `file:` URLs and scheme-less paths (including `C:\...` drive paths).
pub(crate) fn is_file_like(s: &str) -> bool {
    s.starts_with(FILE_SCHEME) || url_scheme(s).is_none()
}

/// The URL scheme of `s`, if it has one of at least two characters.
fn url_scheme(s: &str) -> Option<&str> {
    let colon = s.find(':')?;
    let scheme = &s[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    let valid = scheme.len() >= 2
        && first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

pub(crate) fn has_archive_extension(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= ARCHIVE_EXTENSION.len()
        && bytes[bytes.len() - ARCHIVE_EXTENSION.len()..]
            .eq_ignore_ascii_case(ARCHIVE_EXTENSION.as_bytes())
}
