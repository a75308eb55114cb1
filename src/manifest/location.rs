//! Resolution of a location string to the place its manifest lives.

use crate::model::{has_archive_extension, CanonicalId, IdKind, LocationForm, FILE_SCHEME};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Entry path of the manifest inside an archive or class directory.
pub const MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";

/// Where to find the manifest for one archive or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLocation {
    /// `META-INF/MANIFEST.MF` inside an archive on disk
    Archive { archive: PathBuf },
    /// `META-INF/MANIFEST.MF` inside `entry`, itself stored in `outer`
    NestedArchive { outer: PathBuf, entry: String },
    /// `META-INF/MANIFEST.MF` under an exploded class directory
    Directory { dir: PathBuf },
}

impl ManifestLocation {
    /// Resolve a raw location using the normalizer's scheme detection.
    ///
    /// Runtime modules, foreign schemes and unparseable file URLs have no
    /// reachable manifest and yield `None`.
    pub fn resolve(raw: &str) -> Option<Self> {
        match LocationForm::detect(raw) {
            LocationForm::RuntimeModule | LocationForm::Foreign => None,
            LocationForm::NestedLoader
            | LocationForm::InlineNested
            | LocationForm::PlainArchive
            | LocationForm::Directory => Self::from_id(&CanonicalId::from_raw(raw)?),
        }
    }

    /// Resolve an already canonical id.
    pub fn from_id(id: &CanonicalId) -> Option<Self> {
        match id.kind() {
            IdKind::Archive => Some(Self::Archive {
                archive: to_local_path(id.value())?,
            }),
            IdKind::NestedArchive => {
                let outer = to_local_path(id.container()?)?;
                let entry = id.inner_path();
                if has_archive_extension(entry) {
                    Some(Self::NestedArchive {
                        outer,
                        entry: entry.to_string(),
                    })
                } else {
                    Some(Self::Archive { archive: outer })
                }
            }
            IdKind::Directory => Some(Self::Directory {
                dir: to_local_path(id.value())?,
            }),
            IdKind::RuntimeModule | IdKind::Other => None,
        }
    }
}

impl fmt::Display for ManifestLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Archive { archive } => write!(f, "{}!/{MANIFEST_ENTRY}", archive.display()),
            Self::NestedArchive { outer, entry } => {
                write!(f, "{}!/{entry}!/{MANIFEST_ENTRY}", outer.display())
            }
            Self::Directory { dir } => write!(f, "{}", dir.join(MANIFEST_ENTRY).display()),
        }
    }
}

/// Convert a `file:` URL or plain path to a local filesystem path.
pub(crate) fn to_local_path(location: &str) -> Option<PathBuf> {
    if location.starts_with(FILE_SCHEME) {
        Url::parse(location).ok()?.to_file_path().ok()
    } else {
        Some(PathBuf::from(location))
    }
}
