//! Manifest resolution and parsing.
//!
//! Given a raw location, find the `META-INF/MANIFEST.MF` it refers to (in an
//! archive, an archive nested inside another archive, or an exploded class
//! directory) and parse it into ordered attributes. Reading is best-effort.

mod location;
mod parser;
mod reader;

pub use location::{ManifestLocation, MANIFEST_ENTRY};
pub use parser::{parse_manifest, ManifestParser, ScanState};
pub(crate) use reader::read_zip_entry;
pub use reader::{read_manifest, read_manifest_at, FileSystemManifests, ManifestSource, NoManifests};
