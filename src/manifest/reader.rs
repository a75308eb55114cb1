//! Manifest retrieval from archives, nested archives and class directories.

use super::location::{ManifestLocation, MANIFEST_ENTRY};
use super::parser::parse_manifest;
use crate::model::ManifestAttributes;
use std::fs::{self, File};
use std::io::{self, Cursor, Read, Seek};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

/// Something that can produce manifest attributes for a raw location.
///
/// The inventory recorder goes through this seam so tests and embedders can
/// supply manifests without touching the filesystem.
pub trait ManifestSource: Send + Sync {
    /// Attributes for `raw`, empty when none can be read.
    fn read(&self, raw: &str) -> ManifestAttributes;
}

/// Reads manifests from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemManifests;

impl ManifestSource for FileSystemManifests {
    fn read(&self, raw: &str) -> ManifestAttributes {
        read_manifest(raw)
    }
}

/// Never returns any attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoManifests;

impl ManifestSource for NoManifests {
    fn read(&self, _raw: &str) -> ManifestAttributes {
        ManifestAttributes::new()
    }
}

/// Read the manifest for a raw location.
///
/// Never fails: unsupported schemes, missing files, missing entries and
/// corrupt archives all produce an empty map.
pub fn read_manifest(raw: &str) -> ManifestAttributes {
    let Some(location) = ManifestLocation::resolve(raw) else {
        tracing::debug!("No manifest location for {}", raw);
        return ManifestAttributes::new();
    };
    match read_manifest_at(&location) {
        Ok(attributes) => attributes,
        Err(e) => {
            tracing::debug!("Could not read manifest {}: {}", location, e);
            ManifestAttributes::new()
        }
    }
}

/// Read the manifest at a resolved location.
pub fn read_manifest_at(location: &ManifestLocation) -> io::Result<ManifestAttributes> {
    let bytes = match location {
        ManifestLocation::Archive { archive } => read_zip_entry(archive, MANIFEST_ENTRY)?,
        ManifestLocation::NestedArchive { outer, entry } => {
            let inner = read_zip_entry(outer, entry)?;
            read_entry_from(Cursor::new(inner), MANIFEST_ENTRY)?
        }
        ManifestLocation::Directory { dir } => fs::read(dir.join(MANIFEST_ENTRY))?,
    };
    Ok(parse_manifest(&String::from_utf8_lossy(&bytes)))
}

/// Read the full contents of one entry of a zip archive on disk.
pub(crate) fn read_zip_entry(archive: &Path, entry: &str) -> io::Result<Vec<u8>> {
    read_entry_from(File::open(archive)?, entry)
}

fn read_entry_from<R: Read + Seek>(reader: R, entry: &str) -> io::Result<Vec<u8>> {
    let mut archive = ZipArchive::new(reader).map_err(zip_to_io)?;
    let mut file = archive.by_name(entry).map_err(zip_to_io)?;
    let mut buf = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

fn zip_to_io(e: ZipError) -> io::Error {
    match e {
        ZipError::Io(e) => e,
        ZipError::FileNotFound => io::Error::new(io::ErrorKind::NotFound, "entry not found"),
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}
