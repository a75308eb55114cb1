//! Content hashing utilities.
//!
//! Archive digests are SHA-256 over the full byte stream, encoded as URL-safe
//! base64 without padding. Any I/O failure degrades to the unknown marker.

use crate::model::ContentHash;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Buffer size for streaming reads (8 KiB).
const BUF_SIZE: usize = 8 * 1024;

type OpenFn = Box<dyn FnOnce() -> io::Result<Box<dyn Read>> + Send>;

/// Zero-argument accessor for an archive's bytes, invoked at most once.
pub struct HashSupplier {
    open: OpenFn,
    label: String,
}

impl HashSupplier {
    /// Build a supplier from any fallible opener.
    pub fn new<F, R>(label: impl Into<String>, open: F) -> Self
    where
        F: FnOnce() -> io::Result<R> + Send + 'static,
        R: Read + 'static,
    {
        Self {
            open: Box::new(move || open().map(|r| Box::new(r) as Box<dyn Read>)),
            label: label.into(),
        }
    }

    /// Stream a file on disk.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self::new(label, move || File::open(&path))
    }

    /// Stream one entry of a zip archive, typically an archive nested inside
    /// an executable archive.
    pub fn from_nested_entry(outer: impl Into<PathBuf>, entry: impl Into<String>) -> Self {
        let outer = outer.into();
        let entry = entry.into();
        let label = format!("{}!/{}", outer.display(), entry);
        Self::new(label, move || {
            crate::manifest::read_zip_entry(&outer, &entry).map(io::Cursor::new)
        })
    }

    /// Hash an in-memory buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::new("<memory>", move || Ok(io::Cursor::new(bytes)))
    }

    /// Human-readable description of the byte source.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Consume the supplier and digest its stream. Failures yield the
    /// unknown marker.
    pub fn hash(self) -> ContentHash {
        let label = self.label;
        match (self.open)().and_then(digest_reader) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::debug!("Hashing {} failed: {}", label, e);
                ContentHash::unknown()
            }
        }
    }
}

impl std::fmt::Debug for HashSupplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashSupplier")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Stream all bytes of `reader` through SHA-256.
pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<ContentHash> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(ContentHash::new(URL_SAFE_NO_PAD.encode(hasher.finalize())))
}

/// Digest an in-memory buffer.
pub fn digest_bytes(data: &[u8]) -> ContentHash {
    ContentHash::new(URL_SAFE_NO_PAD.encode(Sha256::digest(data)))
}

/// Digest a file, or the unknown marker if it cannot be read.
pub fn digest_file(path: &Path) -> ContentHash {
    HashSupplier::from_file(path).hash()
}
