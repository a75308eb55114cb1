//! Content hash values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker stored in place of a hash that could not be computed.
pub const UNKNOWN_HASH: &str = "?";

/// SHA-256 content hash of an archive, URL-safe base64 without padding, or
/// the unknown marker.
///
/// Decoding goes through [`ContentHash::new`], so a blank string read from a
/// snapshot becomes the unknown marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Wrap an encoded digest. Empty strings become the unknown marker.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::unknown()
        } else {
            Self(value)
        }
    }

    /// The unknown marker.
    pub fn unknown() -> Self {
        Self(UNKNOWN_HASH.to_string())
    }

    /// True unless this is the unknown marker.
    pub fn is_known(&self) -> bool {
        self.0 != UNKNOWN_HASH
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first `len` characters, used by tabular output.
    pub fn prefix(&self, len: usize) -> &str {
        match self.0.char_indices().nth(len) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl Default for ContentHash {
    fn default() -> Self {
        Self::unknown()
    }
}

impl From<String> for ContentHash {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_marker() {
        assert!(!ContentHash::unknown().is_known());
        assert_eq!(ContentHash::unknown().as_str(), "?");
        assert!(!ContentHash::new("").is_known());
        assert!(!ContentHash::default().is_known());
        assert!(ContentHash::new("H1").is_known());
    }

    #[test]
    fn test_blank_string_decodes_as_unknown() {
        let decoded: Vec<ContentHash> = serde_json::from_str(r#"["", "  ", "?", "H1"]"#).unwrap();
        assert!(!decoded[0].is_known());
        assert!(!decoded[1].is_known());
        assert!(!decoded[2].is_known());
        assert_eq!(decoded[3], ContentHash::new("H1"));
        assert_eq!(serde_json::to_string(&decoded[3]).unwrap(), r#""H1""#);
    }

    #[test]
    fn test_prefix() {
        let hash = ContentHash::new("abcdefghijklmnop");
        assert_eq!(hash.prefix(12), "abcdefghijkl");
        assert_eq!(ContentHash::unknown().prefix(12), "?");
    }
}
