//! Shared utilities.

mod hash;

pub use hash::{digest_bytes, digest_file, digest_reader, HashSupplier};
