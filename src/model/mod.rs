//! Core data model: canonical identifiers, content hashes and inventory
//! records.
//!
//! Everything that crosses a process boundary (snapshots, aggregated views)
//! is built from these types.

mod hash;
mod identifiers;
mod record;

pub use hash::*;
pub use identifiers::*;
pub use record::*;
