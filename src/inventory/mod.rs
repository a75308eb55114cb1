//! Per-process inventory.
//!
//! [`InventoryStore`] is the concurrent registry; [`InventoryRecorder`] is the
//! front door used by load observers and classpath scanners.

mod recorder;
mod store;

pub use recorder::InventoryRecorder;
pub use store::InventoryStore;
