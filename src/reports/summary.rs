//! Inventory summary statistics and report ordering.

use crate::model::InventoryRecord;
use serde::Serialize;
use std::cmp::Ordering;

/// Percentage of `part` in `total`, 0 when `total` is 0.
pub fn pct(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// Counts and byte totals over one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct InventorySummary {
    pub total: u64,
    pub loaded: u64,
    pub top_level: u64,
    pub top_level_loaded: u64,
    pub nested: u64,
    pub nested_loaded: u64,
    /// Sum over records with a known size
    pub total_bytes: u64,
    /// Sum over loaded records with a known size
    pub loaded_bytes: u64,
    pub loaded_pct: f64,
    pub top_level_loaded_pct: f64,
    pub nested_loaded_pct: f64,
    pub loaded_bytes_pct: f64,
}

impl InventorySummary {
    pub fn from_records(records: &[InventoryRecord]) -> Self {
        let mut s = Self::default();
        for record in records {
            s.total += 1;
            if record.is_top_level() {
                s.top_level += 1;
            } else {
                s.nested += 1;
            }
            if record.loaded {
                s.loaded += 1;
                if record.is_top_level() {
                    s.top_level_loaded += 1;
                } else {
                    s.nested_loaded += 1;
                }
            }
            if let Some(size) = record.size {
                s.total_bytes = s.total_bytes.saturating_add(size);
                if record.loaded {
                    s.loaded_bytes = s.loaded_bytes.saturating_add(size);
                }
            }
        }
        s.loaded_pct = pct(s.loaded, s.total);
        s.top_level_loaded_pct = pct(s.top_level_loaded, s.top_level);
        s.nested_loaded_pct = pct(s.nested_loaded, s.nested);
        s.loaded_bytes_pct = pct(s.loaded_bytes, s.total_bytes);
        s
    }
}

/// Report ordering: loaded first, then top-level before nested, then file
/// name ignoring case. The id breaks remaining ties.
pub fn report_order(a: &InventoryRecord, b: &InventoryRecord) -> Ordering {
    b.loaded
        .cmp(&a.loaded)
        .then_with(|| b.is_top_level().cmp(&a.is_top_level()))
        .then_with(|| {
            a.file_name
                .to_lowercase()
                .cmp(&b.file_name.to_lowercase())
        })
        .then_with(|| a.id.cmp(&b.id))
}

/// A sorted snapshot with its summary, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryReport {
    pub summary: InventorySummary,
    pub records: Vec<InventoryRecord>,
}

impl InventoryReport {
    pub fn from_records(mut records: Vec<InventoryRecord>) -> Self {
        records.sort_by(report_order);
        Self {
            summary: InventorySummary::from_records(&records),
            records,
        }
    }
}
