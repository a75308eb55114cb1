//! Process snapshots: one process's inventory plus its identity.

use crate::error::{InventoryError, Result, SnapshotErrorKind};
use crate::identity::{ApplicationIdentity, RuntimeInfo};
use crate::inventory::InventoryStore;
use crate::model::InventoryRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The unit exchanged between a monitored process and the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub identity: ApplicationIdentity,
    pub captured_at: DateTime<Utc>,
    #[serde(default)]
    pub records: Vec<InventoryRecord>,
}

impl ProcessSnapshot {
    pub fn new(identity: ApplicationIdentity, records: Vec<InventoryRecord>) -> Self {
        Self {
            identity,
            captured_at: Utc::now(),
            records,
        }
    }

    /// Snapshot `store` and compute the identity from its top-level archives.
    pub fn capture(store: &InventoryStore, runtime: &RuntimeInfo) -> Self {
        let records = store.snapshot();
        let identity = ApplicationIdentity::compute(runtime, &records);
        Self::new(identity, records)
    }

    pub fn app_id(&self) -> &str {
        &self.identity.id
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a snapshot, skipping records that do not decode.
    ///
    /// The identity is required; a malformed record only loses that record.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(mut fields) = value else {
            return Err(InventoryError::snapshot(
                "decoding snapshot",
                SnapshotErrorKind::InvalidJson("expected an object".to_string()),
            ));
        };

        let identity = fields
            .remove("identity")
            .ok_or_else(|| InventoryError::missing_field("identity", "snapshot"))?;
        let identity: ApplicationIdentity = serde_json::from_value(identity).map_err(|e| {
            InventoryError::snapshot(
                "decoding snapshot identity",
                SnapshotErrorKind::InvalidValue {
                    field: "identity".to_string(),
                    message: e.to_string(),
                },
            )
        })?;

        let captured_at = match fields.remove("captured_at") {
            Some(value) => serde_json::from_value(value).map_err(|e| {
                InventoryError::snapshot(
                    "decoding snapshot timestamp",
                    SnapshotErrorKind::InvalidValue {
                        field: "captured_at".to_string(),
                        message: e.to_string(),
                    },
                )
            })?,
            None => Utc::now(),
        };

        let entries = match fields.remove("records") {
            Some(Value::Array(entries)) => entries,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(InventoryError::snapshot(
                    "decoding snapshot records",
                    SnapshotErrorKind::InvalidValue {
                        field: "records".to_string(),
                        message: "expected an array".to_string(),
                    },
                ))
            }
        };

        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<InventoryRecord>(entry) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(
                    "Skipping malformed record #{} in snapshot {}: {}",
                    index,
                    identity.id,
                    e
                ),
            }
        }

        Ok(Self {
            identity,
            captured_at,
            records,
        })
    }
}
