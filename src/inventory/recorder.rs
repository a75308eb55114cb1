//! Entry points for the collaborators that observe class loads and
//! enumerate the classpath.

use super::store::InventoryStore;
use crate::config::InventoryConfig;
use crate::manifest::{FileSystemManifests, ManifestSource};
use crate::model::{CanonicalId, InventoryRecord};
use crate::utils::HashSupplier;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Feeds raw observations through the normalizer into one [`InventoryStore`].
///
/// Owns the set of sources that have already been announced, so the first
/// load from a source is logged once and triggers exactly one manifest read.
pub struct InventoryRecorder {
    store: Arc<InventoryStore>,
    announced: Mutex<HashSet<CanonicalId>>,
    manifests: Box<dyn ManifestSource>,
    config: InventoryConfig,
}

impl InventoryRecorder {
    /// Recorder over a fresh store with filesystem manifests.
    pub fn new(config: InventoryConfig) -> Self {
        Self::with_store(Arc::new(InventoryStore::new()), config)
    }

    pub fn with_store(store: Arc<InventoryStore>, config: InventoryConfig) -> Self {
        Self {
            store,
            announced: Mutex::new(HashSet::new()),
            manifests: Box::new(FileSystemManifests),
            config,
        }
    }

    /// Replace the manifest source.
    #[must_use]
    pub fn with_manifest_source(mut self, source: impl ManifestSource + 'static) -> Self {
        self.manifests = Box::new(source);
        self
    }

    pub fn store(&self) -> &Arc<InventoryStore> {
        &self.store
    }

    /// A class was defined from `raw`. `None` is ignored.
    ///
    /// Returns the canonical id the observation was recorded under.
    pub fn class_load_observed(&self, raw: Option<&str>) -> Option<CanonicalId> {
        let raw = raw?;
        let id = CanonicalId::from_raw(raw)?;
        self.store.mark_loaded(&id);

        if self.announce(&id) {
            if self.config.announce_sources {
                tracing::info!("Loaded classes from {}", id);
            }
            if self.config.read_manifests {
                let attributes = self.manifests.read(raw);
                if !attributes.is_empty() {
                    tracing::debug!("Attached {} manifest attributes to {}", attributes.len(), id);
                    self.store.attach_manifest(&id, attributes);
                }
            }
        }
        Some(id)
    }

    /// An archive was found by static enumeration.
    ///
    /// The supplier is dropped unused when hashing is disabled.
    pub fn classpath_declared(
        &self,
        raw: &str,
        size: Option<u64>,
        supplier: Option<HashSupplier>,
    ) -> Option<InventoryRecord> {
        let id = CanonicalId::from_raw(raw)?;
        let supplier = supplier.filter(|_| self.config.compute_hashes);
        Some(self.store.register_declared(&id, size, supplier))
    }

    /// Returns `true` the first time `id` is seen.
    fn announce(&self, id: &CanonicalId) -> bool {
        self.announced
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone())
    }

    /// Number of sources announced so far.
    pub fn announced_count(&self) -> usize {
        self.announced
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for InventoryRecorder {
    fn default() -> Self {
        Self::new(InventoryConfig::default())
    }
}

impl std::fmt::Debug for InventoryRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryRecorder")
            .field("store", &self.store)
            .field("announced", &self.announced_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
