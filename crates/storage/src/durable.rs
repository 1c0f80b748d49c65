//! The shared durable store and each context's handle on it.

use std::collections::{HashMap, VecDeque};
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use bevy::prelude::*;
use surveillance::CollectionKey;
use xxhash_rust::xxh32::xxh32;

use crate::backend::{DurableBackend, MemoryBackend};
use crate::sync::{ContextId, StorageChange, SyncHub};
use crate::StorageError;

const CHECKSUM_SEED: u32 = 0;

pub fn checksum(value: &str) -> u32 {
    xxh32(value.as_bytes(), CHECKSUM_SEED)
}

// ---------------------------------------------------------------------------
// DurableStore
// ---------------------------------------------------------------------------

/// A backend plus the hub announcing writes to it. Every context opened on
/// clones of one `DurableStore` sees the same records and each other's
/// writes.
#[derive(Clone)]
pub struct DurableStore {
    backend: Arc<dyn DurableBackend>,
    hub: SyncHub,
}

impl DurableStore {
    pub fn new(backend: impl DurableBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
            hub: SyncHub::default(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::default())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_dir(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        Ok(Self::new(crate::file_backend::FileBackend::open(dir)?))
    }

    #[cfg(target_arch = "wasm32")]
    pub fn local_storage() -> Self {
        Self::new(crate::wasm_local_storage::LocalStorageBackend)
    }

    pub fn hub(&self) -> &SyncHub {
        &self.hub
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.backend.read(key)
    }

    /// Overwrites `key` and notifies every other subscribed context.
    pub fn set_item(&self, source: ContextId, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend.write(key, value)?;
        let delivered = self.hub.publish(&StorageChange {
            key: key.to_string(),
            new_value: value.to_string(),
            source,
        });
        debug!("Storage: '{}' written by {:?}, {} context(s) notified", key, source, delivered);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// StoreContext
// ---------------------------------------------------------------------------

pub type Inbox = Arc<Mutex<VecDeque<StorageChange>>>;

/// One context's connection: its id, the changes other contexts have
/// announced to it, and checksums of the last value it wrote or saw per
/// collection.
#[derive(Resource)]
pub struct StoreContext {
    id: ContextId,
    durable: DurableStore,
    inbox: Inbox,
    checksums: HashMap<CollectionKey, u32>,
}

impl StoreContext {
    /// Registers a new context and subscribes it to every collection key.
    pub fn open(durable: &DurableStore) -> Self {
        let id = durable.hub().register_context();
        let inbox: Inbox = Arc::default();
        for key in CollectionKey::ALL {
            let inbox = Arc::clone(&inbox);
            durable.hub().subscribe(
                id,
                key.storage_key(),
                Box::new(move |change| {
                    inbox
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push_back(change.clone());
                }),
            );
        }
        Self {
            id,
            durable: durable.clone(),
            inbox,
            checksums: HashMap::new(),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn durable(&self) -> &DurableStore {
        &self.durable
    }

    /// Shared handle on the inbox, for listeners relaying writers the hub
    /// does not see, such as other browser tabs.
    pub fn inbox_handle(&self) -> Inbox {
        Arc::clone(&self.inbox)
    }

    pub fn read(&self, key: CollectionKey) -> Result<Option<String>, StorageError> {
        self.durable.get_item(key.storage_key())
    }

    /// Writes `json` unless it matches the last value written or seen for
    /// `key`. Returns whether a write happened.
    pub fn write(&mut self, key: CollectionKey, json: &str) -> Result<bool, StorageError> {
        let sum = checksum(json);
        if self.checksums.get(&key) == Some(&sum) {
            return Ok(false);
        }
        self.durable.set_item(self.id, key.storage_key(), json)?;
        self.checksums.insert(key, sum);
        Ok(true)
    }

    /// Records `json` as the current durable value of `key`.
    pub fn remember(&mut self, key: CollectionKey, json: &str) {
        self.checksums.insert(key, checksum(json));
    }

    pub fn drain_inbox(&mut self) -> Vec<StorageChange> {
        self.inbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }
}

impl Drop for StoreContext {
    fn drop(&mut self) {
        self.durable.hub().unsubscribe_all(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_deterministic() {
        assert_eq!(checksum("[]"), checksum("[]"));
        assert_ne!(checksum("[]"), checksum("[1]"));
    }

    #[test]
    fn test_write_notifies_other_contexts_only() {
        let durable = DurableStore::in_memory();
        let mut a = StoreContext::open(&durable);
        let mut b = StoreContext::open(&durable);

        assert!(a.write(CollectionKey::Campaigns, "[]").unwrap());
        assert!(a.drain_inbox().is_empty());
        let seen = b.drain_inbox();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].key, "campaigns");
        assert_eq!(seen[0].source, a.id());
        assert_eq!(b.read(CollectionKey::Campaigns).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_unchanged_write_is_skipped() {
        let durable = DurableStore::in_memory();
        let mut a = StoreContext::open(&durable);
        let mut b = StoreContext::open(&durable);

        assert!(a.write(CollectionKey::RegionTree, "[1]").unwrap());
        assert!(!a.write(CollectionKey::RegionTree, "[1]").unwrap());
        assert_eq!(b.drain_inbox().len(), 1);

        a.remember(CollectionKey::WaterQuality, "[]");
        assert!(!a.write(CollectionKey::WaterQuality, "[]").unwrap());
        assert!(durable.get_item("water_quality_reports").unwrap().is_none());
    }

    #[test]
    fn test_dropped_context_stops_receiving() {
        let durable = DurableStore::in_memory();
        let mut a = StoreContext::open(&durable);
        let b = StoreContext::open(&durable);
        drop(b);
        a.write(CollectionKey::Campaigns, "[]").unwrap();
        assert_eq!(
            durable.hub().publish(&StorageChange {
                key: "campaigns".to_string(),
                new_value: "[]".to_string(),
                source: a.id(),
            }),
            0
        );
    }
}
