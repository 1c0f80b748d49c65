//! Durable key/value backends.
//!
//! A backend stores one string per key and knows nothing about the
//! collections inside. Reads of a missing key return `Ok(None)`.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::StorageError;

pub trait DurableBackend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local backend. Shared between contexts through a `DurableStore`,
/// it behaves like one browser profile's storage.
#[derive(Default)]
pub struct MemoryBackend {
    records: Mutex<HashMap<String, String>>,
}

impl DurableBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
