#[cfg(not(target_arch = "wasm32"))]
pub mod atomic_write;
pub mod backend;
pub mod durable;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_backend;
mod storage_error;
mod storage_plugin;
pub mod sync;

#[cfg(target_arch = "wasm32")]
mod wasm_local_storage;


pub use backend::{DurableBackend, MemoryBackend};
#[cfg(not(target_arch = "wasm32"))]
pub use file_backend::FileBackend;
pub use durable::{DurableStore, StoreContext};
pub use storage_error::StorageError;
pub use storage_plugin::{CollectionPersisted, StoragePlugin};
pub use sync::{ContextId, StorageChange, SyncHub};
