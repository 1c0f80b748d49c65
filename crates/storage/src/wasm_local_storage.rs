//! `window.localStorage` backend for browser builds.
//!
//! Other tabs' writes arrive as DOM `storage` events, which the browser only
//! fires in tabs other than the writer. They are relayed into the context's
//! inbox and applied like any other remote change.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Storage, StorageEvent, Window};

use crate::backend::DurableBackend;
use crate::durable::Inbox;
use crate::sync::{ContextId, StorageChange};
use crate::StorageError;

fn window() -> Result<Window, StorageError> {
    web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_string()))
}

fn local_storage() -> Result<Storage, StorageError> {
    window()?
        .local_storage()
        .map_err(|e| StorageError::Unavailable(format!("localStorage error: {e:?}")))?
        .ok_or_else(|| StorageError::Unavailable("localStorage not available".to_string()))
}

fn is_quota_exceeded_error(err: &JsValue) -> bool {
    if let Ok(dom_exception) = err.clone().dyn_into::<web_sys::DomException>() {
        return dom_exception.name() == "QuotaExceededError";
    }
    format!("{err:?}").contains("QuotaExceededError")
}

/// Stateless: the storage handle is looked up per call.
#[derive(Default)]
pub struct LocalStorageBackend;

impl DurableBackend for LocalStorageBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        local_storage()?
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(format!("getItem failed: {e:?}")))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        local_storage()?.set_item(key, value).map_err(|e| {
            if is_quota_exceeded_error(&e) {
                StorageError::QuotaExceeded
            } else {
                StorageError::Unavailable(format!("setItem failed: {e:?}"))
            }
        })
    }
}

/// Relays `storage` events from other tabs into `inbox` for the lifetime of
/// the page.
pub fn listen_for_storage_events(inbox: Inbox) {
    let Ok(window) = window() else {
        return;
    };
    let on_storage = Closure::<dyn FnMut(StorageEvent)>::new(move |event: StorageEvent| {
        let (Some(key), Some(new_value)) = (event.key(), event.new_value()) else {
            return;
        };
        if let Ok(mut inbox) = inbox.lock() {
            inbox.push_back(StorageChange {
                key,
                new_value,
                source: ContextId::EXTERNAL,
            });
        }
    });
    if window
        .add_event_listener_with_callback("storage", on_storage.as_ref().unchecked_ref())
        .is_ok()
    {
        on_storage.forget();
    }
}
