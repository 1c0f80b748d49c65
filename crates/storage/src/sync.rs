//! Change notification between contexts sharing one durable store.
//!
//! Mirrors browser storage events: a write is announced to every other
//! context subscribed to the key, never to the writer itself.

use std::sync::{Arc, Mutex, PoisonError};

/// Identity of one execution context (one "tab").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u64);

impl ContextId {
    /// Writers outside this process, e.g. another browser tab.
    pub const EXTERNAL: ContextId = ContextId(u64::MAX);
}

/// A record was overwritten by `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    pub key: String,
    pub new_value: String,
    pub source: ContextId,
}

pub type ChangeHandler = Box<dyn Fn(&StorageChange) + Send + Sync>;

struct Subscription {
    context: ContextId,
    key: String,
    handler: ChangeHandler,
}

#[derive(Default)]
struct HubInner {
    next_context: u64,
    subscriptions: Vec<Subscription>,
}

/// Cheap-to-clone handle; clones share subscribers.
#[derive(Clone, Default)]
pub struct SyncHub {
    inner: Arc<Mutex<HubInner>>,
}

impl SyncHub {
    pub fn register_context(&self) -> ContextId {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = ContextId(inner.next_context);
        inner.next_context += 1;
        id
    }

    /// Call `handler` for every change to `key` made by a context other than
    /// `context`.
    pub fn subscribe(&self, context: ContextId, key: &str, handler: ChangeHandler) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.subscriptions.push(Subscription {
            context,
            key: key.to_string(),
            handler,
        });
    }

    /// Drops every subscription held by `context`.
    pub fn unsubscribe_all(&self, context: ContextId) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.subscriptions.retain(|s| s.context != context);
    }

    /// Delivers `change` to matching subscribers. Returns how many were called.
    pub fn publish(&self, change: &StorageChange) -> usize {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let mut delivered = 0;
        for sub in &inner.subscriptions {
            if sub.key == change.key && sub.context != change.source {
                (sub.handler)(change);
                delivered += 1;
            }
        }
        delivered
    }
}
