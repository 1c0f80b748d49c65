use bevy::prelude::*;
use surveillance::{CollectionKey, SeedValue, SurveillanceSet, SurveillanceStore};

use crate::durable::{DurableStore, StoreContext};
use crate::StorageError;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A collection was written to the durable store by this context.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionPersisted(pub CollectionKey);

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Connects a context's `SurveillanceStore` to a shared `DurableStore`.
///
/// Add after `SurveillancePlugin`. Every app built with a clone of the same
/// `DurableStore` behaves as another tab on the same browser storage.
pub struct StoragePlugin {
    pub durable: DurableStore,
}

impl StoragePlugin {
    pub fn new(durable: DurableStore) -> Self {
        Self { durable }
    }
}

impl Plugin for StoragePlugin {
    fn build(&self, app: &mut App) {
        let context = StoreContext::open(&self.durable);

        #[cfg(target_arch = "wasm32")]
        crate::wasm_local_storage::listen_for_storage_events(context.inbox_handle());

        app.insert_resource(context)
            .add_event::<CollectionPersisted>()
            .add_systems(Startup, load_collections)
            .add_systems(
                Update,
                (
                    apply_remote_changes.before(SurveillanceSet::Mutate),
                    flush_pending_writes
                        .after(SurveillanceSet::Mutate)
                        .before(SurveillanceSet::Publish),
                ),
            );
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Restores every collection from its durable record, falling back to seed
/// data for absent or malformed records.
fn load_collections(
    mut store: ResMut<SurveillanceStore>,
    mut context: ResMut<StoreContext>,
    seed: Res<SeedValue>,
) {
    for key in CollectionKey::ALL {
        match context.read(key) {
            Ok(Some(json)) => {
                store.restore(key, Some(&json), seed.0);
                context.remember(key, &json);
            }
            Ok(None) => {
                info!("Storage: no '{}' record, seeding", key.storage_key());
                store.restore(key, None, seed.0);
            }
            Err(e) => {
                warn!(
                    "Storage: failed to read '{}', keeping seed data: {}",
                    key.storage_key(),
                    e
                );
            }
        }
    }
}

/// Replaces collections announced by other contexts.
///
/// A change to a collection with an unflushed local write is dropped: the
/// local write lands after it and overwrites it in full. The dropped value is
/// remembered as the durable one so that write is never skipped as unchanged.
fn apply_remote_changes(mut store: ResMut<SurveillanceStore>, mut context: ResMut<StoreContext>) {
    for change in context.drain_inbox() {
        let Some(key) = CollectionKey::from_storage_key(&change.key) else {
            continue;
        };
        if store.is_pending_write(key) {
            context.remember(key, &change.new_value);
            debug!(
                "Storage: dropping remote '{}' from {:?}, local write pending",
                change.key, change.source
            );
            continue;
        }
        match store.apply_remote(key, &change.new_value) {
            Ok(()) => {
                context.remember(key, &change.new_value);
                debug!("Storage: applied remote '{}' from {:?}", change.key, change.source);
            }
            Err(e) => {
                let err = StorageError::Decode {
                    key: change.key.clone(),
                    message: e.to_string(),
                };
                warn!("Storage: ignoring remote change from {:?}: {}", change.source, err);
            }
        }
    }
}

/// Writes every collection touched by local mutations, whole.
fn flush_pending_writes(
    mut store: ResMut<SurveillanceStore>,
    mut context: ResMut<StoreContext>,
    mut persisted: EventWriter<CollectionPersisted>,
) {
    for key in store.take_pending_writes() {
        let json = match store.encode(key) {
            Ok(json) => json,
            Err(e) => {
                error!("Storage: failed to encode '{}': {}", key.storage_key(), e);
                continue;
            }
        };
        match context.write(key, &json) {
            Ok(true) => {
                persisted.send(CollectionPersisted(key));
            }
            Ok(false) => {}
            Err(e) => error!("Storage: failed to write '{}': {}", key.storage_key(), e),
        }
    }
}
