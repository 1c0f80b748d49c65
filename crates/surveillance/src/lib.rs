use bevy::prelude::*;

pub mod aggregation;
pub mod campaign;
pub mod collection;
pub mod config;
pub mod disease;
pub mod error;
pub mod hierarchy;
pub mod projection;
pub mod seed;
pub mod store;
pub mod summary;
pub mod water_quality;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use collection::{Campaigns, Collection, CollectionKey, Regions, WaterQualityReports};
pub use error::MutationError;
pub use store::{Mutation, SurveillanceStore};

// ---------------------------------------------------------------------------
// Resources, events and sets
// ---------------------------------------------------------------------------

/// Seed for default collections. Insert before adding the plugins to
/// override [`config::DEFAULT_SEED`].
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedValue(pub u64);

impl Default for SeedValue {
    fn default() -> Self {
        Self(config::DEFAULT_SEED)
    }
}

/// Queue a mutation to be applied on the next update.
#[derive(Event, Debug, Clone)]
pub struct MutationRequest(pub Mutation);

/// A queued mutation that failed validation and changed nothing.
#[derive(Event, Debug, Clone)]
pub struct MutationRejected {
    pub mutation: Mutation,
    pub error: MutationError,
}

/// A collection was replaced, by a local mutation, a load, or another
/// context. Views depending on it should be recomputed.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionChanged(pub CollectionKey);

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SurveillanceSet {
    /// Queued mutations are applied to the store.
    Mutate,
    /// Store changes are announced as `CollectionChanged`.
    Publish,
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn apply_mutation_requests(
    mut requests: EventReader<MutationRequest>,
    mut store: ResMut<SurveillanceStore>,
    mut rejected: EventWriter<MutationRejected>,
) {
    for MutationRequest(mutation) in requests.read() {
        if let Err(error) = store.apply(mutation.clone()) {
            warn!("Rejected {:?} mutation: {}", mutation.collection(), error);
            rejected.send(MutationRejected {
                mutation: mutation.clone(),
                error,
            });
        }
    }
}

fn publish_collection_changes(
    mut store: ResMut<SurveillanceStore>,
    mut changed: EventWriter<CollectionChanged>,
) {
    let mut keys = store.take_changes();
    if keys.is_empty() {
        return;
    }
    keys.sort();
    keys.dedup();
    for key in keys {
        changed.send(CollectionChanged(key));
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SurveillancePlugin;

impl Plugin for SurveillancePlugin {
    fn build(&self, app: &mut App) {
        let seed = app
            .world()
            .get_resource::<SeedValue>()
            .copied()
            .unwrap_or_default();
        // A store inserted ahead of the plugin (tests, tools) is kept as is.
        if !app.world().contains_resource::<SurveillanceStore>() {
            app.insert_resource(SurveillanceStore::seeded(seed.0));
        }
        app.insert_resource(seed)
            .add_event::<MutationRequest>()
            .add_event::<MutationRejected>()
            .add_event::<CollectionChanged>()
            .configure_sets(
                Update,
                (SurveillanceSet::Mutate, SurveillanceSet::Publish).chain(),
            )
            .add_systems(
                Update,
                (
                    apply_mutation_requests.in_set(SurveillanceSet::Mutate),
                    publish_collection_changes.in_set(SurveillanceSet::Publish),
                ),
            );
    }
}
