//! # TestDashboard: headless harness for surveillance integration tests
//!
//! Wraps `bevy::app::App` + `SurveillancePlugin` so tests can queue
//! mutations as events, run updates and inspect the store and emitted
//! events without any rendering.

use bevy::app::App;
use bevy::ecs::event::Events;
use bevy::prelude::*;
use chrono::NaiveDate;

use crate::disease::{AgeGroups, DiseaseReport, SourceType};
use crate::store::Clock;
use crate::{
    CollectionChanged, CollectionKey, Mutation, MutationRejected, MutationRequest, SeedValue,
    SurveillancePlugin, SurveillanceStore,
};

fn harness_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 1).unwrap_or_default()
}

pub struct TestDashboard {
    app: App,
}

impl Default for TestDashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDashboard {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Dashboard over the default seed, with a fixed clock.
    pub fn new() -> Self {
        Self::with_seed(crate::config::DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_store(SurveillanceStore::seeded(seed), seed)
    }

    /// Dashboard over a prepared store. The store's clock is replaced by the
    /// harness clock.
    pub fn with_store(store: SurveillanceStore, seed: u64) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(SeedValue(seed));
        app.insert_resource(store.with_clock(harness_today));
        app.add_plugins(SurveillancePlugin);
        app.update();
        Self { app }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.store_mut().set_clock(clock);
        self
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    pub fn update(&mut self) {
        self.app.update();
    }

    /// Queue `mutation` as a `MutationRequest` and run one update.
    pub fn request(&mut self, mutation: Mutation) {
        self.app.world_mut().send_event(MutationRequest(mutation));
        self.app.update();
    }

    /// Queue an `AddDiseaseReport` built from the given counts.
    pub fn file_report(
        &mut self,
        region_id: &str,
        district_id: Option<&str>,
        disease_id: &str,
        cases: u32,
        ages: AgeGroups,
        sub_division: Option<(&str, Option<&str>)>,
    ) {
        let mut report = DiseaseReport::new(
            crate::store::mint_id(),
            SourceType::Asha,
            "2024-09-01T09:30",
            cases,
            ages,
        );
        if let Some((sd, block)) = sub_division {
            report = report.at(sd, block);
        }
        self.request(Mutation::AddDiseaseReport {
            region_id: region_id.to_string(),
            district_id: district_id.map(str::to_string),
            disease_id: disease_id.to_string(),
            report,
        });
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn store(&self) -> &SurveillanceStore {
        self.app.world().resource::<SurveillanceStore>()
    }

    pub fn store_mut(&mut self) -> Mut<'_, SurveillanceStore> {
        self.app.world_mut().resource_mut::<SurveillanceStore>()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    /// `MutationRejected` events still buffered.
    pub fn rejections(&self) -> Vec<MutationRejected> {
        let events = self.app.world().resource::<Events<MutationRejected>>();
        events.iter_current_update_events().cloned().collect()
    }

    /// Keys of `CollectionChanged` events still buffered.
    pub fn changed_collections(&self) -> Vec<CollectionKey> {
        let events = self.app.world().resource::<Events<CollectionChanged>>();
        events.iter_current_update_events().map(|e| e.0).collect()
    }
}
