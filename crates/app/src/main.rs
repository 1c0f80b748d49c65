use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use storage::{DurableStore, StoragePlugin};
use surveillance::{SeedValue, SurveillancePlugin};

mod digest;

/// Store directory when `JALWATCH_DATA_DIR` is unset.
#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_DATA_DIR: &str = "jalwatch-data";

fn seed_from_env() -> SeedValue {
    match std::env::var("JALWATCH_SEED") {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(seed) => SeedValue(seed),
            Err(e) => {
                warn!("JALWATCH_SEED '{}' is not a number ({}), using default", raw, e);
                SeedValue::default()
            }
        },
        Err(_) => SeedValue::default(),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn open_durable() -> Option<DurableStore> {
    let dir = std::env::var("JALWATCH_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    match DurableStore::open_dir(&dir) {
        Ok(durable) => {
            info!("Store: using '{}'", dir);
            Some(durable)
        }
        Err(e) => {
            error!("Store: cannot open '{}': {}", dir, e);
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn open_durable() -> Option<DurableStore> {
    Some(DurableStore::local_storage())
}

fn main() {
    let mut app = App::new();

    // Native runs load, log the digest and exit. In the browser the loop
    // keeps running so other tabs' writes are picked up.
    #[cfg(not(target_arch = "wasm32"))]
    let runner = ScheduleRunnerPlugin::run_once();
    #[cfg(target_arch = "wasm32")]
    let runner = ScheduleRunnerPlugin::run_loop(std::time::Duration::from_millis(250));

    app.add_plugins((MinimalPlugins.set(runner), LogPlugin::default()));

    let Some(durable) = open_durable() else {
        return;
    };

    app.insert_resource(seed_from_env())
        .add_plugins((
            SurveillancePlugin,
            StoragePlugin::new(durable),
            digest::DigestPlugin,
        ));

    app.run();
}
