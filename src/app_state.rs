use crate::configuration::Settings;
use crate::db::{PreferenceStore, SnapshotCache};
use std::sync::Arc;

/// Handles shared by the command surfaces and the alert scheduler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub preferences: Arc<PreferenceStore>,
    pub snapshot: Arc<SnapshotCache>,
}

impl AppState {
    pub fn new(preferences: PreferenceStore, snapshot: SnapshotCache) -> Self {
        Self {
            preferences: Arc::new(preferences),
            snapshot: Arc::new(snapshot),
        }
    }

    pub fn load(settings: &Settings) -> Self {
        Self::new(
            PreferenceStore::load(&settings.storage.preferences_path),
            SnapshotCache::load(
                &settings.storage.snapshot_path,
                settings.catalog.max_products,
            ),
        )
    }
}
