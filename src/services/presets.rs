use std::sync::Arc;

use crate::models::CoachPreset;

use super::store::{load_json, persist_json, KeyValueStore, KEY_CUSTOM_MODELS};

/// Admin-defined coach presets stored under `customModels`.
pub struct PresetService {
    store: Arc<dyn KeyValueStore>,
    presets: Vec<CoachPreset>,
}

impl PresetService {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let presets = load_json(store.as_ref(), KEY_CUSTOM_MODELS).unwrap_or_default();
        Self { store, presets }
    }

    pub fn list(&self) -> &[CoachPreset] {
        &self.presets
    }

    pub fn find(&self, id: &str) -> Option<&CoachPreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn for_genre(&self, genre: &str) -> Vec<&CoachPreset> {
        self.presets.iter().filter(|p| p.applies_to(genre)).collect()
    }

    /// Insert a preset, replacing one with the same id in place.
    pub fn upsert(&mut self, preset: CoachPreset) {
        match self.presets.iter_mut().find(|p| p.id == preset.id) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
        self.persist();
    }

    pub fn remove(&mut self, id: &str) {
        self.presets.retain(|p| p.id != id);
        self.persist();
    }

    fn persist(&self) {
        persist_json(self.store.as_ref(), KEY_CUSTOM_MODELS, &self.presets);
    }
}
