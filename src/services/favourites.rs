use std::sync::Arc;

use super::store::{load_json, persist_json, KeyValueStore, KEY_FAVOURITES};

/// Saved prompts, newest first, without duplicates.
pub struct FavouritesRegistry {
    store: Arc<dyn KeyValueStore>,
    prompts: Vec<String>,
}

impl FavouritesRegistry {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let prompts: Vec<String> = load_json(store.as_ref(), KEY_FAVOURITES).unwrap_or_default();
        Self { store, prompts }
    }

    pub fn list(&self) -> &[String] {
        &self.prompts
    }

    pub fn contains(&self, prompt: &str) -> bool {
        self.prompts.iter().any(|p| p == prompt)
    }

    /// Prepend a prompt. Blank prompts and exact duplicates are ignored;
    /// the stored text is the prompt as given, untrimmed.
    pub fn add(&mut self, prompt: &str) -> bool {
        if prompt.trim().is_empty() || self.contains(prompt) {
            return false;
        }
        self.prompts.insert(0, prompt.to_string());
        self.persist();
        true
    }

    pub fn remove(&mut self, prompt: &str) {
        self.prompts.retain(|p| p != prompt);
        self.persist();
    }

    fn persist(&self) {
        persist_json(self.store.as_ref(), KEY_FAVOURITES, &self.prompts);
    }
}
