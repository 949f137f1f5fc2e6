use std::collections::HashMap;
use std::sync::RwLock;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub const KEY_API_KEY: &str = "creativeWritingApiKey";
pub const KEY_FAVOURITES: &str = "favouritePrompts";
pub const KEY_SESSIONS: &str = "sessionHistory";
pub const KEY_FOLDERS: &str = "sessionFolders";
pub const KEY_HAS_STARTED: &str = "cwaHasStarted";
pub const KEY_THEME: &str = "cwaTheme";
pub const KEY_MODE: &str = "cwaMode";
pub const KEY_CUSTOM_MODELS: &str = "customModels";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// String-keyed, string-valued durable storage.
///
/// A missing key is `None`, never an error.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and decode a JSON value. Absent keys and values that fail to parse
/// both come back as `None`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Discarding malformed value under {}: {}", key, e);
            None
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// Write a value and log on failure; in-memory state stays authoritative.
pub(crate) fn persist_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    if let Err(e) = save_json(store, key, value) {
        tracing::error!("Failed to persist {}: {}", key, e);
    }
}

/// Volatile store used by tests and as a fallback when no database can be
/// opened.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().ok()?;
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope"), None);
        assert!(store.remove("nope").is_ok());
    }

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn malformed_json_loads_as_none() {
        let store = MemoryStore::new();
        store.set(KEY_FAVOURITES, "{not json").unwrap();
        assert_eq!(load_json::<Vec<String>>(&store, KEY_FAVOURITES), None);

        store.set(KEY_FAVOURITES, r#"{"an":"object"}"#).unwrap();
        assert_eq!(load_json::<Vec<String>>(&store, KEY_FAVOURITES), None);
    }

    #[test]
    fn json_round_trip() {
        let store = MemoryStore::new();
        save_json(&store, "list", &vec!["a", "b"]).unwrap();
        assert_eq!(store.get("list").as_deref(), Some(r#"["a","b"]"#));
        assert_eq!(
            load_json::<Vec<String>>(&store, "list"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }
}
