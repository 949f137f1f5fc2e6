use std::sync::Arc;

use super::store::{KeyValueStore, StoreError, KEY_API_KEY, KEY_HAS_STARTED, KEY_MODE, KEY_THEME};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    System,
    Light,
    Dark,
}

impl ColorScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::System => "system",
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "system" => Some(ColorScheme::System),
            "light" => Some(ColorScheme::Light),
            "dark" => Some(ColorScheme::Dark),
            _ => None,
        }
    }
}

/// Whether the coach-preset editor is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Writer,
    Admin,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Writer => "writer",
            DisplayMode::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "writer" => Some(DisplayMode::Writer),
            "admin" => Some(DisplayMode::Admin),
            _ => None,
        }
    }
}

/// Credential, first-run flag and display preferences. Each value is a
/// plain string under its own key.
pub struct SettingsService {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn api_key(&self) -> Option<String> {
        self.store
            .get(KEY_API_KEY)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    /// Save a trimmed credential. Returns `Ok(false)` for a blank key.
    pub fn set_api_key(&self, key: &str) -> Result<bool, StoreError> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(false);
        }
        self.store.set(KEY_API_KEY, key)?;
        Ok(true)
    }

    pub fn clear_api_key(&self) -> Result<(), StoreError> {
        self.store.remove(KEY_API_KEY)
    }

    pub fn has_started(&self) -> bool {
        self.store.get(KEY_HAS_STARTED).as_deref() == Some("true")
    }

    pub fn mark_started(&self) -> Result<(), StoreError> {
        self.store.set(KEY_HAS_STARTED, "true")
    }

    pub fn theme(&self) -> ColorScheme {
        self.store
            .get(KEY_THEME)
            .and_then(|v| ColorScheme::from_str(&v))
            .unwrap_or_default()
    }

    pub fn set_theme(&self, theme: ColorScheme) -> Result<(), StoreError> {
        self.store.set(KEY_THEME, theme.as_str())
    }

    pub fn mode(&self) -> DisplayMode {
        self.store
            .get(KEY_MODE)
            .and_then(|v| DisplayMode::from_str(&v))
            .unwrap_or_default()
    }

    pub fn set_mode(&self, mode: DisplayMode) -> Result<(), StoreError> {
        self.store.set(KEY_MODE, mode.as_str())
    }
}
