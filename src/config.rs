use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use url::Url;

pub const APP_NAME: &str = "muse";

pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const API_KEY_LINK: &str = "https://openrouter.ai/keys";
pub const MAX_TOKENS: u32 = 512;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const DB_FILE_NAME: &str = "muse.db";

/// Process-level settings resolved from the environment. User preferences
/// live in the key-value store instead.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub api_base: Url,
    pub request_timeout: Duration,
    /// Used when no credential has been saved yet.
    pub fallback_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve the configuration from any variable source. Unset and set
    /// variables behave as in the process environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = match var("MUSE_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir(&var)?,
        };

        let api_base = var("MUSE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into());
        let api_base = Url::parse(&api_base)
            .with_context(|| format!("Invalid MUSE_API_BASE: {}", api_base))?;

        let request_timeout = match var("MUSE_TIMEOUT_SECS") {
            Some(secs) => {
                let parsed: u64 = secs
                    .parse()
                    .with_context(|| format!("Invalid MUSE_TIMEOUT_SECS: {}", secs))?;
                if parsed == 0 {
                    bail!("Invalid MUSE_TIMEOUT_SECS: must be at least 1 second");
                }
                Duration::from_secs(parsed)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let fallback_api_key = var("OPENROUTER_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Ok(Self {
            data_dir,
            api_base,
            request_timeout,
            fallback_api_key,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}

fn default_data_dir(var: impl Fn(&str) -> Option<String>) -> Result<PathBuf> {
    let base = match var("XDG_DATA_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let home = var("HOME").context("Neither XDG_DATA_HOME nor HOME is set")?;
            PathBuf::from(home).join(".local/share")
        }
    };
    Ok(base.join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn resolve(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_with_only_home() {
        let config = resolve(&[("HOME", "/home/ann")]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/home/ann/.local/share/muse"));
        assert_eq!(config.db_path(), PathBuf::from("/home/ann/.local/share/muse/muse.db"));
        assert_eq!(config.api_base.as_str(), "https://openrouter.ai/api/v1");
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.fallback_api_key, None);
    }

    #[test]
    fn data_dir_precedence() {
        let config = resolve(&[("HOME", "/home/ann"), ("XDG_DATA_HOME", "/xdg")]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/xdg/muse"));

        let config = resolve(&[("XDG_DATA_HOME", "/xdg"), ("MUSE_DATA_DIR", "/srv/muse")]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/muse"));

        assert!(resolve(&[]).is_err());
    }

    #[test]
    fn timeout_must_be_a_positive_number() {
        let config = resolve(&[("HOME", "/h"), ("MUSE_TIMEOUT_SECS", "5")]).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(5));

        assert!(resolve(&[("HOME", "/h"), ("MUSE_TIMEOUT_SECS", "0")]).is_err());
        assert!(resolve(&[("HOME", "/h"), ("MUSE_TIMEOUT_SECS", "soon")]).is_err());
        assert!(resolve(&[("HOME", "/h"), ("MUSE_TIMEOUT_SECS", "-3")]).is_err());
    }

    #[test]
    fn api_base_must_be_a_url() {
        let err = resolve(&[("HOME", "/h"), ("MUSE_API_BASE", "not a url")]).unwrap_err();
        assert!(err.to_string().contains("MUSE_API_BASE"));

        let config = resolve(&[("HOME", "/h"), ("MUSE_API_BASE", "http://localhost:8080/v1")]).unwrap();
        assert_eq!(config.api_base.as_str(), "http://localhost:8080/v1");
    }

    #[test]
    fn blank_fallback_key_is_ignored() {
        let config = resolve(&[("HOME", "/h"), ("OPENROUTER_API_KEY", "   ")]).unwrap();
        assert_eq!(config.fallback_api_key, None);

        let config = resolve(&[("HOME", "/h"), ("OPENROUTER_API_KEY", " sk-or-1 \n")]).unwrap();
        assert_eq!(config.fallback_api_key.as_deref(), Some("sk-or-1"));
    }
}
