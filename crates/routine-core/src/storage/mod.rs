mod config;
pub mod database;

pub use config::{CoachConfig, Config, HydrationConfig, MoodConfig};
pub use database::{Database, DocumentStore};

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConfigError, Result};

/// Keys of the persisted documents. Each key is owned by exactly one component.
pub mod keys {
    pub const EVENTS: &str = "events";
    pub const COMPLETION_LOG: &str = "completion_log";
    pub const MOOD_LOG: &str = "mood_log";
    pub const ENABLED_PLUGINS: &str = "enabled_plugins";
    pub const PLUGIN_DEFAULTS_APPLIED: &str = "plugin_defaults_applied";
    pub const COACH_CHAT: &str = "coach_chat";
    pub const COACH_INTENSITY: &str = "coach_intensity";
    pub const COACH_API_KEY: &str = "coach_api_key";
    pub const HYDRATION: &str = "plugin.hydration";
}

/// Returns `~/.config/routine-os[-dev]/` based on ROUTINE_ENV.
///
/// Set ROUTINE_ENV=dev to use the development data directory, or
/// ROUTINE_HOME to point at an explicit directory (used by the CLI tests).
///
/// # Errors
/// Returns an error if creating the data directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("ROUTINE_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("ROUTINE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("routine-os-dev")
            } else {
                base_dir.join("routine-os")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Read a JSON document, falling back to `T::default()` when the key is absent.
pub fn load_document<T>(store: &dyn DocumentStore, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match store.get(key)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(T::default()),
    }
}

/// Serialize and write a JSON document under `key`.
pub fn save_document<T>(store: &dyn DocumentStore, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)?;
    Ok(())
}
