mod config;
pub mod database;
pub mod preferences;

pub use config::{
    Config, CurfewConfig, LocationConfig, MonitorConfig, NewsConfig, NotificationsConfig,
    RestartMode, SupervisorConfig, CONFIG_FILE, DEFAULT_NEWS_URL,
};
pub use database::Database;
pub use preferences::{KeyValueStore, KvPreferences, MemoryStore, PreferenceRepository};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Resolve the data directory and make sure it exists.
///
/// `CURFEW_DATA_DIR` wins when set. Otherwise `~/.config/curfew-notifier/`,
/// or `~/.config/curfew-notifier-dev/` when `CURFEW_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("CURFEW_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("CURFEW_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("curfew-notifier-dev")
            } else {
                base_dir.join("curfew-notifier")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
