//! TOML-based application configuration.
//!
//! Stores:
//! - The curfew window (`HH:MM` start and end)
//! - Monitor loop timing
//! - Location sampling and the home radius
//! - Notification titles and whether posting is permitted
//! - The news feed URL and keyword filter
//! - The supervisor restart policy
//!
//! Configuration is stored at `<data dir>/config.toml`.

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::curfew::CurfewWindow;
use crate::error::ConfigError;
use crate::notify::{DEFAULT_REMINDER_TITLE, DEFAULT_STATUS_TITLE};

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_NEWS_URL: &str = "https://www.objectiv.tv/uk/rss/";

/// Curfew window in local time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurfewConfig {
    #[serde(default = "default_start")]
    pub start: String,
    #[serde(default = "default_end")]
    pub end: String,
}

/// Polling loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// How often persisted rules are re-read while running.
    #[serde(default = "default_rules_refresh_secs")]
    pub rules_refresh_secs: u64,
}

/// Location sampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_location_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_min_displacement_m")]
    pub min_displacement_m: f64,
    #[serde(default = "default_home_radius_m")]
    pub home_radius_m: f64,
    /// JSON file holding the latest fix, written by a GPS bridge.
    #[serde(default)]
    pub fix_file: Option<String>,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Whether the host allows posting notifications.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_reminder_title")]
    pub reminder_title: String,
    #[serde(default = "default_status_title")]
    pub status_title: String,
}

/// News feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_news_url")]
    pub url: String,
    /// Case-insensitive title filter. Empty keeps every item.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_news_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartMode {
    Never,
    OnFailure,
    Always,
}

/// Restart behaviour of the background monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    #[serde(default = "default_restart")]
    pub restart: RestartMode,
    #[serde(default = "default_max_restarts")]
    pub max_restarts: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub curfew: CurfewConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub supervisor: SupervisorConfig,
}

// Default functions
fn default_start() -> String {
    "23:00".into()
}
fn default_end() -> String {
    "05:00".into()
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_rules_refresh_secs() -> u64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_location_interval_secs() -> u64 {
    5
}
fn default_min_displacement_m() -> f64 {
    10.0
}
fn default_home_radius_m() -> f64 {
    50.0
}
fn default_reminder_title() -> String {
    DEFAULT_REMINDER_TITLE.into()
}
fn default_status_title() -> String {
    DEFAULT_STATUS_TITLE.into()
}
fn default_news_url() -> String {
    DEFAULT_NEWS_URL.into()
}
fn default_news_timeout_secs() -> u64 {
    15
}
fn default_restart() -> RestartMode {
    RestartMode::OnFailure
}
fn default_max_restarts() -> u32 {
    5
}
fn default_backoff_ms() -> u64 {
    2000
}

impl Default for CurfewConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            rules_refresh_secs: default_rules_refresh_secs(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_location_interval_secs(),
            min_displacement_m: default_min_displacement_m(),
            home_radius_m: default_home_radius_m(),
            fix_file: None,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reminder_title: default_reminder_title(),
            status_title: default_status_title(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            url: default_news_url(),
            keywords: Vec::new(),
            timeout_secs: default_news_timeout_secs(),
        }
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            restart: default_restart(),
            max_restarts: default_max_restarts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn parse_time(key: &str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{value}' is not HH:MM ({e})"),
        })
}

impl CurfewConfig {
    /// Parse into a [`CurfewWindow`].
    pub fn window(&self) -> Result<CurfewWindow, ConfigError> {
        let start = parse_time("curfew.start", &self.start)?;
        let end = parse_time("curfew.end", &self.end)?;
        CurfewWindow::new(start, end).map_err(|e| ConfigError::InvalidValue {
            key: "curfew".into(),
            message: e.to_string(),
        })
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// `<data dir>/config.toml`
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join(CONFIG_FILE))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// The updated configuration is validated before it replaces `self`.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Reject values the monitor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.curfew.window()?;
        if self.monitor.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "monitor.poll_interval_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.location.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "location.interval_secs".into(),
                message: "must be greater than zero".into(),
            });
        }
        if !(self.location.home_radius_m > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "location.home_radius_m".into(),
                message: "must be a positive number of meters".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.curfew.start, "23:00");
        assert_eq!(parsed.location.home_radius_m, 50.0);
        assert_eq!(parsed.supervisor.restart, RestartMode::OnFailure);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[curfew]\nstart = \"22:00\"\n").unwrap();
        assert_eq!(parsed.curfew.start, "22:00");
        assert_eq!(parsed.curfew.end, "05:00");
        assert_eq!(parsed.monitor.poll_interval_ms, 1000);
    }

    #[test]
    fn default_window_parses() {
        let window = Config::default().curfew.window().unwrap();
        assert_eq!(window, CurfewWindow::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("curfew.start").as_deref(), Some("23:00"));
        assert_eq!(cfg.get("monitor.poll_interval_ms").as_deref(), Some("1000"));
        assert_eq!(cfg.get("supervisor.restart").as_deref(), Some("on_failure"));
        assert!(cfg.get("curfew.missing_key").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("curfew.start", "22:30").unwrap();
        cfg.apply("location.home_radius_m", "75.5").unwrap();
        cfg.apply("notifications.enabled", "false").unwrap();
        cfg.apply("news.keywords", r#"["curfew"]"#).unwrap();
        cfg.apply("location.fix_file", "/tmp/fix.json").unwrap();
        assert_eq!(cfg.curfew.start, "22:30");
        assert_eq!(cfg.location.home_radius_m, 75.5);
        assert!(!cfg.notifications.enabled);
        assert_eq!(cfg.news.keywords, vec!["curfew".to_string()]);
        assert_eq!(cfg.location.fix_file.as_deref(), Some("/tmp/fix.json"));
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("curfew.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn apply_rejects_invalid_time_and_leaves_config_untouched() {
        let mut cfg = Config::default();
        assert!(cfg.apply("curfew.start", "25:99").is_err());
        assert!(cfg.apply("curfew.end", "23:00").is_err());
        assert_eq!(cfg.curfew.start, "23:00");
        assert_eq!(cfg.curfew.end, "05:00");
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("location.enabled", "not_a_bool").is_err());
        assert!(cfg.apply("supervisor.restart", "sometimes").is_err());
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.curfew.end, "05:00");
        assert!(path.exists());
    }

    #[test]
    fn load_from_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "curfew = 12").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
