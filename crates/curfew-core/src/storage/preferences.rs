//! Preference repository: rules and home point on top of a key-value store.
//!
//! Reads never fail. Missing keys, storage errors and malformed JSON all read
//! as "nothing configured" and are logged.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, warn};

use super::database::Database;
use crate::error::StorageError;
use crate::notify::{NotificationRule, RuleSet};
use crate::proximity::HomeLocation;

pub const RULES_KEY: &str = "notification_configs";
pub const HOME_LAT_KEY: &str = "home_lat_int";
pub const HOME_LON_KEY: &str = "home_lon_int";

/// Minimal string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.kv_get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.kv_set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.kv_delete(key)
    }
}

/// Volatile store for tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.map.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.map.lock().map_err(|_| StorageError::Poisoned)?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.map.lock().map_err(|_| StorageError::Poisoned)?;
        map.remove(key);
        Ok(())
    }
}

/// What the monitor and the CLI need from persisted preferences.
pub trait PreferenceRepository: Send + Sync {
    /// Current rules; empty when nothing usable is stored.
    fn load_rules(&self) -> RuleSet;

    fn save_rules(&self, rules: &RuleSet) -> Result<(), StorageError>;

    /// Home point, if both coordinates are stored.
    fn load_home(&self) -> Option<HomeLocation>;

    /// Store or clear the home point.
    fn save_home(&self, home: Option<HomeLocation>) -> Result<(), StorageError>;
}

/// [`PreferenceRepository`] over any [`KeyValueStore`].
#[derive(Debug)]
pub struct KvPreferences<S> {
    store: S,
}

impl<S: KeyValueStore> KvPreferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "preference read failed");
                None
            }
        }
    }

    fn read_i32(&self, key: &str) -> Option<i32> {
        let raw = self.read(key)?;
        match raw.trim().parse::<i32>() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, value = %raw, error = %e, "stored coordinate is not an integer");
                None
            }
        }
    }
}

impl<S: KeyValueStore> PreferenceRepository for KvPreferences<S> {
    fn load_rules(&self) -> RuleSet {
        let Some(json) = self.read(RULES_KEY) else {
            debug!("no notification rules stored");
            return RuleSet::new();
        };
        match serde_json::from_str::<Vec<NotificationRule>>(&json) {
            Ok(rules) => {
                let set = RuleSet::from_rules(rules);
                debug!(count = set.len(), "notification rules loaded");
                set
            }
            Err(e) => {
                warn!(error = %e, "stored notification rules are malformed; treating as empty");
                RuleSet::new()
            }
        }
    }

    fn save_rules(&self, rules: &RuleSet) -> Result<(), StorageError> {
        let deduped = RuleSet::from_rules(rules.iter().cloned());
        let json = serde_json::to_string(&deduped)
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        self.store.set(RULES_KEY, &json)
    }

    fn load_home(&self) -> Option<HomeLocation> {
        let lat_e6 = self.read_i32(HOME_LAT_KEY)?;
        let lon_e6 = self.read_i32(HOME_LON_KEY)?;
        Some(HomeLocation { lat_e6, lon_e6 })
    }

    fn save_home(&self, home: Option<HomeLocation>) -> Result<(), StorageError> {
        match home {
            Some(home) => {
                self.store.set(HOME_LAT_KEY, &home.lat_e6.to_string())?;
                self.store.set(HOME_LON_KEY, &home.lon_e6.to_string())
            }
            None => {
                self.store.remove(HOME_LAT_KEY)?;
                self.store.remove(HOME_LON_KEY)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> KvPreferences<MemoryStore> {
        KvPreferences::new(MemoryStore::new())
    }

    #[test]
    fn missing_rules_load_as_empty() {
        assert!(prefs().load_rules().is_empty());
    }

    #[test]
    fn malformed_rules_load_as_empty() {
        let p = prefs();
        p.store().set(RULES_KEY, "{not json").unwrap();
        assert!(p.load_rules().is_empty());
    }

    #[test]
    fn rules_round_trip() {
        let p = prefs();
        let mut rules = RuleSet::new();
        rules.add(60, "an hour").unwrap();
        rules.add(15, "").unwrap();
        rules.set_enabled(15, false).unwrap();
        p.save_rules(&rules).unwrap();
        assert_eq!(p.load_rules(), rules);
    }

    #[test]
    fn reads_rules_written_in_persisted_format() {
        let p = prefs();
        p.store()
            .set(
                RULES_KEY,
                r#"[{"minutesBefore":30,"message":"","enabled":true},{"minutesBefore":30,"message":"dup","enabled":false}]"#,
            )
            .unwrap();
        let rules = p.load_rules();
        assert_eq!(rules.len(), 1);
        assert!(rules.get(30).unwrap().enabled);
    }

    #[test]
    fn home_requires_both_coordinates() {
        let p = prefs();
        p.store().set(HOME_LAT_KEY, "50450000").unwrap();
        assert!(p.load_home().is_none());
        p.store().set(HOME_LON_KEY, "30520000").unwrap();
        let home = p.load_home().unwrap();
        assert_eq!(home.lon_e6, 30_520_000);
    }

    #[test]
    fn clearing_home_removes_both_keys() {
        let p = prefs();
        p.save_home(Some(HomeLocation::from_degrees(1.0, 2.0).unwrap()))
            .unwrap();
        p.save_home(None).unwrap();
        assert!(p.load_home().is_none());
        assert!(p.store().get(HOME_LAT_KEY).unwrap().is_none());
    }
}
