//! Integration tests for on-disk preferences and configuration.

use curfew_core::storage::preferences::{KeyValueStore, RULES_KEY};
use curfew_core::{Config, ConfigError, Database, HomeLocation, KvPreferences, PreferenceRepository, RuleSet};

#[test]
fn test_preferences_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("curfew.db");

    {
        let prefs = KvPreferences::new(Database::open_at(&path).unwrap());
        let mut rules = RuleSet::new();
        rules.add(60, "").unwrap();
        rules.add(15, "Fifteen minutes, head home").unwrap();
        prefs.save_rules(&rules).unwrap();
        prefs
            .save_home(Some(HomeLocation::from_degrees(50.450001, 30.523333).unwrap()))
            .unwrap();
    }

    let prefs = KvPreferences::new(Database::open_at(&path).unwrap());
    let rules = prefs.load_rules();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules.get(15).unwrap().body(), "Fifteen minutes, head home");
    let home = prefs.load_home().unwrap();
    assert_eq!(home.lat_e6, 50_450_001);
    assert_eq!(home.lon_e6, 30_523_333);
}

#[test]
fn test_corrupt_rules_on_disk_read_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_at(&dir.path().join("curfew.db")).unwrap();
    db.set(RULES_KEY, "[{\"minutesBefore\": \"soon\"}]").unwrap();

    let prefs = KvPreferences::new(db);
    assert!(prefs.load_rules().is_empty());
}

#[test]
fn test_config_changes_round_trip_through_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::load_from(&path).unwrap();
    config.apply("curfew.start", "22:30").unwrap();
    config.apply("news.keywords", r#"["curfew","metro"]"#).unwrap();
    config.save_to(&path).unwrap();

    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.get("curfew.start").as_deref(), Some("22:30"));
    assert_eq!(reloaded.news.keywords, vec!["curfew", "metro"]);
}

#[test]
fn test_invalid_window_is_rejected() {
    let mut config = Config::default();
    let err = config.apply("curfew.end", "23:00").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
    assert_eq!(config.curfew.end, "05:00");
    assert!(matches!(
        config.apply("curfew.nope", "1"),
        Err(ConfigError::UnknownKey(_))
    ));
}
