pub mod config;
pub mod emulate;
pub mod home;
pub mod monitor;
pub mod news;
pub mod rules;
pub mod status;

use curfew_core::{Database, KvPreferences};

/// Preferences stored in the data directory's database.
pub fn open_preferences() -> Result<KvPreferences<Database>, Box<dyn std::error::Error>> {
    Ok(KvPreferences::new(Database::open()?))
}
