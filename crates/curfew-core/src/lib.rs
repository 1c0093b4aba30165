//! # Curfew Notifier Core Library
//!
//! Core logic for a curfew notifier: the daily curfew clock, home proximity
//! checks, lead-time reminders before curfew starts and a news feed reader.
//! Everything is exposed to the standalone `curfew` CLI binary, which is a
//! thin layer over this library.
//!
//! ## Architecture
//!
//! - **Curfew clock**: pure functions of a [`CurfewWindow`] and a timestamp
//! - **Monitor**: a wall-clock-driven loop that calls `tick()` on an interval
//!   and reacts to location fixes, restarted by a supervisor
//! - **Storage**: SQLite key-value preferences and TOML configuration
//! - **Collaborators**: [`Clock`], [`Notifier`], [`LocationSource`] and
//!   [`PreferenceRepository`] are traits so hosts and tests inject their own
//!
//! ## Key Components
//!
//! - [`CurfewMonitor`]: the monitor state machine
//! - [`NotificationScheduler`]: once-per-cycle reminder decisions
//! - [`ProximitySampler`]: at-home verdict from location fixes
//! - [`NewsClient`]: RSS fetch with an empty-on-failure fallback

pub mod curfew;
pub mod error;
pub mod events;
pub mod location;
pub mod monitor;
pub mod news;
pub mod notify;
pub mod proximity;
pub mod storage;

pub use curfew::{Clock, CurfewStatus, CurfewWindow, ManualClock, SystemClock};
pub use error::{
    ConfigError, CoreError, DeliveryError, FeedError, LocationError, StorageError,
    ValidationError,
};
pub use events::Event;
pub use location::{
    FileLocationSource, LocationRequest, LocationSource, LocationSubscription,
    ManualLocationSource,
};
pub use monitor::{supervise, CurfewMonitor, MonitorSettings, RestartPolicy, SupervisorReport};
pub use news::{NewsClient, NewsItem};
pub use notify::{
    ConsoleNotifier, MemoryNotifier, NotificationRequest, NotificationRule, NotificationScheduler,
    Notifier, RuleSet,
};
pub use proximity::{GeoPoint, HomeLocation, HomeStatus, ProximitySampler};
pub use storage::{Config, Database, KvPreferences, MemoryStore, PreferenceRepository};
