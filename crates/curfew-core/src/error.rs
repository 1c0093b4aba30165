//! Core error types for curfew-core.
//!
//! Every failure in the monitoring path degrades to "feature does nothing this
//! cycle", so most of these surface only at the edges: the CLI, storage setup
//! and the supervisor.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for curfew-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Preference storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Location subscription errors
    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    /// Notification delivery errors
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// News feed errors
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Key-value preference storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// The connection mutex was poisoned by a panicking writer
    #[error("Storage handle poisoned")]
    Poisoned,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Could not resolve the data directory
    #[error("Cannot determine data directory: {0}")]
    DataDir(String),
}

/// Validation errors for user-supplied rules and coordinates.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// Lead time must be a positive number of minutes
    #[error("Lead time must be positive, got {0}")]
    NonPositiveLead(u32),

    /// A rule with this lead time already exists
    #[error("A rule for {0} minutes before curfew already exists")]
    DuplicateLead(u32),

    /// No rule with this lead time
    #[error("No rule for {0} minutes before curfew")]
    RuleNotFound(u32),

    /// Rule exists but is switched off
    #[error("Rule for {0} minutes before curfew is disabled")]
    RuleDisabled(u32),

    /// Coordinate outside the valid range
    #[error("Invalid {field}: {value} (expected {min}..={max})")]
    CoordinateOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Curfew window with identical start and end
    #[error("Curfew window start and end must differ (both {0})")]
    EmptyWindow(chrono::NaiveTime),
}

/// Location subscription errors.
#[derive(Error, Debug)]
pub enum LocationError {
    /// The platform refused access to location
    #[error("Location permission not granted")]
    PermissionDenied,

    /// The location backend could not be started
    #[error("Location source unavailable: {0}")]
    Unavailable(String),
}

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The platform refused to post notifications
    #[error("Notification permission not granted")]
    PermissionDenied,

    /// The delivery backend failed
    #[error("Notification backend failed: {0}")]
    Backend(String),
}

/// News feed errors.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("Feed returned HTTP {status}")]
    Status { status: u16 },

    /// Malformed XML
    #[error("Failed to parse feed: {0}")]
    Parse(#[from] quick_xml::DeError),

    /// Invalid feed URL
    #[error("Invalid feed URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}
