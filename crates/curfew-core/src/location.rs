//! Location fix sources.
//!
//! A subscription exposes only the most recent fix (last value wins). Dropping
//! the [`LocationSubscription`] stops any background polling behind it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::LocationError;
use crate::proximity::GeoPoint;

pub const DEFAULT_LOCATION_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_MIN_DISPLACEMENT_M: f64 = 10.0;

/// How often fixes are wanted and how far the device must move between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationRequest {
    pub interval: Duration,
    pub min_displacement_m: f64,
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self {
            interval: DEFAULT_LOCATION_INTERVAL,
            min_displacement_m: DEFAULT_MIN_DISPLACEMENT_M,
        }
    }
}

/// Live feed of fixes. `None` means the source currently has no fix.
#[derive(Debug)]
pub struct LocationSubscription {
    rx: watch::Receiver<Option<GeoPoint>>,
    task: Option<JoinHandle<()>>,
}

impl LocationSubscription {
    pub fn new(rx: watch::Receiver<Option<GeoPoint>>) -> Self {
        Self { rx, task: None }
    }

    fn with_task(rx: watch::Receiver<Option<GeoPoint>>, task: JoinHandle<()>) -> Self {
        Self {
            rx,
            task: Some(task),
        }
    }

    /// Most recent value without waiting.
    pub fn latest(&self) -> Option<GeoPoint> {
        *self.rx.borrow()
    }

    /// Wait for the next published value.
    ///
    /// Returns `None` once the source has gone away.
    pub async fn next(&mut self) -> Option<Option<GeoPoint>> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

impl Drop for LocationSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("location updates stopped");
        }
    }
}

/// Anything that can stream location fixes.
pub trait LocationSource: Send + Sync {
    fn subscribe(&self, request: LocationRequest) -> Result<LocationSubscription, LocationError>;
}

/// Fixes pushed by the embedding application.
#[derive(Debug)]
pub struct ManualLocationSource {
    tx: watch::Sender<Option<GeoPoint>>,
    permitted: bool,
}

impl ManualLocationSource {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx, permitted: true }
    }

    /// A source whose platform refused location permission.
    pub fn denied() -> Self {
        Self {
            permitted: false,
            ..Self::new()
        }
    }

    pub fn push(&self, fix: GeoPoint) {
        self.tx.send_replace(Some(fix));
    }

    /// Publish "no fix available".
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ManualLocationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationSource for ManualLocationSource {
    fn subscribe(&self, _request: LocationRequest) -> Result<LocationSubscription, LocationError> {
        if !self.permitted {
            return Err(LocationError::PermissionDenied);
        }
        Ok(LocationSubscription::new(self.tx.subscribe()))
    }
}

/// Polls a JSON file `{"latitude": .., "longitude": ..}` written by some
/// external GPS bridge.
///
/// A missing or malformed file yields no fix for that interval. Fixes closer
/// than `min_displacement_m` to the last published one are not republished.
#[derive(Debug, Clone)]
pub struct FileLocationSource {
    path: PathBuf,
}

impl FileLocationSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocationSource for FileLocationSource {
    fn subscribe(&self, request: LocationRequest) -> Result<LocationSubscription, LocationError> {
        match std::fs::metadata(&self.path) {
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(LocationError::PermissionDenied)
            }
            _ => {}
        }
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        let (tx, rx) = watch::channel(None);
        let path = self.path.clone();
        let task = handle.spawn(poll_file(path, request, tx));
        debug!(path = %self.path.display(), interval_ms = request.interval.as_millis() as u64, "location updates requested");
        Ok(LocationSubscription::with_task(rx, task))
    }
}

async fn poll_file(path: PathBuf, request: LocationRequest, tx: watch::Sender<Option<GeoPoint>>) {
    let mut ticker = tokio::time::interval(request.interval);
    let mut last_published: Option<GeoPoint> = None;
    loop {
        ticker.tick().await;
        if tx.is_closed() {
            break;
        }
        match read_fix(&path).await {
            Ok(fix) => {
                let moved = last_published
                    .map_or(true, |prev| prev.distance_m(&fix) >= request.min_displacement_m);
                if moved {
                    last_published = Some(fix);
                    tx.send_replace(Some(fix));
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "no location fix available");
            }
        }
    }
}

async fn read_fix(path: &Path) -> Result<GeoPoint, Box<dyn std::error::Error + Send + Sync>> {
    let content = tokio::fs::read_to_string(path).await?;
    let raw: GeoPoint = serde_json::from_str(&content)?;
    Ok(GeoPoint::checked(raw.latitude, raw.longitude)?)
}
