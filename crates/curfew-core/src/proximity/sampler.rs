//! "Am I home?" evaluation over incoming location fixes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::geo::{GeoPoint, HomeLocation};

/// Default radius around home that still counts as "at home", in meters.
pub const DEFAULT_HOME_RADIUS_M: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeStatus {
    /// No home point, or no fix received yet.
    Unknown,
    AtHome,
    Away,
}

/// Result of evaluating one fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProximityReading {
    pub distance_m: f64,
    pub status: HomeStatus,
}

/// Tracks the latest proximity verdict.
///
/// A missing fix leaves the previous verdict in place; clearing or moving the
/// home point resets it to `Unknown`.
#[derive(Debug, Clone)]
pub struct ProximitySampler {
    home: Option<HomeLocation>,
    radius_m: f64,
    last: Option<ProximityReading>,
}

impl ProximitySampler {
    pub fn new(home: Option<HomeLocation>, radius_m: f64) -> Self {
        Self {
            home,
            radius_m,
            last: None,
        }
    }

    pub fn home(&self) -> Option<HomeLocation> {
        self.home
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Replace the home point. Resets the verdict when it actually changes.
    pub fn set_home(&mut self, home: Option<HomeLocation>) {
        if self.home != home {
            self.home = home;
            self.last = None;
        }
    }

    pub fn status(&self) -> HomeStatus {
        match (self.home, self.last) {
            (Some(_), Some(reading)) => reading.status,
            _ => HomeStatus::Unknown,
        }
    }

    pub fn last_reading(&self) -> Option<ProximityReading> {
        self.home.and(self.last)
    }

    /// Evaluate a fix against home.
    ///
    /// Returns `None` when home is unset or the fix is missing; in the latter
    /// case the previous verdict is preserved.
    pub fn sample(&mut self, fix: Option<GeoPoint>) -> Option<ProximityReading> {
        let home = self.home?;
        let fix = fix?;
        let distance_m = home.point().distance_m(&fix);
        let status = if distance_m < self.radius_m {
            HomeStatus::AtHome
        } else {
            HomeStatus::Away
        };
        debug!(distance_m, ?status, "proximity evaluated");
        let reading = ProximityReading { distance_m, status };
        self.last = Some(reading);
        Some(reading)
    }

    pub fn status_text(&self) -> &'static str {
        if self.home.is_none() {
            return "Home location not set.";
        }
        match self.status() {
            HomeStatus::AtHome => "You are home.",
            HomeStatus::Away => "You are not home.",
            HomeStatus::Unknown => "Location unknown.",
        }
    }
}
