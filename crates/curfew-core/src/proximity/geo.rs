//! Coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Scale factor for the fixed-point home coordinates.
pub const COORD_SCALE: f64 = 1_000_000.0;

/// A location fix in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Like [`GeoPoint::new`] but rejects out-of-range or non-finite degrees.
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        check_range("latitude", latitude, 90.0)?;
        check_range("longitude", longitude, 180.0)?;
        Ok(Self::new(latitude, longitude))
    }

    /// Great-circle distance in meters.
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        haversine_m(self, other)
    }
}

fn check_range(field: &'static str, value: f64, limit: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (-limit..=limit).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::CoordinateOutOfRange {
            field,
            value,
            min: -limit,
            max: limit,
        })
    }
}

/// Haversine distance between two fixes, in meters.
pub fn haversine_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Home point as persisted: degrees × 1,000,000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeLocation {
    pub lat_e6: i32,
    pub lon_e6: i32,
}

impl HomeLocation {
    pub fn from_degrees(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        let point = GeoPoint::checked(latitude, longitude)?;
        Ok(Self {
            lat_e6: (point.latitude * COORD_SCALE).round() as i32,
            lon_e6: (point.longitude * COORD_SCALE).round() as i32,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.lat_e6 as f64 / COORD_SCALE
    }

    pub fn longitude(&self) -> f64 {
        self.lon_e6 as f64 / COORD_SCALE
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude(), self.longitude())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn distance_to_self_is_zero() {
        let kyiv = GeoPoint::new(50.4501, 30.5234);
        assert_eq!(kyiv.distance_m(&kyiv), 0.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        let d = a.distance_m(&b);
        assert!((d - 111_195.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn home_location_round_trips_through_fixed_point() {
        let home = HomeLocation::from_degrees(50.450_123, 30.523_456).unwrap();
        assert_eq!(home.lat_e6, 50_450_123);
        assert_eq!(home.lon_e6, 30_523_456);
        assert!((home.latitude() - 50.450_123).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert!(HomeLocation::from_degrees(91.0, 0.0).is_err());
        assert!(HomeLocation::from_degrees(0.0, -180.5).is_err());
        assert!(GeoPoint::checked(f64::NAN, 0.0).is_err());
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(
            lat1 in -90.0f64..90.0, lon1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0, lon2 in -180.0f64..180.0,
        ) {
            let a = GeoPoint::new(lat1, lon1);
            let b = GeoPoint::new(lat2, lon2);
            let ab = a.distance_m(&b);
            let ba = b.distance_m(&a);
            prop_assert!((ab - ba).abs() < 1e-6);
            prop_assert!(ab >= 0.0);
        }
    }
}
