mod geo;
mod sampler;

pub use geo::{haversine_m, GeoPoint, HomeLocation, COORD_SCALE, EARTH_RADIUS_M};
pub use sampler::{HomeStatus, ProximityReading, ProximitySampler, DEFAULT_HOME_RADIUS_M};
