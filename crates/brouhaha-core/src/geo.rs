//! Geographic coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

/// Meters in one statute mile.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Mean Earth radius used for haversine distance.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &GeoCoordinate) -> f64 {
        haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }

    /// Returns true when `other` lies within `radius_meters` of this point.
    ///
    /// The boundary is inclusive: a point at exactly `radius_meters` matches.
    pub fn is_within(&self, other: &GeoCoordinate, radius_meters: f64) -> bool {
        self.distance_to(other) <= radius_meters
    }

    /// Returns the point `meters` north of this one along the same meridian.
    pub fn offset_north(&self, meters: f64) -> GeoCoordinate {
        let delta_lat = (meters / EARTH_RADIUS_METERS).to_degrees();
        GeoCoordinate::new(self.latitude + delta_lat, self.longitude)
    }
}

/// Converts statute miles to meters.
pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

/// Haversine distance between two points in meters.
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}
