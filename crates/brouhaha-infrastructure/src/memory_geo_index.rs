//! In-process geofence index.

use async_trait::async_trait;
use std::sync::RwLock;

use brouhaha_core::error::Result;
use brouhaha_core::geo::EARTH_RADIUS_METERS;
use brouhaha_core::proximity::{GeoEntry, GeoIndex};
use brouhaha_core::{ArError, GeoCoordinate};

/// Geofence index held in memory, for tests and single-process use.
///
/// `query` returns every entry inside the bounding box of the search circle;
/// the proximity index trims the corners.
#[derive(Default)]
pub struct MemoryGeoIndex {
    entries: RwLock<Vec<GeoEntry>>,
}

impl MemoryGeoIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl GeoIndex for MemoryGeoIndex {
    async fn register(&self, key: &str, coordinate: GeoCoordinate) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ArError::internal("geo index lock poisoned"))?;

        match entries.iter_mut().find(|e| e.key == key) {
            Some(existing) => existing.coordinate = coordinate,
            None => entries.push(GeoEntry {
                key: key.to_string(),
                coordinate,
            }),
        }
        Ok(())
    }

    async fn query(&self, center: GeoCoordinate, radius_meters: f64) -> Result<Vec<GeoEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ArError::internal("geo index lock poisoned"))?;

        Ok(entries
            .iter()
            .filter(|e| in_bounding_box(&center, radius_meters, &e.coordinate))
            .cloned()
            .collect())
    }
}

/// Cheap pre-filter: is `point` inside the lat/lon box around the circle?
///
/// The longitude half-width is the circle's widest extent,
/// `asin(sin(r / R) / cos(lat))`, reached north or south of the center's
/// latitude. When the circle covers a pole only latitude is checked.
pub(crate) fn in_bounding_box(
    center: &GeoCoordinate,
    radius_meters: f64,
    point: &GeoCoordinate,
) -> bool {
    // Small slack so points exactly on the circle are never cut here.
    const SLACK: f64 = 1.01;

    let angular = radius_meters / EARTH_RADIUS_METERS;
    let lat_span = angular.to_degrees() * SLACK;
    if (point.latitude - center.latitude).abs() > lat_span {
        return false;
    }

    if center.latitude.abs() + lat_span >= 90.0 {
        return true;
    }

    let ratio = angular.sin() / center.latitude.to_radians().cos();
    if angular >= std::f64::consts::FRAC_PI_2 || ratio >= 1.0 {
        return true;
    }

    let lon_span = ratio.asin().to_degrees() * SLACK;
    let mut lon_delta = (point.longitude - center.longitude).abs();
    if lon_delta > 180.0 {
        lon_delta = 360.0 - lon_delta;
    }
    lon_delta <= lon_span
}
