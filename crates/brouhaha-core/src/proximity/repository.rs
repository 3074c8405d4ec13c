//! Geofenced key/value index capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geo::GeoCoordinate;

/// A key registered at a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoEntry {
    pub key: String,
    pub coordinate: GeoCoordinate,
}

/// Backing store for [`ProximityIndex`](super::ProximityIndex).
///
/// `query` may return a superset of the entries inside the radius (for example
/// everything in the covering grid cells); the proximity index applies the
/// exact great-circle filter.
#[async_trait]
pub trait GeoIndex: Send + Sync {
    /// Stores `key` at `coordinate`, replacing any previous location for it.
    async fn register(&self, key: &str, coordinate: GeoCoordinate) -> Result<()>;

    /// Returns candidate entries near `center`.
    async fn query(&self, center: GeoCoordinate, radius_meters: f64) -> Result<Vec<GeoEntry>>;
}
