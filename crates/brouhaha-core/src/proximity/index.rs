use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tokio_util::sync::CancellationToken;

use super::repository::{GeoEntry, GeoIndex};
use crate::error::{ArError, Result};
use crate::geo::GeoCoordinate;

/// An archived session found near a query center.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityHit {
    /// Archived session identifier.
    pub id: String,
    pub coordinate: GeoCoordinate,
    /// Great-circle distance from the query center, in meters.
    pub distance_meters: f64,
}

/// Geofenced lookup of saved sessions.
///
/// Results contain only entries within the great-circle radius, boundary
/// inclusive. The stream is finite and single-use; call `query` again to
/// re-query.
#[derive(Clone)]
pub struct ProximityIndex {
    index: Arc<dyn GeoIndex>,
}

impl ProximityIndex {
    pub fn new(index: Arc<dyn GeoIndex>) -> Self {
        Self { index }
    }

    /// Records `id` at `coordinate`. Registering the same id again is harmless.
    pub async fn register(&self, id: &str, coordinate: GeoCoordinate) -> Result<()> {
        self.index
            .register(id, coordinate)
            .await
            .map_err(|e| ArError::index_unavailable(e.to_string()))
    }

    /// Streams sessions within `radius_meters` of `center`.
    ///
    /// # Errors
    ///
    /// [`ArError::IndexUnavailable`] when the backing index cannot be queried.
    pub async fn query(
        &self,
        center: GeoCoordinate,
        radius_meters: f64,
    ) -> Result<BoxStream<'static, ProximityHit>> {
        let entries = self
            .index
            .query(center, radius_meters)
            .await
            .map_err(|e| ArError::index_unavailable(e.to_string()))?;

        Ok(within_radius(entries, center, radius_meters))
    }

    /// Like [`query`](Self::query), bound to `token`.
    ///
    /// Once the token is cancelled the backing query is abandoned and the
    /// stream ends; a superseded lookup therefore yields nothing further.
    pub async fn query_cancellable(
        &self,
        center: GeoCoordinate,
        radius_meters: f64,
        token: CancellationToken,
    ) -> Result<BoxStream<'static, ProximityHit>> {
        let entries = tokio::select! {
            _ = token.cancelled() => return Ok(stream::empty().boxed()),
            result = self.index.query(center, radius_meters) => {
                result.map_err(|e| ArError::index_unavailable(e.to_string()))?
            }
        };

        let stop = async move { token.cancelled().await };
        Ok(within_radius(entries, center, radius_meters)
            .take_until(stop)
            .boxed())
    }
}

fn within_radius(
    entries: Vec<GeoEntry>,
    center: GeoCoordinate,
    radius_meters: f64,
) -> BoxStream<'static, ProximityHit> {
    stream::iter(entries)
        .filter_map(move |entry| {
            let distance_meters = center.distance_to(&entry.coordinate);
            let hit = (distance_meters <= radius_meters).then(|| ProximityHit {
                id: entry.key,
                coordinate: entry.coordinate,
                distance_meters,
            });
            async move { hit }
        })
        .boxed()
}
