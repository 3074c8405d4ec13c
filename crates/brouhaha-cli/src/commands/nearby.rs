use anyhow::Result;
use futures::StreamExt;

use brouhaha_core::proximity::ProximityHit;
use brouhaha_core::{GeoCoordinate, miles_to_meters};

use super::context::AppContext;

pub async fn run(
    context: &AppContext,
    lat: f64,
    lon: f64,
    radius_miles: Option<f64>,
) -> Result<()> {
    let center = GeoCoordinate::new(lat, lon);
    let radius_meters = radius_miles
        .map(miles_to_meters)
        .unwrap_or_else(|| context.config.search_radius_meters());

    let hits = nearby(context, center, radius_meters).await?;
    if hits.is_empty() {
        println!("No sessions within {:.0} m", radius_meters);
        return Ok(());
    }

    let nearest = context.archive.resolve_nearest(center, radius_meters).await;
    for hit in hits {
        let marker = if nearest.as_deref() == Some(hit.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{} {}  {:>8.1} m", marker, hit.id, hit.distance_meters);
    }
    Ok(())
}

/// Hits within `radius_meters`, closest first.
pub(crate) async fn nearby(
    context: &AppContext,
    center: GeoCoordinate,
    radius_meters: f64,
) -> Result<Vec<ProximityHit>> {
    let mut hits: Vec<ProximityHit> = context
        .archive
        .proximity()
        .query(center, radius_meters)
        .await?
        .collect()
        .await;
    hits.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    Ok(hits)
}
