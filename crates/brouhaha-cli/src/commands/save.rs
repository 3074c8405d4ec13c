use anyhow::{Context, Result, ensure};
use std::path::Path;

use brouhaha_core::GeoCoordinate;
use brouhaha_core::archive::ArchivedSession;
use brouhaha_core::spatial::SerializedMap;

use super::context::AppContext;

pub async fn run(
    context: &AppContext,
    map_path: &Path,
    preview_path: &Path,
    lat: f64,
    lon: f64,
) -> Result<()> {
    let record = save(context, map_path, preview_path, lat, lon).await?;

    println!("Saved session {}", record.id);
    println!("  map:     {}", record.map_ref);
    println!("  preview: {}", record.preview_ref);
    Ok(())
}

pub(crate) async fn save(
    context: &AppContext,
    map_path: &Path,
    preview_path: &Path,
    lat: f64,
    lon: f64,
) -> Result<ArchivedSession> {
    ensure!((-90.0..=90.0).contains(&lat), "Latitude {} out of range", lat);
    ensure!((-180.0..=180.0).contains(&lon), "Longitude {} out of range", lon);

    let map = tokio::fs::read(map_path)
        .await
        .with_context(|| format!("Failed to read map {}", map_path.display()))?;
    let preview = tokio::fs::read(preview_path)
        .await
        .with_context(|| format!("Failed to read preview {}", preview_path.display()))?;

    let record = context
        .archive
        .save(SerializedMap::new(map), preview, GeoCoordinate::new(lat, lon))
        .await?;
    Ok(record)
}
