//! File-backed geofence index.
//!
//! Stores every registered key in a single TOML file. Writes go through
//! `AtomicTomlFile::update`, so concurrent processes never lose entries.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use brouhaha_core::error::Result;
use brouhaha_core::proximity::{GeoEntry, GeoIndex};
use brouhaha_core::{ArError, GeoCoordinate};

use crate::dto::GeoIndexFile;
use crate::memory_geo_index::in_bounding_box;
use crate::storage::AtomicTomlFile;

/// Geofence index persisted to `geo_index.toml`.
pub struct TomlGeoIndex {
    path: PathBuf,
}

impl TomlGeoIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl GeoIndex for TomlGeoIndex {
    async fn register(&self, key: &str, coordinate: GeoCoordinate) -> Result<()> {
        let file = AtomicTomlFile::<GeoIndexFile>::new(self.path.clone());
        let key = key.to_string();

        let changed = tokio::task::spawn_blocking(move || {
            file.update(GeoIndexFile::default(), |index| {
                Ok(index.upsert(&key, coordinate))
            })
        })
        .await
        .map_err(|e| ArError::internal(format!("Geo index task failed: {}", e)))??;

        if !changed {
            tracing::debug!("[TomlGeoIndex] Key already registered at this location");
        }
        Ok(())
    }

    async fn query(&self, center: GeoCoordinate, radius_meters: f64) -> Result<Vec<GeoEntry>> {
        let file = AtomicTomlFile::<GeoIndexFile>::new(self.path.clone());

        let index = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| ArError::internal(format!("Geo index task failed: {}", e)))??
            .unwrap_or_default();

        Ok(index
            .entries
            .into_iter()
            .map(GeoEntry::from)
            .filter(|entry| in_bounding_box(&center, radius_meters, &entry.coordinate))
            .collect())
    }
}
