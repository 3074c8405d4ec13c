//! On-disk layout of the geofence index (`geo_index.toml`).

use serde::{Deserialize, Serialize};

use brouhaha_core::GeoCoordinate;
use brouhaha_core::proximity::GeoEntry;

/// One registered key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoIndexRow {
    pub key: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<GeoIndexRow> for GeoEntry {
    fn from(row: GeoIndexRow) -> Self {
        GeoEntry {
            key: row.key,
            coordinate: GeoCoordinate::new(row.latitude, row.longitude),
        }
    }
}

/// Whole index file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoIndexFile {
    #[serde(default, rename = "entry")]
    pub entries: Vec<GeoIndexRow>,
}

impl GeoIndexFile {
    /// Inserts or moves `key`. Returns false if it was already stored at the
    /// same coordinate.
    pub fn upsert(&mut self, key: &str, coordinate: GeoCoordinate) -> bool {
        if let Some(row) = self.entries.iter_mut().find(|row| row.key == key) {
            let unchanged =
                row.latitude == coordinate.latitude && row.longitude == coordinate.longitude;
            row.latitude = coordinate.latitude;
            row.longitude = coordinate.longitude;
            return !unchanged;
        }

        self.entries.push(GeoIndexRow {
            key: key.to_string(),
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        });
        true
    }
}
