//! Archived session DTOs and migrations
//!
//! ## Version History
//! - **1.0.0**: Initial schema (id, timestamps, blob links, coordinate)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

use brouhaha_core::GeoCoordinate;
use brouhaha_core::archive::{ArchivedSession, BlobRef};

/// Archived session record DTO V1.0.0
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ArchivedSessionV1_0_0 {
    /// Creation timestamp key
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Download link of the preview image
    pub image_link: String,
    /// Download link of the serialized world map
    pub world_map_link: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Convert ArchivedSessionV1_0_0 DTO to domain model
impl IntoDomain<ArchivedSession> for ArchivedSessionV1_0_0 {
    fn into_domain(self) -> ArchivedSession {
        ArchivedSession {
            id: self.id,
            created_at: self.created_at,
            preview_ref: BlobRef::new(self.image_link),
            map_ref: BlobRef::new(self.world_map_link),
            coordinate: GeoCoordinate::new(self.latitude, self.longitude),
        }
    }
}

/// Convert domain model to ArchivedSessionV1_0_0 DTO for persistence
impl FromDomain<ArchivedSession> for ArchivedSessionV1_0_0 {
    fn from_domain(record: ArchivedSession) -> Self {
        ArchivedSessionV1_0_0 {
            id: record.id,
            created_at: record.created_at,
            image_link: record.preview_ref.0,
            world_map_link: record.map_ref.0,
            latitude: record.coordinate.latitude,
            longitude: record.coordinate.longitude,
        }
    }
}

/// Creates a Migrator for ArchivedSession entities.
pub fn create_archived_session_migrator() -> version_migrate::Migrator {
    version_migrate::migrator!("archived_session" => [
        ArchivedSessionV1_0_0,
        ArchivedSession
    ], save = true)
    .expect("Failed to create archived_session migrator")
}
