//! Archived session domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geo::GeoCoordinate;

/// Sortable timestamp layout used as the archived session identifier.
pub const ARCHIVE_ID_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Download reference returned by blob storage after an upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobRef(pub String);

impl BlobRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted metadata of one saved AR session.
///
/// Written once, after both the preview and the world map are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedSession {
    /// Creation timestamp formatted with [`ARCHIVE_ID_FORMAT`].
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub preview_ref: BlobRef,
    pub map_ref: BlobRef,
    pub coordinate: GeoCoordinate,
}

impl ArchivedSession {
    /// Formats a creation time as an archive identifier.
    pub fn id_for(created_at: &DateTime<Utc>) -> String {
        created_at.format(ARCHIVE_ID_FORMAT).to_string()
    }

    /// Blob key of the preview image for the session `id`.
    pub fn preview_key(id: &str) -> String {
        format!("previews/{}.png", id)
    }

    /// Blob key of the world map for the session `id`.
    pub fn map_key(id: &str) -> String {
        format!("maps/{}.worldmap", id)
    }
}

/// Progress of a save through the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SaveState {
    Idle,
    CapturingPreview,
    UploadingPreview,
    UploadingMap,
    Registering,
    Done,
    Failed(String),
}

impl SaveState {
    /// `Done` and `Failed` end a save; nothing follows them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SaveState::Done | SaveState::Failed(_))
    }

    /// True while a save is between its first step and a terminal state.
    pub fn is_in_flight(&self) -> bool {
        !matches!(self, SaveState::Idle) && !self.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_id_is_sortable_timestamp() {
        let earlier = Utc.with_ymd_and_hms(2019, 3, 2, 9, 5, 1).unwrap();
        let later = Utc.with_ymd_and_hms(2019, 3, 2, 10, 0, 0).unwrap();

        let a = ArchivedSession::id_for(&earlier);
        let b = ArchivedSession::id_for(&later);
        assert_eq!(a, "2019-03-02 09:05:01.000");
        assert!(a < b);
    }

    #[test]
    fn test_preview_and_map_keys_differ() {
        let id = "2019-03-02 09:05:01.000";
        assert_ne!(ArchivedSession::preview_key(id), ArchivedSession::map_key(id));
    }

    #[test]
    fn test_save_state_terminality() {
        assert!(!SaveState::Idle.is_in_flight());
        assert!(SaveState::UploadingMap.is_in_flight());
        assert!(SaveState::Done.is_terminal());
        assert!(SaveState::Failed("x".into()).is_terminal());
        assert!(!SaveState::Failed("x".into()).is_in_flight());
    }
}
