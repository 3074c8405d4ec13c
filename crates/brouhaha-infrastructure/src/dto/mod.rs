//! Versioned persistence DTOs.

mod archived_session;
mod geo_index;

pub use archived_session::{ArchivedSessionV1_0_0, create_archived_session_migrator};
pub use geo_index::{GeoIndexFile, GeoIndexRow};
