//! Archived session models and storage capabilities.
//!
//! The save/load orchestration lives in the application layer; this module
//! defines what gets persisted and the traits it is persisted through.

mod model;
mod repository;

pub use model::{ARCHIVE_ID_FORMAT, ArchivedSession, BlobRef, SaveState};
pub use repository::{BlobStorage, RecordStore};
