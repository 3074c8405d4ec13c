//! Storage capabilities used by the session archive.

use async_trait::async_trait;

use super::model::{ArchivedSession, BlobRef};
use crate::error::Result;

/// Blob storage for preview images and world maps.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Stores `bytes` under `key` and returns a download reference.
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<BlobRef>;

    /// Fetches the blob behind `reference`.
    ///
    /// Implementations must refuse blobs larger than `max_bytes` with
    /// [`ArError::FetchTooLarge`](crate::ArError::FetchTooLarge).
    async fn download(&self, reference: &BlobRef, max_bytes: u64) -> Result<Vec<u8>>;
}

/// Remote record store holding archived session metadata.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persists `record` under its id.
    async fn write(&self, record: &ArchivedSession) -> Result<()>;

    /// Reads a record by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))`: Record found
    /// - `Ok(None)`: No record with that id
    /// - `Err(_)`: Storage failure
    async fn read(&self, id: &str) -> Result<Option<ArchivedSession>>;

    /// Removes the record `id`. Removing a missing record is not an error.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Lists all records, newest first.
    async fn list(&self) -> Result<Vec<ArchivedSession>>;
}
