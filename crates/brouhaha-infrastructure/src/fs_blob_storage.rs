//! Filesystem blob storage.
//!
//! Blobs live under `{base_dir}/{sanitized key}`; references are `file://`
//! URLs pointing at them.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use brouhaha_core::ArError;
use brouhaha_core::archive::{BlobRef, BlobStorage};
use brouhaha_core::error::Result;

use crate::paths::key_to_relative_path;

const FILE_SCHEME: &str = "file://";

/// Blob storage rooted at a local directory.
pub struct FsBlobStorage {
    base_dir: PathBuf,
}

impl FsBlobStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn blob_path(&self, key: &str) -> Result<PathBuf> {
        let relative = key_to_relative_path(key);
        if relative.as_os_str().is_empty() {
            return Err(ArError::persist(format!("Invalid blob key '{}'", key)));
        }
        Ok(self.base_dir.join(relative))
    }

    /// Resolves a reference to a path inside the base directory.
    fn resolve(&self, reference: &BlobRef) -> Result<PathBuf> {
        let path = reference
            .as_str()
            .strip_prefix(FILE_SCHEME)
            .map(PathBuf::from)
            .ok_or_else(|| ArError::fetch(format!("Unsupported blob reference '{}'", reference)))?;

        let escapes = path
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir));
        if escapes || !path.starts_with(&self.base_dir) {
            return Err(ArError::fetch(format!(
                "Blob reference '{}' is outside the store",
                reference
            )));
        }
        Ok(path)
    }
}

#[async_trait]
impl BlobStorage for FsBlobStorage {
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<BlobRef> {
        let path = self.blob_path(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ArError::persist(format!("Failed to create blob directory: {}", e)))?;
        }

        // Write to a sibling tmp file first so readers never see a partial blob.
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

        fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| ArError::persist(format!("Failed to write blob '{}': {}", key, e)))?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| ArError::persist(format!("Failed to commit blob '{}': {}", key, e)))?;

        tracing::debug!("[FsBlobStorage] Stored {} bytes at {}", bytes.len(), path.display());
        Ok(BlobRef::new(format!("{}{}", FILE_SCHEME, path.display())))
    }

    async fn download(&self, reference: &BlobRef, max_bytes: u64) -> Result<Vec<u8>> {
        let path = self.resolve(reference)?;

        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| ArError::fetch(format!("Failed to stat blob '{}': {}", reference, e)))?;
        if metadata.len() > max_bytes {
            return Err(ArError::FetchTooLarge {
                size: metadata.len(),
                limit: max_bytes,
            });
        }

        let bytes = fs::read(&path)
            .await
            .map_err(|e| ArError::fetch(format!("Failed to read blob '{}': {}", reference, e)))?;

        // The file may have grown between stat and read.
        if bytes.len() as u64 > max_bytes {
            return Err(ArError::FetchTooLarge {
                size: bytes.len() as u64,
                limit: max_bytes,
            });
        }
        Ok(bytes)
    }
}
