//! Archived session record store.
//!
//! Stores each record as a versioned JSON file and migrates on load.
//!
//! File location: `{records_dir}/{sanitized id}.json`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use version_migrate::Migrator;

use brouhaha_core::ArError;
use brouhaha_core::archive::{ArchivedSession, RecordStore};
use brouhaha_core::error::Result;

use crate::dto::create_archived_session_migrator;
use crate::paths::key_to_relative_path;

const ENTITY: &str = "archived_session";

/// File-based record store with version migration support.
pub struct JsonRecordRepository {
    records_dir: PathBuf,
    migrator: Migrator,
}

impl JsonRecordRepository {
    pub fn new(records_dir: impl Into<PathBuf>) -> Self {
        Self {
            records_dir: records_dir.into(),
            migrator: create_archived_session_migrator(),
        }
    }

    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    fn record_path(&self, id: &str) -> PathBuf {
        let mut name = key_to_relative_path(&id.replace('/', "_")).into_os_string();
        name.push(".json");
        self.records_dir.join(name)
    }

    async fn load_file(&self, path: &Path) -> Result<ArchivedSession> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            ArError::io(format!("Failed to read record '{}': {}", path.display(), e))
        })?;

        let json_value: serde_json::Value = serde_json::from_str(&content)?;

        let record: ArchivedSession = self
            .migrator
            .load_flat_from(ENTITY, json_value)
            .map_err(|e| {
                ArError::Serialization {
                    format: "migration".to_string(),
                    message: format!("Failed to migrate record '{}': {}", path.display(), e),
                }
            })?;
        Ok(record)
    }
}

#[async_trait]
impl RecordStore for JsonRecordRepository {
    async fn write(&self, record: &ArchivedSession) -> Result<()> {
        let path = self.record_path(&record.id);

        fs::create_dir_all(&self.records_dir)
            .await
            .map_err(|e| ArError::io(format!("Failed to create records directory: {}", e)))?;

        let serialized = self
            .migrator
            .save_domain_flat(ENTITY, record.clone())
            .map_err(|e| ArError::Serialization {
                format: "migration".to_string(),
                message: format!("Failed to serialize record '{}': {}", record.id, e),
            })?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized)
            .await
            .map_err(|e| ArError::io(format!("Failed to write record: {}", e)))?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| ArError::io(format!("Failed to commit record: {}", e)))?;

        tracing::debug!("[JsonRecordRepository] Wrote record {}", record.id);
        Ok(())
    }

    async fn read(&self, id: &str) -> Result<Option<ArchivedSession>> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(None);
        }
        self.load_file(&path).await.map(Some)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let path = self.record_path(id);
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("[JsonRecordRepository] Deleted record {}", id);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ArError::io(format!(
                "Failed to delete record '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    async fn list(&self) -> Result<Vec<ArchivedSession>> {
        if !self.records_dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut dir = fs::read_dir(&self.records_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.load_file(&path).await {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(
                        "[JsonRecordRepository] Skipping unreadable record {}: {}",
                        path.display(),
                        e
                    );
                }
            }
        }

        records.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(records)
    }
}
