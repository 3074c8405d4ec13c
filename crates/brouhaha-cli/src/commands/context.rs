use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use brouhaha_application::SessionArchive;
use brouhaha_core::config::ArConfig;
use brouhaha_core::proximity::ProximityIndex;
use brouhaha_infrastructure::{
    BrouhahaPaths, ConfigService, DataLayout, FsBlobStorage, JsonRecordRepository, TomlGeoIndex,
};

/// Stores and settings shared by every command.
pub struct AppContext {
    pub config: ArConfig,
    pub layout: DataLayout,
    pub archive: Arc<SessionArchive>,
}

impl AppContext {
    /// Wires the filesystem backend.
    ///
    /// Falls back to the platform config and data directories when no override
    /// is given.
    pub fn open(data_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self> {
        let config_service = match config_path {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::default_location()
                .context("Failed to locate the config directory")?,
        };
        let config = config_service.load()?;

        let layout = match data_dir {
            Some(dir) => DataLayout::new(dir),
            None => BrouhahaPaths::default_layout().context("Failed to locate the data directory")?,
        };
        tracing::debug!("[Cli] Using data directory {}", layout.root().display());

        let archive = SessionArchive::new(
            Arc::new(FsBlobStorage::new(layout.blobs_dir())),
            Arc::new(JsonRecordRepository::new(layout.records_dir())),
            ProximityIndex::new(Arc::new(TomlGeoIndex::new(layout.geo_index_file()))),
            config.max_map_bytes,
        );

        Ok(Self {
            config,
            layout,
            archive: Arc::new(archive),
        })
    }
}
