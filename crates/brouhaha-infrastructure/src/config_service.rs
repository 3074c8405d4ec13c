//! Loading of `config.toml`.

use std::path::{Path, PathBuf};

use brouhaha_core::ArError;
use brouhaha_core::config::ArConfig;
use brouhaha_core::error::Result;

use crate::paths::BrouhahaPaths;
use crate::storage::AtomicTomlFile;

/// Reads and writes the AR configuration file.
pub struct ConfigService {
    file: AtomicTomlFile<ArConfig>,
}

impl ConfigService {
    /// Config service for the platform config file.
    pub fn default_location() -> Result<Self> {
        let path = BrouhahaPaths::config_file().map_err(|e| ArError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads the configuration, falling back to defaults when the file is
    /// missing or empty. Keys absent from the file take their default value.
    pub fn load(&self) -> Result<ArConfig> {
        let config = self
            .file
            .load()
            .map_err(|e| {
                ArError::config(format!("Failed to load {}: {}", self.path().display(), e))
            })?
            .unwrap_or_default();

        if config.search_radius_miles <= 0.0 || !config.search_radius_miles.is_finite() {
            return Err(ArError::config(format!(
                "search_radius_miles must be positive, got {}",
                config.search_radius_miles
            )));
        }
        if config.width_divisor <= 0.0 {
            return Err(ArError::config("width_divisor must be positive"));
        }

        tracing::debug!("[ConfigService] Loaded config from {}", self.path().display());
        Ok(config)
    }

    pub fn save(&self, config: &ArConfig) -> Result<()> {
        self.file.save(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        assert_eq!(service.load().unwrap(), ArConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        let config = ArConfig {
            search_radius_miles: 0.25,
            ..ArConfig::default()
        };
        service.save(&config).unwrap();

        assert_eq!(service.load().unwrap(), config);
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "search_radius_miles = 0.0\n").unwrap();

        let err = ConfigService::with_path(path).load().unwrap_err();
        assert!(matches!(err, ArError::Config(_)));
    }
}
