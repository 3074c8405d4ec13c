//! Path management for brouhaha configuration and session data.
//!
//! Platform directories are resolved through `AppPaths` from the
//! version-migrate crate.

use std::path::{Path, PathBuf};
use version_migrate::AppPaths;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Platform directories for brouhaha.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/brouhaha/          # Config directory
/// └── config.toml              # AR session configuration
///
/// ~/.local/share/brouhaha/     # Data directory (see DataLayout)
/// ├── blobs/                   # Preview images and world maps
/// ├── records/                 # Archived session records
/// └── geo_index.toml           # Geofence index
/// ```
pub struct BrouhahaPaths;

impl BrouhahaPaths {
    fn app_paths() -> AppPaths {
        AppPaths::new("brouhaha")
    }

    /// Returns the brouhaha configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        Self::app_paths()
            .config_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    /// Returns the brouhaha data directory.
    pub fn data_dir() -> Result<PathBuf, PathError> {
        Self::app_paths()
            .data_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Data layout rooted at the platform data directory.
    pub fn default_layout() -> Result<DataLayout, PathError> {
        Ok(DataLayout::new(Self::data_dir()?))
    }
}

/// Locations of the stores under one data root.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn blobs_dir(&self) -> PathBuf {
        self.root.join("blobs")
    }

    pub fn records_dir(&self) -> PathBuf {
        self.root.join("records")
    }

    pub fn geo_index_file(&self) -> PathBuf {
        self.root.join("geo_index.toml")
    }
}

/// Maps a storage key to a relative path that stays inside its store.
///
/// `/` separates directories; every other character outside
/// `[A-Za-z0-9._-]` becomes `_`. Empty, `.` and `..` segments are dropped.
pub fn key_to_relative_path(key: &str) -> PathBuf {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .map(|segment| {
            segment
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                        c
                    } else {
                        '_'
                    }
                })
                .collect::<String>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_layout() {
        let layout = DataLayout::new("/tmp/brouhaha");
        assert!(layout.blobs_dir().ends_with("blobs"));
        assert!(layout.records_dir().starts_with(layout.root()));
        assert!(layout.geo_index_file().ends_with("geo_index.toml"));
    }

    #[test]
    fn test_key_to_relative_path_sanitizes() {
        let path = key_to_relative_path("maps/2019-03-02 09:05:01.000.worldmap");
        assert_eq!(path, PathBuf::from("maps/2019-03-02_09_05_01.000.worldmap"));
    }

    #[test]
    fn test_key_to_relative_path_drops_traversal() {
        let path = key_to_relative_path("../../etc/passwd");
        assert_eq!(path, PathBuf::from("etc/passwd"));
    }
}
