//! Error types for the Brouhaha AR session core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the AR session workspace.
///
/// Variants follow the failure taxonomy of the session flow: capture,
/// proximity lookup, persistence and fetch. Infrastructure-level failures
/// (I/O, serialization) convert automatically via `From`.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ArError {
    /// No active tracking session, or the spatial map could not be exported
    #[error("Capture error: {0}")]
    Capture(String),

    /// The geofence index could not be queried
    #[error("Proximity index unavailable: {0}")]
    IndexUnavailable(String),

    /// Upload or record write failed during a save
    #[error("Persist error: {0}")]
    Persist(String),

    /// Map download failed
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Map artifact exceeded the download size bound
    #[error("Fetch error: artifact is {size} bytes, limit is {limit} bytes")]
    FetchTooLarge { size: u64, limit: u64 },

    /// A save is already running for this archive
    #[error("A save is already in progress")]
    SaveInProgress,

    /// Object appended while no stroke batch was open
    #[error("No stroke batch is open")]
    NoOpenBatch,

    /// A named entity does not exist
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Filesystem failure
    #[error("IO error: {message}")]
    Io { message: String },

    /// Malformed or unmigratable stored data
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Invalid `config.toml`
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invariant violation or a failed background task
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ArError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Capture error
    pub fn capture(message: impl Into<String>) -> Self {
        Self::Capture(message.into())
    }

    /// Creates an IndexUnavailable error
    pub fn index_unavailable(message: impl Into<String>) -> Self {
        Self::IndexUnavailable(message.into())
    }

    /// Creates a Persist error
    pub fn persist(message: impl Into<String>) -> Self {
        Self::Persist(message.into())
    }

    /// Creates a Fetch error
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a capture error
    pub fn is_capture(&self) -> bool {
        matches!(self, Self::Capture(_))
    }

    /// Check if this is a proximity index failure
    pub fn is_index_unavailable(&self) -> bool {
        matches!(self, Self::IndexUnavailable(_))
    }

    /// Check if this is a persist error
    pub fn is_persist(&self) -> bool {
        matches!(self, Self::Persist(_))
    }

    /// Check if this is any kind of fetch failure, including the size bound
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::FetchTooLarge { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Re-labels a lower-level failure as a persist error.
    ///
    /// Used by the save flow so every failure after capture is reported
    /// under a single category.
    pub fn into_persist(self) -> Self {
        match self {
            Self::Persist(_) | Self::SaveInProgress => self,
            other => Self::Persist(other.to_string()),
        }
    }

    /// Re-labels a lower-level failure as a fetch error.
    pub fn into_fetch(self) -> Self {
        match self {
            Self::Fetch(_) | Self::FetchTooLarge { .. } => self,
            other => Self::Fetch(other.to_string()),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ArError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ArError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ArError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ArError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<version_migrate::MigrationError> for ArError {
    fn from(err: version_migrate::MigrationError) -> Self {
        use version_migrate::MigrationError;

        match err {
            MigrationError::EntityNotFound(id) => Self::not_found("entity", id),
            MigrationError::IoError { .. } => Self::Io {
                message: err.to_string(),
            },
            _ => Self::Serialization {
                format: "migration".to_string(),
                message: err.to_string(),
            },
        }
    }
}

/// A type alias for `Result<T, ArError>`.
pub type Result<T> = std::result::Result<T, ArError>;
