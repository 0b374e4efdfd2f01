//! Error types for persistence operations.

use std::path::PathBuf;

use feedcast_models::ExclusionError;
use thiserror::Error;

/// Errors that can occur during persistence operations.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to read from file system.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to file system.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize or deserialize a YAML document.
    #[error("failed to serialize: {0}")]
    SerializeError(#[from] serde_yaml::Error),

    /// Failed to create directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Exclusion set rejected the change.
    #[error(transparent)]
    Exclusion(#[from] ExclusionError),
}

impl PersistenceError {
    /// True when the error is the exclusion set refusing a no-op change.
    pub fn is_exclusion(&self) -> bool {
        matches!(self, PersistenceError::Exclusion(_))
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
