//! Feed state store: the singleton `state.yml` document.

use std::path::{Path, PathBuf};

use feedcast_models::FeedState;

use crate::atomic::{atomic_write_yaml, read_yaml_optional};
use crate::error::Result;
use crate::DOCUMENT_EXT;

/// Manages persistence of the [`FeedState`] singleton.
#[derive(Debug, Clone)]
pub struct FeedStateStore {
    path: PathBuf,
}

impl FeedStateStore {
    /// Creates a store for `<base_path>/state.yml`.
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            path: base_path
                .as_ref()
                .join(format!("state.{}", DOCUMENT_EXT)),
        }
    }

    /// Returns the document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the state; a missing document yields an empty state.
    pub fn load(&self) -> Result<FeedState> {
        Ok(read_yaml_optional(&self.path)?.unwrap_or_default())
    }

    /// Writes the state atomically.
    pub fn save(&self, state: &FeedState) -> Result<()> {
        atomic_write_yaml(&self.path, state)
    }
}
