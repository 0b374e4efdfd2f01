//! Recipient store: one YAML document per recipient.

use std::fs;
use std::path::PathBuf;

use feedcast_models::{Identity, Recipient};
use tracing::{debug, warn};

use crate::atomic::{atomic_write_yaml, read_yaml, read_yaml_optional};
use crate::error::{PersistenceError, Result};
use crate::DOCUMENT_EXT;

/// Manages persistence of recipients.
///
/// The directory listing is the index; file names are the recipient ids:
/// ```text
/// base_path/
/// └── users/
///     ├── 42.yml
///     └── 1337.yml
/// ```
///
/// Writes to the same id are not coordinated; the last writer wins.
#[derive(Debug, Clone)]
pub struct RecipientStore {
    base_path: PathBuf,
}

impl RecipientStore {
    /// Creates a new RecipientStore rooted at the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Returns the path to the users directory.
    pub fn users_dir(&self) -> PathBuf {
        self.base_path.join("users")
    }

    /// Returns the path to a specific recipient file.
    pub fn recipient_path(&self, id: i64) -> PathBuf {
        self.users_dir().join(format!("{}.{}", id, DOCUMENT_EXT))
    }

    /// Ensures the users directory exists.
    pub fn ensure_dirs(&self) -> Result<()> {
        let dir = self.users_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| PersistenceError::DirectoryError {
                path: dir,
                source,
            })?;
        }
        Ok(())
    }

    /// Loads a recipient, returning None if no record exists.
    pub fn get(&self, id: i64) -> Result<Option<Recipient>> {
        read_yaml_optional(&self.recipient_path(id))
    }

    /// Returns the stored recipient, creating and persisting it on first use.
    ///
    /// An existing record gets its identity snapshot refreshed when the
    /// platform reports different names.
    pub fn get_or_create(&self, identity: &Identity) -> Result<Recipient> {
        match self.get(identity.id)? {
            Some(mut recipient) => {
                if recipient.info != *identity {
                    debug!(id = identity.id, "Refreshing recipient identity");
                    recipient.info = identity.clone();
                    self.save(&recipient)?;
                }
                Ok(recipient)
            }
            None => {
                let recipient = Recipient::new(identity.clone());
                self.save(&recipient)?;
                debug!(id = identity.id, name = %recipient.name(), "Created recipient");
                Ok(recipient)
            }
        }
    }

    /// Saves a recipient, replacing the whole document.
    pub fn save(&self, recipient: &Recipient) -> Result<()> {
        self.ensure_dirs()?;
        atomic_write_yaml(&self.recipient_path(recipient.id()), recipient)
    }

    /// Lists all recipients, sorted by id.
    ///
    /// Documents that fail to load are skipped with a warning.
    pub fn list(&self) -> Result<Vec<Recipient>> {
        let dir = self.users_dir();
        let entries = fs::read_dir(&dir).map_err(|source| PersistenceError::ReadError {
            path: dir.clone(),
            source,
        })?;

        let mut recipients = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PersistenceError::ReadError {
                path: dir.clone(),
                source,
            })?;

            let path = entry.path();
            if path.is_dir() || !path.extension().is_some_and(|ext| ext == DOCUMENT_EXT) {
                continue;
            }
            match read_yaml::<Recipient>(&path) {
                Ok(recipient) => recipients.push(recipient),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable recipient");
                }
            }
        }

        recipients.sort_by_key(Recipient::id);
        Ok(recipients)
    }

    /// Deletes a recipient. Deleting an absent recipient succeeds.
    pub fn delete(&self, id: i64) -> Result<()> {
        let path = self.recipient_path(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::WriteError { path, source }),
        }
    }

    /// Excludes a category for the recipient and persists the change.
    ///
    /// On a save failure the in-memory recipient is left unchanged.
    pub fn exclude(&self, recipient: &mut Recipient, category: &str) -> Result<()> {
        let mut updated = recipient.clone();
        updated.add_exclusion(category)?;
        self.save(&updated)?;
        *recipient = updated;
        Ok(())
    }

    /// Re-includes a category for the recipient and persists the change.
    ///
    /// On a save failure the in-memory recipient is left unchanged.
    pub fn include(&self, recipient: &mut Recipient, category: &str) -> Result<()> {
        let mut updated = recipient.clone();
        updated.remove_exclusion(category)?;
        self.save(&updated)?;
        *recipient = updated;
        Ok(())
    }
}
