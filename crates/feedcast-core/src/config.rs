//! Relay configuration.
//!
//! The configuration is a YAML document supplied on the command line:
//!
//! ```yaml
//! listen: ":8080"
//! telegram:
//!   token: "123456:ABC"
//!   webhook: "https://bot.example.com/"
//! base_dir: /var/lib/feedcast
//! start_message: "Welcome!"
//! ```
//!
//! [`ConfigHolder`] keeps the parsed snapshot behind an exclusive lock and
//! re-reads the file whenever its modification time advances.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};

/// How often the watcher checks the file's modification time.
pub const RELOAD_INTERVAL: Duration = Duration::from_secs(30);

/// Reply to `/start` when the document does not set one.
pub const DEFAULT_START_MESSAGE: &str = "Бот находится в стадии разработки";

const DEFAULT_LISTEN: &str = ":8080";
const DEFAULT_BASE_DIR: &str = ".";

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BASE_DIR)
}

fn default_start_message() -> String {
    DEFAULT_START_MESSAGE.to_string()
}

/// Chat platform settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token.
    #[serde(default)]
    pub token: String,

    /// Public URL the platform posts updates to.
    #[serde(default)]
    pub webhook: String,
}

/// The configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Listen address; `:port` binds all interfaces.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Chat platform settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Root directory for `state.yml` and `users/`.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Canned reply to `/start`.
    #[serde(default = "default_start_message")]
    pub start_message: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            telegram: TelegramConfig::default(),
            base_dir: default_base_dir(),
            start_message: default_start_message(),
        }
    }
}

impl Config {
    /// Parses a YAML document.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Returns a socket address string suitable for binding.
    ///
    /// `:8080` becomes `0.0.0.0:8080`; anything else is returned as is.
    pub fn listen_addr(&self) -> String {
        if self.listen.starts_with(':') {
            format!("0.0.0.0{}", self.listen)
        } else {
            self.listen.clone()
        }
    }
}

/// Returns the file's modification time, or None if it cannot be read.
fn file_mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn read_config(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_yaml(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug)]
struct Loaded {
    config: Config,
    modified: Option<SystemTime>,
}

/// File-backed configuration with hot reload.
///
/// Readers copy what they need out of [`ConfigHolder::snapshot`]; the lock is
/// never held while the caller works.
#[derive(Debug)]
pub struct ConfigHolder {
    path: PathBuf,
    inner: Mutex<Loaded>,
}

impl ConfigHolder {
    /// Loads the configuration file.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = read_config(&path)?;
        let modified = file_mtime(&path);
        Ok(Self {
            path,
            inner: Mutex::new(Loaded { config, modified }),
        })
    }

    /// Returns the configuration file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a copy of the current configuration.
    pub async fn snapshot(&self) -> Config {
        self.inner.lock().await.config.clone()
    }

    /// Returns the current `/start` reply.
    pub async fn start_message(&self) -> String {
        self.inner.lock().await.config.start_message.clone()
    }

    /// Re-reads the file unconditionally.
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn reload(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        self.reload_locked(&mut inner)
    }

    /// Re-reads the file if its modification time moved past the one seen
    /// at the last load. Returns whether a reload happened.
    pub async fn reload_if_modified(&self) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        let changed = match (file_mtime(&self.path), inner.modified) {
            (Some(current), Some(seen)) => current > seen,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if !changed {
            return Ok(false);
        }

        debug!(path = %self.path.display(), "Config file updated, reloading");
        self.reload_locked(&mut inner)?;
        Ok(true)
    }

    fn reload_locked(&self, inner: &mut Loaded) -> Result<()> {
        let config = read_config(&self.path)?;
        inner.config = config;
        inner.modified = file_mtime(&self.path);
        Ok(())
    }

    /// Writes the current snapshot back to the file.
    pub async fn save(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let yaml = serde_yaml::to_string(&inner.config)?;
        fs::write(&self.path, yaml).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })?;
        inner.modified = file_mtime(&self.path).or_else(|| Some(SystemTime::now()));
        Ok(())
    }

    /// Applies a change to the in-memory snapshot.
    #[cfg(test)]
    async fn update<F>(&self, change: F)
    where
        F: FnOnce(&mut Config),
    {
        let mut inner = self.inner.lock().await;
        change(&mut inner.config);
    }

    /// Spawns the background watcher with the default 30 second cadence.
    pub fn spawn_watcher(self: &Arc<Self>) -> JoinHandle<()> {
        self.spawn_watcher_every(RELOAD_INTERVAL)
    }

    /// Spawns the background watcher with a custom cadence.
    pub fn spawn_watcher_every(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let holder = Arc::clone(self);
        tokio::spawn(async move { watch_loop(holder, period).await })
    }
}

/// Background task polling the file's modification time.
async fn watch_loop(holder: Arc<ConfigHolder>, period: Duration) {
    let mut ticker = interval(period);
    // The first tick completes immediately; the file was just loaded.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match holder.reload_if_modified().await {
            Ok(true) => info!(path = %holder.path.display(), "Config reloaded"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Config reload failed, keeping previous config"),
        }
    }
}
