//! Startup error types.

use feedcast_core::ConfigError;
use feedcast_persistence::PersistenceError;
use feedcast_telegram::TelegramError;
use thiserror::Error;

/// Result type for server startup.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Failures that stop the relay from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configuration file could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A bootstrap call to the chat platform failed.
    #[error("telegram error: {0}")]
    Telegram(#[from] TelegramError),

    /// The state directory or feed state could not be prepared.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// The relay counters could not be registered.
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Binding or serving the listen address failed.
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
