//! Error types for the Telegram side of the relay.

use feedcast_persistence::PersistenceError;
use thiserror::Error;

/// Errors that can occur while talking to the Bot API or handling updates.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Bot token not provided.
    #[error("Telegram bot token not set. Set telegram.token in the config file.")]
    NoToken,

    /// Identity query failed at startup.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// Webhook registration failed.
    #[error("Failed to register webhook: {0}")]
    WebhookFailed(String),

    /// The platform answered with a non-200 status.
    #[error("{method} failed with status {status}: {description}")]
    Api {
        method: String,
        status: u16,
        description: String,
    },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Recipient or feed state persistence failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;

impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        TelegramError::HttpError(e.to_string())
    }
}
