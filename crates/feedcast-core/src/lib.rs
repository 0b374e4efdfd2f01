//! Feedcast Core - configuration and metrics shared by the relay services.
//!
//! - **config**: the YAML configuration document and its hot-reloading holder
//! - **metrics**: relay counters kept in a Prometheus registry

pub mod config;
pub mod error;
pub mod metrics;

pub use config::{Config, ConfigHolder, TelegramConfig, DEFAULT_START_MESSAGE, RELOAD_INTERVAL};
pub use error::{ConfigError, Result};
pub use metrics::Metrics;
