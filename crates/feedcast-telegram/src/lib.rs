//! Telegram side of the Feedcast relay.
//!
//! This crate turns parsed feeds into chat messages and handles the updates
//! the platform posts back to the webhook.
//!
//! # Features
//!
//! - Fan-out of new feed items to every subscribed recipient
//! - Per-recipient category filtering through an inline keyboard
//! - Automatic removal of recipients that blocked the bot
//!
//! # Commands
//!
//! - `/start` - Register with the relay
//! - `/categories` - Show the category toggle keyboard
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use feedcast_core::{ConfigHolder, Metrics};
//! use feedcast_persistence::{FeedStateStore, RecipientStore};
//! use feedcast_telegram::{ingest, ChatApi, RelayState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(ConfigHolder::load("config.yml")?);
//!     let snapshot = config.snapshot().await;
//!
//!     let state = RelayState::new(
//!         config,
//!         Arc::new(Metrics::new()?),
//!         RecipientStore::new(&snapshot.base_dir),
//!         FeedStateStore::new(&snapshot.base_dir),
//!         ChatApi::http(&snapshot.telegram.token)?,
//!     )?;
//!
//!     let report = ingest(&state, Vec::new()).await;
//!     println!("{} new items", report.new_items);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bot;
pub mod delivery;
pub mod error;
pub mod handlers;
pub mod keyboard;
pub mod state;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use api::{ChatApi, Delivery, HttpTransport, Transport};
pub use bot::TelegramBot;
pub use delivery::{fan_out, ingest, render_message, select_new_items, IngestReport, NewItem};
pub use error::{Result, TelegramError};
pub use handlers::{handle_update, identity_of};
pub use state::{RelayState, SEND_DELAY};
