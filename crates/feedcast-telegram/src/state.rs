//! Shared services context for the relay.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use feedcast_core::metrics::ACTION_REMOVE_USER;
use feedcast_core::{ConfigHolder, Metrics};
use feedcast_models::FeedState;
use feedcast_persistence::{FeedStateStore, RecipientStore};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::ChatApi;
use crate::error::Result;

/// Pause between two sends of one fan-out.
pub const SEND_DELAY: Duration = Duration::from_millis(100);

/// Services shared by the dispatcher and the ingestion pipeline.
///
/// Built once at startup and handed to every handler behind an `Arc`.
#[derive(Debug)]
pub struct RelayState {
    config: Arc<ConfigHolder>,
    metrics: Arc<Metrics>,
    recipients: RecipientStore,
    feed_store: FeedStateStore,
    /// In-memory copy of `state.yml`; written through on every change.
    feed: RwLock<FeedState>,
    chat: ChatApi,
    send_delay: Duration,
}

impl RelayState {
    /// Builds the context, loading the feed state from disk.
    pub fn new(
        config: Arc<ConfigHolder>,
        metrics: Arc<Metrics>,
        recipients: RecipientStore,
        feed_store: FeedStateStore,
        chat: ChatApi,
    ) -> Result<Self> {
        let feed = feed_store.load()?;
        debug!(
            last_date = %feed.last_date,
            categories = feed.categories.len(),
            "Loaded feed state"
        );

        Ok(Self {
            config,
            metrics,
            recipients,
            feed_store,
            feed: RwLock::new(feed),
            chat,
            send_delay: SEND_DELAY,
        })
    }

    /// Overrides the inter-send pause.
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    pub fn config(&self) -> &ConfigHolder {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn recipients(&self) -> &RecipientStore {
        &self.recipients
    }

    pub fn chat(&self) -> &ChatApi {
        &self.chat
    }

    pub fn send_delay(&self) -> Duration {
        self.send_delay
    }

    /// Current watermark.
    pub async fn watermark(&self) -> DateTime<Utc> {
        self.feed.read().await.last_date
    }

    /// Copy of the category registry.
    pub async fn categories(&self) -> Vec<String> {
        self.feed.read().await.categories.clone()
    }

    /// Copy of the whole feed state.
    pub async fn feed_state(&self) -> FeedState {
        self.feed.read().await.clone()
    }

    /// Adds unseen categories to the registry in memory.
    ///
    /// The registry reaches disk with the next [`Self::commit_watermark`].
    pub async fn register_categories(&self, names: &[String]) -> usize {
        let added = self.feed.write().await.add_categories(names);
        if added > 0 {
            debug!(added, "Registered new categories");
        }
        added
    }

    /// Advances the watermark and persists the feed state.
    ///
    /// Nothing is written when `at` is not later than the current watermark.
    pub async fn commit_watermark(&self, at: DateTime<Utc>) -> Result<bool> {
        let mut feed = self.feed.write().await;
        if !feed.advance_watermark(at) {
            return Ok(false);
        }
        self.feed_store.save(&feed)?;
        debug!(last_date = %feed.last_date, "Watermark advanced");
        Ok(true)
    }

    /// Deletes a recipient record, counting failures.
    pub fn remove_recipient(&self, id: i64) {
        match self.recipients.delete(id) {
            Ok(()) => info!(chat_id = id, "Recipient blocked the bot, record removed"),
            Err(e) => {
                warn!(chat_id = id, error = %e, "Failed to remove recipient");
                self.metrics.inc_error(ACTION_REMOVE_USER);
            }
        }
    }
}
