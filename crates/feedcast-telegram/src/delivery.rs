//! Feed ingestion and fan-out.
//!
//! An ingested feed is reduced to the items published after the watermark,
//! delivered oldest first to every recipient that has not excluded one of
//! the item's categories, and the watermark is moved to the newest item
//! once the whole feed has been dispatched.

use chrono::{DateTime, Utc};
use feedcast_core::metrics::{
    ACTION_GET_ITEM_DATE, ACTION_GET_USERS, ACTION_SAVE_STATE, ACTION_TELEGRAM_REQUEST,
};
use feedcast_models::{expand_categories, FeedItem};
use tracing::{debug, info, warn};

use crate::api::Delivery;
use crate::state::RelayState;

/// A dated item selected for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub title: String,
    pub link: String,
    pub published: DateTime<Utc>,
    /// Expanded category names.
    pub categories: Vec<String>,
}

/// Items selected from one feed.
#[derive(Debug, Default)]
pub struct Selection {
    /// New items, oldest first.
    pub items: Vec<NewItem>,
    /// Newest publication time among `items`.
    pub latest: Option<DateTime<Utc>>,
    /// Titles of items without a publication time.
    pub undated: Vec<String>,
}

/// Picks the items published strictly after `watermark`, oldest first.
///
/// Items sharing a publication time keep their feed order.
pub fn select_new_items(items: Vec<FeedItem>, watermark: DateTime<Utc>) -> Selection {
    let mut selection = Selection::default();

    for item in items {
        let Some(published) = item.published else {
            selection.undated.push(item.title);
            continue;
        };
        if published <= watermark {
            continue;
        }

        selection.latest = selection.latest.max(Some(published));
        selection.items.push(NewItem {
            categories: expand_categories(&item.categories),
            title: item.title,
            link: item.link,
            published,
        });
    }

    selection.items.sort_by_key(|item| item.published);
    selection
}

/// Message body sent for an item.
pub fn render_message(item: &NewItem) -> String {
    format!(
        "[{}]\n{}\n\n{}",
        item.categories.join(" "),
        item.title,
        item.link
    )
}

/// Outcome of one fan-out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanOutReport {
    pub sent: usize,
    pub skipped: usize,
    pub blocked: usize,
    pub failed: usize,
}

/// Outcome of one ingestion.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub new_items: usize,
    pub undated: usize,
    pub deliveries: FanOutReport,
    pub watermark: Option<DateTime<Utc>>,
}

/// Delivers one item to every recipient that has not excluded it.
pub async fn fan_out(state: &RelayState, item: &NewItem) -> FanOutReport {
    let mut report = FanOutReport::default();

    let recipients = match state.recipients().list() {
        Ok(recipients) => recipients,
        Err(e) => {
            warn!(error = %e, "Failed to list recipients");
            state.metrics().inc_error(ACTION_GET_USERS);
            return report;
        }
    };

    let text = render_message(item);
    for recipient in recipients {
        if recipient.is_excluded(&item.categories) {
            debug!(recipient = %recipient.name(), title = %item.title, "Skipping excluded item");
            report.skipped += 1;
            continue;
        }

        debug!(recipient = %recipient.name(), title = %item.title, "Sending item");
        state.metrics().inc_send(recipient.username());

        let id = recipient.id();
        let on_blocked = move || state.remove_recipient(id);
        match state.chat().send_message(id, &text, Some(&on_blocked)).await {
            Ok(Delivery::Sent) => report.sent += 1,
            Ok(Delivery::Blocked) => report.blocked += 1,
            Err(e) => {
                warn!(chat_id = id, error = %e, "Failed to deliver item");
                state.metrics().inc_error(ACTION_TELEGRAM_REQUEST);
                report.failed += 1;
            }
        }

        if !state.send_delay().is_zero() {
            tokio::time::sleep(state.send_delay()).await;
        }
    }

    report
}

/// Runs the pipeline for one parsed feed.
pub async fn ingest(state: &RelayState, items: Vec<FeedItem>) -> IngestReport {
    let watermark = state.watermark().await;
    debug!(last_date = %watermark, received = items.len(), "Ingesting feed");

    let selection = select_new_items(items, watermark);
    for title in &selection.undated {
        warn!(title = %title, "Item has no publication time, skipping");
        state.metrics().inc_error(ACTION_GET_ITEM_DATE);
    }
    state.metrics().add_new_items(selection.items.len() as u64);

    let mut report = IngestReport {
        new_items: selection.items.len(),
        undated: selection.undated.len(),
        ..IngestReport::default()
    };

    for item in &selection.items {
        debug!(title = %item.title, published = %item.published, "New item");
        state.register_categories(&item.categories).await;

        let delivered = fan_out(state, item).await;
        report.deliveries.sent += delivered.sent;
        report.deliveries.skipped += delivered.skipped;
        report.deliveries.blocked += delivered.blocked;
        report.deliveries.failed += delivered.failed;
    }

    if let Some(latest) = selection.latest {
        match state.commit_watermark(latest).await {
            Ok(true) => report.watermark = Some(latest),
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "Failed to save feed state");
                state.metrics().inc_error(ACTION_SAVE_STATE);
            }
        }
    }

    if report.new_items > 0 {
        info!(
            new_items = report.new_items,
            sent = report.deliveries.sent,
            skipped = report.deliveries.skipped,
            "Feed ingested"
        );
    }
    report
}
