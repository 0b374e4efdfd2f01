//! Relay startup sequence.

use std::path::Path;
use std::sync::Arc;

use feedcast_core::{ConfigHolder, Metrics};
use feedcast_persistence::{FeedStateStore, RecipientStore};
use feedcast_telegram::{ChatApi, RelayState, TelegramBot};
use tracing::info;

use crate::error::Result;
use crate::router::serve;
use crate::state::AppState;

/// Loads the configuration, registers with the chat platform, prepares the
/// state directory and serves until shutdown.
pub async fn run(config_path: &Path) -> Result<()> {
    let config = Arc::new(ConfigHolder::load(config_path)?);
    let _watcher = config.spawn_watcher();
    let snapshot = config.snapshot().await;
    info!(path = %config_path.display(), "Config loaded");

    let bot = TelegramBot::new(&snapshot.telegram.token)?;
    let username = bot.get_me().await?;
    info!(bot = %username, "Authorized on account");
    bot.set_webhook(&snapshot.telegram.webhook).await?;

    let recipients = RecipientStore::new(&snapshot.base_dir);
    recipients.ensure_dirs()?;
    let feed_store = FeedStateStore::new(&snapshot.base_dir);

    let relay = RelayState::new(
        config,
        Arc::new(Metrics::new()?),
        recipients,
        feed_store,
        ChatApi::http(&snapshot.telegram.token)?,
    )?;

    serve(&snapshot.listen_addr(), AppState::new(relay)).await?;
    Ok(())
}
