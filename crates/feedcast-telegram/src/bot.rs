//! Startup bootstrap against the Bot API.

use teloxide::prelude::*;
use tracing::info;
use url::Url;

use crate::error::{Result, TelegramError};

/// Performs the one-off calls made before the relay starts serving.
#[derive(Debug, Clone)]
pub struct TelegramBot {
    bot: Bot,
}

impl TelegramBot {
    /// Creates a bot for the given token.
    pub fn new(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(TelegramError::NoToken);
        }
        Ok(Self {
            bot: Bot::new(token),
        })
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// Points the platform's update delivery at `webhook`.
    pub async fn set_webhook(&self, webhook: &str) -> Result<()> {
        let url = parse_webhook(webhook)?;
        self.bot
            .set_webhook(url.clone())
            .await
            .map_err(|e| TelegramError::WebhookFailed(e.to_string()))?;
        info!(url = %url, "Webhook registered");
        Ok(())
    }
}

fn parse_webhook(webhook: &str) -> Result<Url> {
    Url::parse(webhook).map_err(|e| TelegramError::WebhookFailed(format!("{}: {}", webhook, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_token() {
        assert!(matches!(TelegramBot::new(""), Err(TelegramError::NoToken)));
        assert!(TelegramBot::new("123:abc").is_ok());
    }

    #[test]
    fn test_parse_webhook() {
        assert!(parse_webhook("https://bot.example.com/").is_ok());
        assert!(matches!(
            parse_webhook("not a url"),
            Err(TelegramError::WebhookFailed(_))
        ));
    }
}
