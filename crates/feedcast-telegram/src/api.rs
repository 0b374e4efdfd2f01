//! Bot API adapter.
//!
//! Everything goes through one primitive, [`ChatApi::request`], which posts a
//! JSON payload to a named Bot API method. The network side sits behind the
//! [`Transport`] trait so delivery logic can be exercised without Telegram.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use teloxide::payloads::{DeleteMessage, EditMessageReplyMarkup, SendMessage};
use teloxide::types::{ChatId, InlineKeyboardMarkup, MessageId};
use tracing::{debug, warn};

use crate::error::{Result, TelegramError};

/// Default Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Method used when the caller passes an empty method name.
pub const METHOD_SEND_MESSAGE: &str = "sendMessage";
pub const METHOD_DELETE_MESSAGE: &str = "deleteMessage";
pub const METHOD_EDIT_REPLY_MARKUP: &str = "editMessageReplyMarkup";

/// Description the platform returns with 403 when the user blocked the bot.
pub const BLOCKED_DESCRIPTION: &str = "Forbidden: bot was blocked by the user";

/// Hook run when the platform reports the recipient blocked the bot.
pub type OnBlocked<'a> = Option<&'a (dyn Fn() + Send + Sync)>;

/// Status and description of a Bot API reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: u16,
    pub description: Option<String>,
}

impl ApiReply {
    /// A successful reply.
    pub fn ok() -> Self {
        Self {
            status: 200,
            description: None,
        }
    }

    /// A failed reply.
    pub fn error(status: u16, description: impl Into<String>) -> Self {
        Self {
            status,
            description: Some(description.into()),
        }
    }

    /// True for the canonical "bot was blocked by the user" reply.
    pub fn is_blocked(&self) -> bool {
        self.status == 403 && self.description.as_deref() == Some(BLOCKED_DESCRIPTION)
    }
}

/// Outcome of a request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The platform accepted the request.
    Sent,
    /// The recipient blocked the bot; the blocked hook has run.
    Blocked,
}

/// Performs raw Bot API calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Posts `payload` to `method` and reports the reply status.
    ///
    /// Only connection-level failures are errors; any HTTP status is a reply.
    async fn call(&self, method: &str, payload: &serde_json::Value) -> Result<ApiReply>;
}

#[derive(Debug, Deserialize)]
struct ReplyBody {
    #[serde(default)]
    description: Option<String>,
}

/// [`Transport`] over HTTPS using `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport for the public Bot API.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_api_url(DEFAULT_API_URL, token)
    }

    /// Creates a transport for a custom Bot API server.
    pub fn with_api_url(api_url: &str, token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(TelegramError::NoToken);
        }
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, method: &str, payload: &serde_json::Value) -> Result<ApiReply> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let description = response
            .json::<ReplyBody>()
            .await
            .ok()
            .and_then(|body| body.description);

        Ok(ApiReply {
            status,
            description,
        })
    }
}

/// Bot API adapter used by the dispatcher and the fan-out.
#[derive(Clone)]
pub struct ChatApi {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ChatApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatApi").finish_non_exhaustive()
    }
}

impl ChatApi {
    /// Creates an adapter over the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Creates an adapter talking to the public Bot API.
    pub fn http(token: &str) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(token)?)))
    }

    /// Calls `method` (or `sendMessage` when empty) with `payload`.
    ///
    /// A 403 "blocked" reply runs `on_blocked` and yields
    /// [`Delivery::Blocked`]; every other non-200 reply is an error.
    pub async fn request<P>(
        &self,
        method: &str,
        payload: &P,
        on_blocked: OnBlocked<'_>,
    ) -> Result<Delivery>
    where
        P: Serialize + Sync + ?Sized,
    {
        let method = if method.is_empty() {
            METHOD_SEND_MESSAGE
        } else {
            method
        };
        let payload = serde_json::to_value(payload)?;

        let reply = self.transport.call(method, &payload).await?;
        if reply.status == 200 {
            return Ok(Delivery::Sent);
        }

        if reply.is_blocked() {
            debug!(method, "Recipient blocked the bot");
            if let Some(hook) = on_blocked {
                hook();
            }
            return Ok(Delivery::Blocked);
        }

        let description = reply.description.unwrap_or_default();
        warn!(
            method,
            status = reply.status,
            description = %description,
            payload = %payload,
            "Bot API request failed"
        );
        Err(TelegramError::Api {
            method: method.to_string(),
            status: reply.status,
            description,
        })
    }

    /// Sends a plain text message.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        on_blocked: OnBlocked<'_>,
    ) -> Result<Delivery> {
        let payload = SendMessage::new(ChatId(chat_id), text);
        self.request(METHOD_SEND_MESSAGE, &payload, on_blocked).await
    }

    /// Sends a message with an inline keyboard.
    pub async fn send_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<Delivery> {
        let mut payload = SendMessage::new(ChatId(chat_id), text);
        payload.reply_markup = Some(keyboard.into());
        self.request(METHOD_SEND_MESSAGE, &payload, None).await
    }

    /// Deletes a message.
    pub async fn delete_message(&self, chat_id: i64, message_id: MessageId) -> Result<Delivery> {
        let payload = DeleteMessage::new(ChatId(chat_id), message_id);
        self.request(METHOD_DELETE_MESSAGE, &payload, None).await
    }

    /// Replaces the inline keyboard of a message, leaving its text alone.
    pub async fn edit_reply_markup(
        &self,
        chat_id: i64,
        message_id: MessageId,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<Delivery> {
        let mut payload = EditMessageReplyMarkup::new(ChatId(chat_id), message_id);
        payload.reply_markup = Some(keyboard);
        self.request(METHOD_EDIT_REPLY_MARKUP, &payload, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn api() -> (Arc<RecordingTransport>, ChatApi) {
        let transport = Arc::new(RecordingTransport::new());
        let api = ChatApi::new(transport.clone());
        (transport, api)
    }

    #[tokio::test]
    async fn test_empty_method_defaults_to_send_message() {
        let (transport, api) = api();
        let payload = SendMessage::new(ChatId(1), "hi");

        let delivery = api.request("", &payload, None).await.unwrap();

        assert_eq!(delivery, Delivery::Sent);
        let call = &transport.calls()[0];
        assert_eq!(call.method, METHOD_SEND_MESSAGE);
        assert_eq!(call.payload["chat_id"], 1);
        assert!(call.payload.get("reply_markup").is_none());
    }

    #[tokio::test]
    async fn test_explicit_method_is_honoured() {
        let (transport, api) = api();
        api.delete_message(1, MessageId(5)).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].method, METHOD_DELETE_MESSAGE);
        assert_eq!(calls[0].payload["message_id"], 5);
    }

    #[tokio::test]
    async fn test_blocked_runs_hook() {
        let (transport, api) = api();
        transport.block_chat(42);
        let hits = AtomicUsize::new(0);
        let hook = || {
            hits.fetch_add(1, Ordering::SeqCst);
        };

        let delivery = api.send_message(42, "hello", Some(&hook)).await.unwrap();

        assert_eq!(delivery, Delivery::Blocked);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blocked_without_hook() {
        let (transport, api) = api();
        transport.block_chat(42);

        let delivery = api.send_message(42, "hello", None).await.unwrap();
        assert_eq!(delivery, Delivery::Blocked);
    }

    #[tokio::test]
    async fn test_other_403_is_error_and_skips_hook() {
        let (transport, api) = api();
        transport.respond_to(
            METHOD_SEND_MESSAGE,
            ApiReply::error(403, "Forbidden: user is deactivated"),
        );
        let hits = AtomicUsize::new(0);
        let hook = || {
            hits.fetch_add(1, Ordering::SeqCst);
        };

        let err = api.send_message(42, "hello", Some(&hook)).await.unwrap_err();

        assert!(matches!(err, TelegramError::Api { status: 403, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_200_is_error() {
        let (transport, api) = api();
        transport.respond_to(
            METHOD_EDIT_REPLY_MARKUP,
            ApiReply::error(400, "Bad Request: message is not modified"),
        );

        let err = api
            .edit_reply_markup(1, MessageId(2), InlineKeyboardMarkup::default())
            .await
            .unwrap_err();

        match err {
            TelegramError::Api { method, status, description } => {
                assert_eq!(method, METHOD_EDIT_REPLY_MARKUP);
                assert_eq!(status, 400);
                assert!(description.contains("not modified"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_keyboard_payload_shape() {
        use teloxide::types::InlineKeyboardButton;

        let (transport, api) = api();
        let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
            "🔶 Sport",
            "exclude|Sport",
        )]]);
        api.send_keyboard(42, "Категории:", keyboard).await.unwrap();

        let payload = &transport.calls()[0].payload;
        assert_eq!(payload["chat_id"], 42);
        assert_eq!(payload["text"], "Категории:");
        assert_eq!(payload["reply_markup"]["inline_keyboard"][0][0]["text"], "🔶 Sport");
        assert_eq!(
            payload["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
            "exclude|Sport"
        );
    }

    #[tokio::test]
    async fn test_edit_payload_carries_only_markup() {
        let (transport, api) = api();
        api.edit_reply_markup(42, MessageId(6), InlineKeyboardMarkup::default())
            .await
            .unwrap();

        let payload = &transport.calls_to(METHOD_EDIT_REPLY_MARKUP)[0].payload;
        assert_eq!(payload["chat_id"], 42);
        assert_eq!(payload["message_id"], 6);
        assert!(payload.get("text").is_none());
        assert!(payload["reply_markup"]["inline_keyboard"].is_array());
    }

    #[test]
    fn test_http_transport_requires_token() {
        assert!(matches!(HttpTransport::new(""), Err(TelegramError::NoToken)));
    }
}
