//! Update dispatcher: bot commands and keyboard callbacks.

use feedcast_core::metrics::{
    ACTION_EXCLUDE, ACTION_GET_USER, ACTION_INCLUDE, ACTION_TELEGRAM_REQUEST,
};
use feedcast_models::Identity;
use teloxide::types::{CallbackQuery, ChatId, Message, Update, UpdateKind, User};
use tracing::{debug, info, warn};

use crate::keyboard::{categories_keyboard, CategoryAction};
use crate::state::RelayState;

/// Title of the category keyboard message.
pub const CATEGORIES_TITLE: &str = "Категории:";

/// Reply sent when `/categories` cannot load the recipient.
pub const CATEGORIES_ERROR: &str = "Извините, произошла ошибка.";

/// Bot commands. Only exact matches are recognised; other text is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Categories,
}

impl Command {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "/start" => Some(Self::Start),
            "/categories" => Some(Self::Categories),
            _ => None,
        }
    }
}

/// Recipient identity of a platform user.
pub fn identity_of(user: &User) -> Identity {
    Identity {
        id: ChatId::from(user.id).0,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    }
}

/// Routes one update.
pub async fn handle_update(state: &RelayState, update: &Update) {
    match &update.kind {
        UpdateKind::Message(message) => handle_message(state, message).await,
        UpdateKind::CallbackQuery(query) => handle_callback(state, query).await,
        _ => debug!(update_id = update.id.0, "Ignoring update"),
    }
}

/// Handles a chat message.
pub async fn handle_message(state: &RelayState, message: &Message) {
    let Some(command) = message.text().and_then(Command::parse) else {
        return;
    };
    let Some(from) = &message.from else {
        debug!(chat_id = %message.chat.id, "Command without sender, ignoring");
        return;
    };
    let identity = identity_of(from);

    match command {
        Command::Start => handle_start(state, message, &identity).await,
        Command::Categories => handle_categories(state, message, &identity).await,
    }
}

async fn delete_command(state: &RelayState, message: &Message) {
    if let Err(e) = state
        .chat()
        .delete_message(message.chat.id.0, message.id)
        .await
    {
        warn!(chat_id = %message.chat.id, error = %e, "Failed to delete command message");
        state.metrics().inc_error(ACTION_TELEGRAM_REQUEST);
    }
}

/// `/start`: registers the sender and replies with the start message.
pub async fn handle_start(state: &RelayState, message: &Message, identity: &Identity) {
    delete_command(state, message).await;

    let mut reply = state.config().start_message().await;
    match state.recipients().get_or_create(identity) {
        Ok(recipient) => info!(recipient = %recipient.name(), "Recipient started the bot"),
        Err(e) => {
            warn!(chat_id = identity.id, error = %e, "Failed to register recipient");
            state.metrics().inc_error(ACTION_GET_USER);
            reply.push_str(&format!("\n\nОшибка: {}", e));
        }
    }

    if let Err(e) = state.chat().send_message(identity.id, &reply, None).await {
        warn!(chat_id = identity.id, error = %e, "Failed to send start reply");
        state.metrics().inc_error(ACTION_TELEGRAM_REQUEST);
    }
}

/// `/categories`: sends the category toggle keyboard.
pub async fn handle_categories(state: &RelayState, message: &Message, identity: &Identity) {
    let recipient = match state.recipients().get_or_create(identity) {
        Ok(recipient) => recipient,
        Err(e) => {
            warn!(chat_id = identity.id, error = %e, "Failed to load recipient");
            state.metrics().inc_error(ACTION_GET_USER);
            let reply = state.chat().send_message(identity.id, CATEGORIES_ERROR, None);
            if let Err(e) = reply.await {
                warn!(chat_id = identity.id, error = %e, "Failed to send error reply");
            }
            return;
        }
    };

    delete_command(state, message).await;

    let keyboard = categories_keyboard(&recipient, &state.categories().await);
    if let Err(e) = state
        .chat()
        .send_keyboard(message.chat.id.0, CATEGORIES_TITLE, keyboard)
        .await
    {
        warn!(chat_id = %message.chat.id, error = %e, "Failed to send categories keyboard");
        state.metrics().inc_error(ACTION_TELEGRAM_REQUEST);
    }
}

/// Handles a category button press.
pub async fn handle_callback(state: &RelayState, query: &CallbackQuery) {
    let Some(message) = &query.message else {
        debug!(query_id = %query.id, "Callback without message, ignoring");
        return;
    };
    let chat_id = message.chat().id.0;

    let Some(action) = query.data.as_deref().and_then(CategoryAction::parse) else {
        warn!(chat_id, data = ?query.data, "Unrecognised callback data");
        return;
    };

    let mut recipient = match state.recipients().get(chat_id) {
        Ok(Some(recipient)) => recipient,
        Ok(None) => {
            warn!(chat_id, "Callback from unknown recipient");
            state.metrics().inc_error(ACTION_GET_USER);
            return;
        }
        Err(e) => {
            warn!(chat_id, error = %e, "Failed to load recipient");
            state.metrics().inc_error(ACTION_GET_USER);
            return;
        }
    };

    let sender = identity_of(&query.from);
    if sender.id == recipient.id() {
        recipient.info = sender;
    }

    let (result, action_label) = match &action {
        CategoryAction::Include(category) => (
            state.recipients().include(&mut recipient, category),
            ACTION_INCLUDE,
        ),
        CategoryAction::Exclude(category) => (
            state.recipients().exclude(&mut recipient, category),
            ACTION_EXCLUDE,
        ),
    };
    if let Err(e) = result {
        if e.is_exclusion() {
            info!(
                recipient = %recipient.name(),
                category = action.category(),
                reason = %e,
                "Category toggle rejected"
            );
        } else {
            warn!(
                recipient = %recipient.name(),
                category = action.category(),
                error = %e,
                "Failed to store category toggle"
            );
        }
        state.metrics().inc_error(action_label);
        return;
    }
    debug!(recipient = %recipient.name(), action = ?action, "Category toggled");

    let keyboard = categories_keyboard(&recipient, &state.categories().await);
    if let Err(e) = state
        .chat()
        .edit_reply_markup(chat_id, message.id(), keyboard)
        .await
    {
        warn!(chat_id, error = %e, "Failed to refresh categories keyboard");
        state.metrics().inc_error(ACTION_TELEGRAM_REQUEST);
    }
}
