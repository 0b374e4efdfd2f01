//! Chat platform webhook handler.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use feedcast_core::metrics::ACTION_TELEGRAM_HANDLER;
use feedcast_telegram::handle_update;
use teloxide::types::Update;
use tracing::{debug, warn};

use crate::state::AppState;

/// POST / - Receives platform updates.
///
/// Routing happens in a background task after the update is acknowledged.
pub async fn webhook(
    method: Method,
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> StatusCode {
    if method != Method::POST {
        return StatusCode::BAD_REQUEST;
    }

    let body = match body {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Failed to read update body");
            state.relay.metrics().inc_error(ACTION_TELEGRAM_HANDLER);
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    let update = match serde_json::from_slice::<Update>(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(
                error = %e,
                body = %String::from_utf8_lossy(&body),
                "Failed to decode update"
            );
            state.relay.metrics().inc_error(ACTION_TELEGRAM_HANDLER);
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    debug!(update_id = update.id.0, "Update received");
    let relay = state.relay.clone();
    tokio::spawn(async move {
        handle_update(&relay, &update).await;
    });

    StatusCode::OK
}
