//! Feed ingestion handler.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use feedcast_core::metrics::ACTION_PARSE_RSS;
use feedcast_telegram::ingest;
use tracing::{debug, warn};

use crate::feed::parse_feed;
use crate::state::AppState;

/// POST /rss - Accepts a feed document and fans its new items out.
///
/// The response is sent as soon as the document parses; delivery runs in a
/// background task.
pub async fn rss(
    method: Method,
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> StatusCode {
    if method != Method::POST {
        return StatusCode::BAD_REQUEST;
    }

    let items = match body
        .map_err(|e| e.to_string())
        .and_then(|body| parse_feed(&body).map_err(|e| e.to_string()))
    {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Failed to parse feed");
            state.relay.metrics().inc_error(ACTION_PARSE_RSS);
            return StatusCode::BAD_REQUEST;
        }
    };

    debug!(items = items.len(), "Feed accepted");
    let relay = state.relay.clone();
    tokio::spawn(async move {
        ingest(&relay, items).await;
    });

    StatusCode::OK
}
