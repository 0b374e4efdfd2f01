//! Router configuration and server setup.

use axum::{
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::handlers;
use crate::state::AppState;

/// Creates the router with all routes configured.
///
/// Paths that match no route are treated as webhook deliveries.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/ping", get(handlers::ping))
        .route("/metrics", get(handlers::metrics))
        // Feed ingestion
        .route("/rss", any(handlers::rss))
        // Chat platform updates
        .route("/", any(handlers::webhook))
        .fallback(handlers::webhook)
        // Apply middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the router until ctrl-c.
pub async fn serve(addr: &str, state: AppState) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Relay listening on {}", addr);
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => warn!(error = %e, "Failed to listen for shutdown signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use feedcast_core::metrics::{ACTION_PARSE_RSS, ACTION_TELEGRAM_HANDLER};
    use feedcast_core::{ConfigHolder, Metrics};
    use feedcast_persistence::{FeedStateStore, RecipientStore};
    use feedcast_telegram::testing::RecordingTransport;
    use feedcast_telegram::{ChatApi, RelayState};
    use tempfile::TempDir;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>t</title><link>https://e/</link><description>d</description>
<item><title>One</title><link>https://e/1</link><category>Sport</category>
<pubDate>Tue, 02 Jan 2024 12:00:00 +0000</pubDate></item>
</channel></rss>"#;

    fn make_test_state() -> (TempDir, Arc<RecordingTransport>, AppState) {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        std::fs::write(&config_path, "telegram:\n  token: t\n").unwrap();

        let recipients = RecipientStore::new(dir.path());
        recipients.ensure_dirs().unwrap();
        let transport = Arc::new(RecordingTransport::new());
        let relay = RelayState::new(
            Arc::new(ConfigHolder::load(&config_path).unwrap()),
            Arc::new(Metrics::new().unwrap()),
            recipients,
            FeedStateStore::new(dir.path()),
            ChatApi::new(transport.clone()),
        )
        .unwrap()
        .with_send_delay(Duration::ZERO);

        (dir, transport, AppState::new(relay))
    }

    fn server(state: AppState) -> TestServer {
        TestServer::new(create_router(state)).unwrap()
    }

    /// Waits for the background task spawned by a handler.
    async fn settle<F: Fn() -> bool>(done: F) {
        for _ in 0..100 {
            if done() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_ping() {
        let (_dir, _transport, state) = make_test_state();
        let server = server(state);

        let response = server.get("/ping").await;
        response.assert_status_ok();
        response.assert_text("PONG");
    }

    #[tokio::test]
    async fn test_metrics_exposition() {
        let (_dir, _transport, state) = make_test_state();
        state.relay.metrics().add_new_items(4);
        let server = server(state);

        let response = server.get("/metrics").await;
        response.assert_status_ok();
        let content_type = response.header("content-type");
        assert!(content_type.to_str().unwrap().starts_with("text/plain; version=0.0.4"));
        let text = response.text();
        assert!(text.contains("# TYPE new_items counter"));
        assert!(text.contains("new_items 4"));
    }

    #[tokio::test]
    async fn test_rss_rejects_non_post() {
        let (_dir, _transport, state) = make_test_state();
        let server = server(state);

        server.get("/rss").await.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rss_rejects_bad_feed() {
        let (_dir, _transport, state) = make_test_state();
        let relay = state.relay.clone();
        let server = server(state);

        let response = server.post("/rss").text("<html>nope</html>").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(relay.metrics().errors(ACTION_PARSE_RSS), 1);
        assert_eq!(relay.watermark().await, chrono::DateTime::<chrono::Utc>::default());
    }

    #[tokio::test]
    async fn test_rss_ingests_in_background() {
        let (_dir, _transport, state) = make_test_state();
        let relay = state.relay.clone();
        let server = server(state);

        server.post("/rss").text(RSS).await.assert_status_ok();

        settle(|| relay.metrics().new_items() == 1).await;
        assert_eq!(relay.metrics().new_items(), 1);
    }

    #[tokio::test]
    async fn test_webhook_rejects_non_post() {
        let (_dir, _transport, state) = make_test_state();
        let server = server(state);

        server.get("/").await.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_webhook_bad_json_is_server_error() {
        let (_dir, _transport, state) = make_test_state();
        let relay = state.relay.clone();
        let server = server(state);

        let response = server.post("/").text("{not json").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(relay.metrics().errors(ACTION_TELEGRAM_HANDLER), 1);
    }

    #[tokio::test]
    async fn test_webhook_dispatches_start() {
        let (_dir, transport, state) = make_test_state();
        let relay = state.relay.clone();
        let server = server(state);

        let update = serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 3,
                "date": 1704067200,
                "from": {"id": 42, "is_bot": false, "first_name": "Ivan"},
                "chat": {"id": 42, "type": "private", "first_name": "Ivan"},
                "text": "/start"
            }
        });
        server.post("/").json(&update).await.assert_status_ok();

        settle(|| !transport.texts_to(42).is_empty()).await;
        assert!(relay.recipients().get(42).unwrap().is_some());
        assert_eq!(transport.texts_to(42).len(), 1);
    }

    #[tokio::test]
    async fn test_unrouted_path_reaches_webhook() {
        let (_dir, transport, state) = make_test_state();
        let server = server(state);

        server
            .post("/hook/secret")
            .json(&serde_json::json!({"update_id": 9, "poll": {"unexpected": true}}))
            .await
            .assert_status_ok();
        assert!(transport.calls().is_empty());
        server
            .get("/hook/secret")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
