//! Application state shared across handlers.

use std::sync::Arc;

use feedcast_telegram::RelayState;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Relay services; background tasks take their own clone of the `Arc`.
    pub relay: Arc<RelayState>,
}

impl AppState {
    /// Creates a new AppState around the relay services.
    pub fn new(relay: RelayState) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}
