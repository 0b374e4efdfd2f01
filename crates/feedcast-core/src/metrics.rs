//! Relay counters.
//!
//! Three counters are kept: `errors{action}`, `new_items` and
//! `send_items{username}`. They are owned by the services context and
//! exposed through their Prometheus registry.

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

/// Error counter label for feed documents that fail to parse.
pub const ACTION_PARSE_RSS: &str = "parse_rss";
/// Error counter label for items without a publication time.
pub const ACTION_GET_ITEM_DATE: &str = "get_item_date";
/// Error counter label for recipient enumeration failures.
pub const ACTION_GET_USERS: &str = "get_users";
/// Error counter label for single recipient lookups.
pub const ACTION_GET_USER: &str = "get_user";
/// Error counter label for failed chat platform requests.
pub const ACTION_TELEGRAM_REQUEST: &str = "telegram_request";
/// Error counter label for unreadable webhook requests.
pub const ACTION_TELEGRAM_HANDLER: &str = "telegram_handler";
/// Error counter label for rejected `include` callbacks.
pub const ACTION_INCLUDE: &str = "include";
/// Error counter label for rejected `exclude` callbacks.
pub const ACTION_EXCLUDE: &str = "exclude";
/// Error counter label for feed state write failures.
pub const ACTION_SAVE_STATE: &str = "save_state";
/// Error counter label for recipient removal failures.
pub const ACTION_REMOVE_USER: &str = "remove_user";

/// Relay counters registered in a private [`Registry`].
pub struct Metrics {
    registry: Registry,
    errors: IntCounterVec,
    new_items: IntCounter,
    send_items: IntCounterVec,
}

impl Metrics {
    /// Creates the counters and registers them.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let errors = IntCounterVec::new(Opts::new("errors", "Errors counter"), &["action"])?;
        let new_items = IntCounter::new("new_items", "Received new items")?;
        let send_items =
            IntCounterVec::new(Opts::new("send_items", "Items to send"), &["username"])?;

        registry.register(Box::new(errors.clone()))?;
        registry.register(Box::new(new_items.clone()))?;
        registry.register(Box::new(send_items.clone()))?;

        Ok(Self {
            registry,
            errors,
            new_items,
            send_items,
        })
    }

    /// Registry holding every relay counter, for exposition.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Increments `errors{action}`.
    pub fn inc_error(&self, action: &str) {
        self.errors.with_label_values(&[action]).inc();
    }

    /// Adds to `new_items`.
    pub fn add_new_items(&self, count: u64) {
        self.new_items.inc_by(count);
    }

    /// Increments `send_items{username}`.
    pub fn inc_send(&self, username: &str) {
        self.send_items.with_label_values(&[username]).inc();
    }

    /// Current `errors{action}` value.
    pub fn errors(&self, action: &str) -> u64 {
        self.errors.with_label_values(&[action]).get()
    }

    /// Current `new_items` value.
    pub fn new_items(&self) -> u64 {
        self.new_items.get()
    }

    /// Current `send_items{username}` value.
    pub fn sends(&self, username: &str) -> u64 {
        self.send_items.with_label_values(&[username]).get()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("new_items", &self.new_items())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{Encoder, TextEncoder};

    fn exposition(metrics: &Metrics) -> String {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&metrics.registry().gather(), &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.inc_error(ACTION_PARSE_RSS);
        metrics.inc_error(ACTION_PARSE_RSS);
        metrics.add_new_items(3);
        metrics.inc_send("ivan");

        assert_eq!(metrics.errors(ACTION_PARSE_RSS), 2);
        assert_eq!(metrics.errors(ACTION_GET_USER), 0);
        assert_eq!(metrics.new_items(), 3);
        assert_eq!(metrics.sends("ivan"), 1);
        assert_eq!(metrics.sends("other"), 0);
    }

    #[test]
    fn test_registry_exposition() {
        let metrics = Metrics::new().unwrap();
        metrics.inc_error(ACTION_GET_ITEM_DATE);
        metrics.add_new_items(2);
        metrics.inc_send("");
        metrics.inc_send("ivan");

        let text = exposition(&metrics);
        assert!(text.contains("# HELP errors Errors counter"));
        assert!(text.contains("# TYPE errors counter"));
        assert!(text.contains("errors{action=\"get_item_date\"} 1"));
        assert!(text.contains("new_items 2"));
        assert!(text.contains("send_items{username=\"\"} 1"));
        assert!(text.contains("send_items{username=\"ivan\"} 1"));
    }

    #[test]
    fn test_instances_do_not_share_counters() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();
        first.add_new_items(5);

        assert_eq!(first.new_items(), 5);
        assert_eq!(second.new_items(), 0);
    }
}
