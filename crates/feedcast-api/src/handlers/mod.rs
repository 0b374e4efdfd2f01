//! HTTP request handlers.

pub mod health;
pub mod metrics;
pub mod rss;
pub mod webhook;

pub use health::*;
pub use metrics::*;
pub use rss::*;
pub use webhook::*;
