//! HTTP surface of the Feedcast relay.
//!
//! Routes:
//! - `GET /ping` - liveness probe
//! - `GET /metrics` - counters in Prometheus text format
//! - `POST /rss` - feed ingestion
//! - `POST /` - chat platform webhook (also the fallback for unknown paths)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     feedcast_api::run(Path::new("config.yml")).await?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod error;
pub mod feed;
pub mod handlers;
pub mod router;
pub mod state;

pub use app::run;
pub use error::{Result, ServerError};
pub use feed::parse_feed;
pub use router::{create_router, serve};
pub use state::AppState;
