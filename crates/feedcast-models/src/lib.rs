//! Core data models for Feedcast.
//!
//! This crate provides the data types shared by the relay: recipients and
//! their category exclusions, the persisted feed state (watermark plus
//! category registry) and the transient feed items produced by the parser.

pub mod category;
pub mod feed;
pub mod recipient;

// Re-export main types
pub use category::{expand_categories, CATEGORY_SEPARATOR};
pub use feed::{FeedItem, FeedState};
pub use recipient::{ExclusionError, Identity, Recipient};
