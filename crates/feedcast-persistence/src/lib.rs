//! Persistence layer for Feedcast.
//!
//! This crate provides crash-safe persistence for relay state using
//! atomic file operations (write to temp file, then rename). All documents
//! are YAML:
//!
//! ```text
//! base_dir/
//! ├── state.yml        # watermark + category registry
//! └── users/
//!     ├── 42.yml
//!     └── 1337.yml
//! ```
//!
//! # Example
//!
//! ```no_run
//! use feedcast_models::Identity;
//! use feedcast_persistence::RecipientStore;
//!
//! let store = RecipientStore::new("/var/lib/feedcast");
//! store.ensure_dirs().unwrap();
//!
//! let mut recipient = store.get_or_create(&Identity::new(42, "Ivan")).unwrap();
//! store.exclude(&mut recipient, "Sport").unwrap();
//! ```

pub mod atomic;
pub mod error;
pub mod feed_state_store;
pub mod recipient_store;

pub use error::{PersistenceError, Result};
pub use feed_state_store::FeedStateStore;
pub use recipient_store::RecipientStore;

/// File extension of every persisted document.
pub const DOCUMENT_EXT: &str = "yml";
