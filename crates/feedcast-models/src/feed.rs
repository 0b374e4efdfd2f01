//! Feed types for Feedcast.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An item as supplied by the feed parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Item title.
    pub title: String,

    /// Item URL.
    pub link: String,

    /// Publication time, if the parser could determine one.
    pub published: Option<DateTime<Utc>>,

    /// Raw category strings; may hold comma-joined composites.
    pub categories: Vec<String>,
}

impl FeedItem {
    /// Creates an item without categories.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        published: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            published,
            categories: Vec::new(),
        }
    }

    /// Adds a raw category string.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }
}

/// Persisted ingestion progress.
///
/// `last_date` is the watermark: only items published strictly after it are
/// delivered. `categories` is the registry of every category name observed,
/// in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedState {
    /// Watermark timestamp.
    pub last_date: DateTime<Utc>,

    /// Category registry.
    #[serde(default)]
    pub categories: Vec<String>,
}

impl FeedState {
    /// True if the category is already registered.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Registers unseen categories and returns how many were added.
    pub fn add_categories<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        let mut added = 0;
        for name in names {
            let name = name.as_ref();
            if name.is_empty() || self.has_category(name) {
                continue;
            }
            self.categories.push(name.to_string());
            added += 1;
        }
        added
    }

    /// Moves the watermark forward. Returns false, leaving it untouched, if
    /// `at` is not strictly later than the current value.
    pub fn advance_watermark(&mut self, at: DateTime<Utc>) -> bool {
        if at <= self.last_date {
            return false;
        }
        self.last_date = at;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_state_is_empty() {
        let state = FeedState::default();
        assert_eq!(state.last_date, DateTime::<Utc>::default());
        assert!(state.categories.is_empty());
    }

    #[test]
    fn test_add_categories_dedupes_and_counts() {
        let mut state = FeedState::default();
        assert_eq!(state.add_categories(&["Sport", "Auto"]), 2);
        assert_eq!(state.add_categories(&["Auto", "News", "Sport"]), 1);
        assert_eq!(state.categories, vec!["Sport", "Auto", "News"]);
    }

    #[test]
    fn test_add_categories_within_one_call() {
        let mut state = FeedState::default();
        assert_eq!(state.add_categories(&["A", "A", ""]), 1);
        assert_eq!(state.categories, vec!["A"]);
    }

    #[test]
    fn test_watermark_never_moves_backward() {
        let mut state = FeedState::default();
        let later = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();

        assert!(state.advance_watermark(later));
        assert!(!state.advance_watermark(earlier));
        assert!(!state.advance_watermark(later));
        assert_eq!(state.last_date, later);
    }
}
