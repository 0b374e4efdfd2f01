//! Recipient types for Feedcast.
//!
//! A recipient is a chat-platform user who subscribed with `/start` and
//! receives one message per new feed item, minus the categories they
//! excluded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity snapshot of a chat-platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id assigned by the platform.
    pub id: i64,

    /// Display username without the leading `@`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// First name.
    #[serde(default)]
    pub first_name: String,

    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl Identity {
    /// Creates an identity with only an id and first name.
    pub fn new(id: i64, first_name: impl Into<String>) -> Self {
        Self {
            id,
            username: None,
            first_name: first_name.into(),
            last_name: None,
        }
    }

    /// Sets the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the last name.
    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }
}

/// Errors from mutating a recipient's exclusion set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExclusionError {
    /// The category is already excluded.
    #[error("category already excluded: {0}")]
    AlreadyPresent(String),

    /// The category is not excluded.
    #[error("category not excluded: {0}")]
    NotPresent(String),

    /// Empty category names are never stored.
    #[error("empty category name")]
    Empty,
}

/// A subscribed recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    /// Identity snapshot, refreshed on interaction.
    pub info: Identity,

    /// When the recipient first interacted with the bot.
    pub created_at: DateTime<Utc>,

    /// Category names that suppress delivery, in the order they were added.
    #[serde(default)]
    pub excluded_categories: Vec<String>,

    /// Administrative flag.
    #[serde(default)]
    pub is_admin: bool,
}

impl Recipient {
    /// Creates a new recipient with no exclusions.
    pub fn new(info: Identity) -> Self {
        Self {
            info,
            created_at: Utc::now(),
            excluded_categories: Vec::new(),
            is_admin: false,
        }
    }

    /// Returns the recipient id (the chat id for private chats).
    pub fn id(&self) -> i64 {
        self.info.id
    }

    /// Returns the username, or an empty string when the user has none.
    pub fn username(&self) -> &str {
        self.info.username.as_deref().unwrap_or_default()
    }

    /// Human readable name for logs: `@username`, `first last` or the id.
    pub fn name(&self) -> String {
        if let Some(username) = self.info.username.as_deref().filter(|u| !u.is_empty()) {
            return format!("@{}", username);
        }
        if !self.info.first_name.is_empty() {
            return match self.info.last_name.as_deref().filter(|l| !l.is_empty()) {
                Some(last) => format!("{} {}", self.info.first_name, last),
                None => self.info.first_name.clone(),
            };
        }
        self.id().to_string()
    }

    /// True if any of the given categories is excluded.
    pub fn is_excluded<S: AsRef<str>>(&self, categories: &[S]) -> bool {
        categories.iter().any(|category| {
            self.excluded_categories
                .iter()
                .any(|excluded| excluded == category.as_ref())
        })
    }

    /// Appends a category to the exclusion set.
    pub fn add_exclusion(&mut self, category: &str) -> Result<(), ExclusionError> {
        if category.is_empty() {
            return Err(ExclusionError::Empty);
        }
        if self.is_excluded(&[category]) {
            return Err(ExclusionError::AlreadyPresent(category.to_string()));
        }
        self.excluded_categories.push(category.to_string());
        Ok(())
    }

    /// Removes a category from the exclusion set, keeping the others in order.
    pub fn remove_exclusion(&mut self, category: &str) -> Result<(), ExclusionError> {
        if !self.is_excluded(&[category]) {
            return Err(ExclusionError::NotPresent(category.to_string()));
        }
        self.excluded_categories.retain(|c| c != category);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient() -> Recipient {
        Recipient::new(Identity::new(42, "Ivan").with_username("ivan"))
    }

    #[test]
    fn test_new_recipient_defaults() {
        let r = recipient();
        assert_eq!(r.id(), 42);
        assert!(r.excluded_categories.is_empty());
        assert!(!r.is_admin);
    }

    #[test]
    fn test_name_variants() {
        assert_eq!(recipient().name(), "@ivan");

        let r = Recipient::new(Identity::new(7, "Ivan").with_last_name("Petrov"));
        assert_eq!(r.name(), "Ivan Petrov");

        let r = Recipient::new(Identity::new(7, ""));
        assert_eq!(r.name(), "7");
    }

    #[test]
    fn test_add_then_remove_restores_set() {
        let mut r = recipient();
        r.add_exclusion("Sport").unwrap();
        r.add_exclusion("Auto").unwrap();
        let before = r.excluded_categories.clone();

        r.add_exclusion("News").unwrap();
        r.remove_exclusion("News").unwrap();

        assert_eq!(r.excluded_categories, before);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut r = recipient();
        for c in ["A", "B", "C"] {
            r.add_exclusion(c).unwrap();
        }
        r.remove_exclusion("B").unwrap();
        assert_eq!(r.excluded_categories, vec!["A", "C"]);
    }

    #[test]
    fn test_add_existing_is_rejected() {
        let mut r = recipient();
        r.add_exclusion("Sport").unwrap();

        let err = r.add_exclusion("Sport").unwrap_err();
        assert_eq!(err, ExclusionError::AlreadyPresent("Sport".into()));
        assert_eq!(r.excluded_categories, vec!["Sport"]);
    }

    #[test]
    fn test_remove_missing_is_rejected() {
        let mut r = recipient();
        let err = r.remove_exclusion("Sport").unwrap_err();
        assert_eq!(err, ExclusionError::NotPresent("Sport".into()));
    }

    #[test]
    fn test_add_empty_is_rejected() {
        let mut r = recipient();
        assert_eq!(r.add_exclusion(""), Err(ExclusionError::Empty));
        assert!(r.excluded_categories.is_empty());
    }

    #[test]
    fn test_is_excluded_any_match() {
        let mut r = recipient();
        r.add_exclusion("Auto").unwrap();

        assert!(r.is_excluded(&["Sport", "Auto"]));
        assert!(!r.is_excluded(&["Sport", "News"]));
        assert!(!r.is_excluded::<&str>(&[]));
    }

    #[test]
    fn test_yaml_field_names() {
        let r = recipient();
        let yaml = serde_yaml::to_string(&r).unwrap();
        assert!(yaml.contains("created_at:"));
        assert!(yaml.contains("excluded_categories:"));
        assert!(yaml.contains("is_admin: false"));

        let back: Recipient = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, r);
    }
}
