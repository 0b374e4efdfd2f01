//! Category toggle keyboard.

use feedcast_models::Recipient;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::warn;

/// Label prefix of an excluded category.
pub const EXCLUDED_MARK: &str = "⛔️";
/// Label prefix of a delivered category.
pub const INCLUDED_MARK: &str = "🔶 ";

const CALLBACK_SEPARATOR: char = '|';
const VERB_INCLUDE: &str = "include";
const VERB_EXCLUDE: &str = "exclude";

/// Bot API limit on `callback_data`, in bytes.
const MAX_CALLBACK_DATA: usize = 64;

/// A category toggle carried in callback data as `verb|category`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryAction {
    /// Deliver the category again.
    Include(String),
    /// Stop delivering the category.
    Exclude(String),
}

impl CategoryAction {
    /// Parses `verb|category`; only the first two fields count.
    pub fn parse(data: &str) -> Option<Self> {
        let mut fields = data.split(CALLBACK_SEPARATOR);
        let verb = fields.next()?;
        let category = fields.next()?.to_string();
        match verb {
            VERB_INCLUDE => Some(Self::Include(category)),
            VERB_EXCLUDE => Some(Self::Exclude(category)),
            _ => None,
        }
    }

    /// The category being toggled.
    pub fn category(&self) -> &str {
        match self {
            Self::Include(category) | Self::Exclude(category) => category,
        }
    }

    /// Encodes the action as callback data.
    pub fn callback_data(&self) -> String {
        let verb = match self {
            Self::Include(_) => VERB_INCLUDE,
            Self::Exclude(_) => VERB_EXCLUDE,
        };
        format!("{}{}{}", verb, CALLBACK_SEPARATOR, self.category())
    }
}

/// The button for one category, reflecting the recipient's current choice.
pub fn category_button(recipient: &Recipient, category: &str) -> InlineKeyboardButton {
    let (label, action) = if recipient.is_excluded(&[category]) {
        (
            format!("{}{}", EXCLUDED_MARK, category),
            CategoryAction::Include(category.to_string()),
        )
    } else {
        (
            format!("{}{}", INCLUDED_MARK, category),
            CategoryAction::Exclude(category.to_string()),
        )
    };

    let data = action.callback_data();
    if data.len() > MAX_CALLBACK_DATA {
        warn!(category, "Callback data exceeds the Bot API limit");
    }
    InlineKeyboardButton::callback(label, data)
}

/// One row per registered category, in registry order.
pub fn categories_keyboard(recipient: &Recipient, categories: &[String]) -> InlineKeyboardMarkup {
    let rows = categories
        .iter()
        .map(|category| vec![category_button(recipient, category)])
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedcast_models::Identity;
    use teloxide::types::InlineKeyboardButtonKind;

    fn callback_data(button: &InlineKeyboardButton) -> &str {
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => data,
            other => panic!("unexpected button kind: {:?}", other),
        }
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!(
            CategoryAction::parse("exclude|Sport"),
            Some(CategoryAction::Exclude("Sport".into()))
        );
        assert_eq!(
            CategoryAction::parse("include|Auto|extra"),
            Some(CategoryAction::Include("Auto".into()))
        );
        assert_eq!(CategoryAction::parse("exclude"), None);
        assert_eq!(CategoryAction::parse("toggle|Sport"), None);
    }

    #[test]
    fn test_callback_data_roundtrip() {
        let action = CategoryAction::Exclude("Sport".into());
        assert_eq!(action.callback_data(), "exclude|Sport");
        assert_eq!(CategoryAction::parse(&action.callback_data()), Some(action));
    }

    #[test]
    fn test_keyboard_reflects_exclusions() {
        let mut recipient = Recipient::new(Identity::new(42, "Ivan"));
        recipient.add_exclusion("Sport").unwrap();
        let categories = vec!["Sport".to_string(), "Auto".to_string()];

        let keyboard = categories_keyboard(&recipient, &categories);

        assert_eq!(keyboard.inline_keyboard.len(), 2);
        assert!(keyboard.inline_keyboard.iter().all(|row| row.len() == 1));

        let sport = &keyboard.inline_keyboard[0][0];
        assert_eq!(sport.text, "⛔️Sport");
        assert_eq!(callback_data(sport), "include|Sport");

        let auto = &keyboard.inline_keyboard[1][0];
        assert_eq!(auto.text, "🔶 Auto");
        assert_eq!(callback_data(auto), "exclude|Auto");
    }

    #[test]
    fn test_empty_registry_gives_empty_keyboard() {
        let recipient = Recipient::new(Identity::new(42, "Ivan"));
        let keyboard = categories_keyboard(&recipient, &[]);
        assert!(keyboard.inline_keyboard.is_empty());
    }
}
