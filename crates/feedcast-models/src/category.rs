//! Category name handling.
//!
//! Feeds frequently pack several categories into one `<category>` element
//! (`"Sport, Auto"`). Everything downstream of the parser works with the
//! expanded names.

/// Separator used inside composite category strings.
pub const CATEGORY_SEPARATOR: &str = ", ";

/// Splits composite category strings into individual names.
///
/// Each raw string is split on [`CATEGORY_SEPARATOR`]; empty fragments are
/// dropped and the original order is kept. Duplicates are not removed.
pub fn expand_categories<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .flat_map(|category| category.as_ref().split(CATEGORY_SEPARATOR))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
