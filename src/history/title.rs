//! Session title rules
//!
//! New sessions get a timestamp label such as `Chat 10/18/2026 3:04:05 PM`.
//! The first user message replaces that label with its opening words.

use chrono::{Local, TimeZone};
use regex::Regex;
use std::sync::OnceLock;

/// Number of words taken from the first user message
const TITLE_WORDS: usize = 6;

/// Longest derived title, including the ellipsis
const TITLE_MAX_CHARS: usize = 50;

const ELLIPSIS: &str = "...";

fn default_title_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^Chat \d{1,2}/\d{1,2}/\d{4} \d{1,2}:\d{2}:\d{2} (AM|PM)$")
            .expect("default title pattern is valid")
    })
}

/// Timestamp-derived title for a session created at `epoch_ms` (local time)
pub fn default_title(epoch_ms: i64) -> String {
    let when = Local
        .timestamp_millis_opt(epoch_ms)
        .earliest()
        .unwrap_or_else(Local::now);
    format!("Chat {}", when.format("%-m/%-d/%Y %-I:%M:%S %p"))
}

/// Whether `title` is still an untouched default title
pub fn is_default_title(title: &str) -> bool {
    default_title_pattern().is_match(title)
}

/// Derive a title from the first words of `text`
///
/// Returns `None` when `text` has no words.
///
/// # Examples
///
/// ```
/// use josai::history::derive_title_from_message;
///
/// assert_eq!(
///     derive_title_from_message("Fix the null pointer bug in parser module please").as_deref(),
///     Some("Fix the null pointer bug in")
/// );
/// assert_eq!(derive_title_from_message("   "), None);
/// ```
pub fn derive_title_from_message(text: &str) -> Option<String> {
    let title = text
        .split_whitespace()
        .take(TITLE_WORDS)
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        return None;
    }

    if title.chars().count() > TITLE_MAX_CHARS {
        let mut cut: String = title
            .chars()
            .take(TITLE_MAX_CHARS - ELLIPSIS.len())
            .collect();
        cut.push_str(ELLIPSIS);
        return Some(cut);
    }

    Some(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_title_matches_pattern() {
        let title = default_title(1_700_000_000_000);
        assert!(title.starts_with("Chat "));
        assert!(is_default_title(&title), "unexpected default title {}", title);
    }

    #[test]
    fn test_custom_titles_are_not_default() {
        assert!(!is_default_title("Chat about lifetimes"));
        assert!(!is_default_title("Welcome to Jos AI"));
        assert!(!is_default_title(""));
    }

    #[test]
    fn test_derive_takes_first_six_words() {
        assert_eq!(
            derive_title_from_message("Fix the null pointer bug in parser module please"),
            Some("Fix the null pointer bug in".to_string())
        );
    }

    #[test]
    fn test_derive_collapses_whitespace() {
        assert_eq!(
            derive_title_from_message("  how\tdo   I\nsort "),
            Some("how do I sort".to_string())
        );
    }

    #[test]
    fn test_derive_truncates_long_titles_with_ellipsis() {
        let text = "Supercalifragilistic expialidocious antidisestablishmentarianism words here";
        let title = derive_title_from_message(text).unwrap();
        assert_eq!(title.chars().count(), 50);
        assert!(title.ends_with("..."));
        assert!(title.starts_with("Supercalifragilistic expialidocious"));
    }

    #[test]
    fn test_derive_keeps_exactly_fifty_chars() {
        let word = "a".repeat(50);
        assert_eq!(derive_title_from_message(&word), Some(word.clone()));
    }

    #[test]
    fn test_derive_counts_chars_not_bytes() {
        let text = "ü".repeat(60);
        let title = derive_title_from_message(&text).unwrap();
        assert_eq!(title.chars().count(), 50);
        assert_eq!(title, format!("{}...", "ü".repeat(47)));
    }

    #[test]
    fn test_derive_empty_text_is_none() {
        assert_eq!(derive_title_from_message(""), None);
        assert_eq!(derive_title_from_message(" \n "), None);
    }
}
