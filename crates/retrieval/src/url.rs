//! Link detection in the latest user turn.

use crate::types::{Message, Role};
use regex::Regex;
use std::sync::OnceLock;

/// Scheme, then one or more of: letters, digits, the ASCII run `$`..`_`,
/// `@.&+!*\(),`, or a `%XX` escape.
const URL_PATTERN: &str = r"https?://(?:[a-zA-Z0-9$-_@.&+!*\\(),]|%[0-9a-fA-F]{2})+";

fn url_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(URL_PATTERN).ok()).as_ref()
}

/// Content of the most recent user message, if there is one.
pub fn last_user_message(history: &[Message]) -> Option<&str> {
    history
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
}

/// First URL in `text`.
pub fn find_url(text: &str) -> Option<&str> {
    url_regex()?.find(text).map(|m| m.as_str())
}

/// First URL in the most recent user message.
///
/// Earlier messages are never consulted, even when the latest one has no link.
pub fn detect_url(history: &[Message]) -> Option<&str> {
    find_url(last_user_message(history).unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_compiles() {
        assert!(url_regex().is_some());
    }

    #[test]
    fn test_finds_url_in_sentence() {
        assert_eq!(
            find_url("summarize https://example.com/page please"),
            Some("https://example.com/page")
        );
        assert_eq!(
            find_url("see http://a.test/x?y=1&z=%20q"),
            Some("http://a.test/x?y=1&z=%20q")
        );
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(
            find_url("https://one.test and https://two.test"),
            Some("https://one.test")
        );
    }

    #[test]
    fn test_no_scheme_no_match() {
        assert_eq!(find_url("visit www.example.com or example.com/page"), None);
        assert_eq!(find_url("ftp://files.example.com"), None);
        assert_eq!(find_url("https://"), None);
        assert_eq!(find_url(""), None);
    }

    #[test]
    fn test_stops_at_characters_outside_grammar() {
        assert_eq!(find_url("<https://a.test/b>"), Some("https://a.test/b>"));
        assert_eq!(find_url("\"https://a.test/b\" said"), Some("https://a.test/b"));
        assert_eq!(find_url("https://a.test/{x}"), Some("https://a.test/"));
        assert_eq!(find_url("https://a.test/~user"), Some("https://a.test/"));
    }

    #[test]
    fn test_uses_only_latest_user_message() {
        let history = vec![
            Message::user("read https://old.test"),
            Message::assistant("done, see https://assistant.test"),
            Message::user("and now something else"),
        ];
        assert_eq!(detect_url(&history), None);

        let history = vec![
            Message::user("read https://old.test"),
            Message::user("now https://new.test/page"),
            Message::assistant("https://assistant.test"),
        ];
        assert_eq!(detect_url(&history), Some("https://new.test/page"));
    }

    #[test]
    fn test_no_user_message() {
        assert_eq!(last_user_message(&[]), None);
        assert_eq!(detect_url(&[Message::assistant("https://a.test")]), None);
    }

    #[test]
    fn test_detection_is_idempotent() {
        let history = vec![Message::user("x https://a.test/p y")];
        let first = detect_url(&history);
        assert_eq!(first, detect_url(&history));
        assert_eq!(first.and_then(find_url), first);
    }
}
