//! Inline emphasis and code span processing.
//!
//! `**bold**` becomes a `<strong>` span and `` `code` `` an inline `<code>`
//! span. Text outside matched spans is left untouched; HTML escaping is the
//! caller's job and must happen before [`to_markup`].

use regex::Regex;
use std::sync::OnceLock;

fn bold_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern"))
}

fn code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("code span pattern"))
}

/// Convert inline markers to display markup.
///
/// Applying this to its own output is a no-op: every converted span loses
/// its markers, so nothing can match twice.
pub fn to_markup(text: &str) -> String {
    let text = bold_regex().replace_all(text, "<strong>$1</strong>");
    code_regex()
        .replace_all(&text, "<code>$1</code>")
        .into_owned()
}

/// Strip inline markers, keeping the enclosed text.
///
/// Used where no styled spans are available (PDF text runs, TOC entries).
pub fn to_plain(text: &str) -> String {
    let text = bold_regex().replace_all(text, "$1");
    code_regex().replace_all(&text, "$1").into_owned()
}
