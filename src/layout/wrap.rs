//! Greedy word wrapping.

use super::fonts::TextMeasurer;

/// Wrap `text` into lines no wider than `max_width`.
///
/// Words are appended to the current line while the measured candidate line
/// fits; otherwise the line is flushed and the word starts a new one. A word
/// wider than `max_width` gets a line of its own rather than being broken.
pub fn wrap_words<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wrap body text with a measurer at a font size.
pub fn wrap_text(
    measurer: &dyn TextMeasurer,
    text: &str,
    font_size: f32,
    max_width: f32,
) -> Vec<String> {
    wrap_words(text, max_width, |line| measurer.text_width(line, font_size))
}

/// Cut `text` to fit `max_width`, appending an ellipsis when `ellipsis`
/// is set and anything was removed.
pub fn truncate_to_width<F>(text: &str, max_width: f32, ellipsis: bool, measure: F) -> String
where
    F: Fn(&str) -> f32,
{
    if measure(text) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let mut candidate: String = chars.iter().collect();
        if ellipsis {
            candidate = format!("{}\u{2026}", candidate.trim_end());
        }
        if measure(&candidate) <= max_width {
            return candidate;
        }
    }
    String::new()
}
