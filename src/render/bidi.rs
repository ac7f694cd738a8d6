//! Bidirectional text helpers.
//!
//! PDF text is drawn glyph by glyph from left to right, so mixed Arabic and
//! Latin lines have to be split into visual runs first. Each run keeps its
//! logical text and its direction; the shaper then lays out RTL runs
//! right-to-left.

use super::options::Direction;
use unicode_bidi::{bidi_class, BidiClass, BidiInfo, Level};

/// A run of text with a single embedding direction, in visual order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualRun<'a> {
    /// Logical text of the run
    pub text: &'a str,
    /// Whether the run is displayed right-to-left
    pub rtl: bool,
}

fn is_strong_rtl(c: char) -> bool {
    matches!(bidi_class(c), BidiClass::R | BidiClass::AL)
}

/// Whether the text contains any strong right-to-left character.
pub fn contains_rtl(text: &str) -> bool {
    text.chars().any(is_strong_rtl)
}

/// Whether the first strong character of the text is right-to-left.
pub fn starts_rtl(text: &str) -> bool {
    for c in text.chars() {
        match bidi_class(c) {
            BidiClass::L => return false,
            BidiClass::R | BidiClass::AL => return true,
            _ => {}
        }
    }
    false
}

/// Split one line into visual runs.
///
/// `Direction::Auto` takes the paragraph level from the first strong
/// character.
pub fn visual_runs(text: &str, direction: Direction) -> Vec<VisualRun<'_>> {
    let level = match direction {
        Direction::Rtl => Some(Level::rtl()),
        Direction::Ltr => Some(Level::ltr()),
        Direction::Auto => None,
    };
    let info = BidiInfo::new(text, level);

    let mut out = Vec::new();
    for para in &info.paragraphs {
        let (levels, runs) = info.visual_runs(para, para.range.clone());
        for run in runs {
            let slice = text[run.clone()].trim_end_matches(['\n', '\r']);
            if slice.is_empty() {
                continue;
            }
            out.push(VisualRun {
                text: slice,
                rtl: levels[run.start].is_rtl(),
            });
        }
    }
    out
}

/// The line's characters in display order.
///
/// Used where no shaper is available; RTL runs are simply reversed.
pub fn visual_string(text: &str, direction: Direction) -> String {
    visual_runs(text, direction)
        .into_iter()
        .flat_map(|run| {
            let chars: Vec<char> = if run.rtl {
                run.text.chars().rev().collect()
            } else {
                run.text.chars().collect()
            };
            chars
        })
        .collect()
}
