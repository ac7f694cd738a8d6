//! Diagram classification for fenced code blocks.
//!
//! Box-drawing art that is large enough is turned into a sequence of
//! [`DiagramStep`]s; everything else stays literal code.

use crate::model::{DiagramStep, StepRole};

/// Glyphs that mark a line as part of box-drawing art.
pub const BOX_GLYPHS: &[char] = &['│', '┌', '┐', '└', '┘', '├', '┤', '─', '┬', '┴', '┼'];

/// A diagram needs more box lines than this.
pub const MIN_BOX_LINES: usize = 5;

/// A diagram needs more total lines than this.
pub const MIN_TOTAL_LINES: usize = 15;

/// Lines that are nothing but an arrow become connectors.
const ARROW_ONLY: &[&str] = &["↓", "⬇️", "⬇", "→", "⬅️", "⬅", "←"];

/// Arrows that mark a labeled step.
const STEP_ARROWS: &[&str] = &["→", "↓", "⬇"];

/// Role keywords, checked in order; the first role with a hit wins.
const ROLE_KEYWORDS: &[(StepRole, &[&str])] = &[
    (StepRole::User, &["👤", "مستخدم", "User"]),
    (StepRole::Orchestrator, &["🎼", "Orchestrator", "منسق"]),
    (StepRole::Planner, &["📋", "Planner", "مخطط"]),
    (StepRole::Executor, &["⚙", "Executor", "منفذ"]),
    (StepRole::Tool, &["🛠", "Tool", "أداة"]),
    (StepRole::Llm, &["🧠", "LLM"]),
    (StepRole::Result, &["📊", "📤", "نتيجة", "Result"]),
    (StepRole::Index, &["💾", "Index", "فهرس"]),
];

/// Number of lines containing at least one box-drawing glyph.
pub fn box_line_count<S: AsRef<str>>(lines: &[S]) -> usize {
    lines
        .iter()
        .filter(|line| line.as_ref().contains(BOX_GLYPHS))
        .count()
}

/// Decide whether a fenced block is a diagram rather than literal code.
pub fn is_diagram<S: AsRef<str>>(lines: &[S]) -> bool {
    let boxes = box_line_count(lines);
    if boxes <= MIN_BOX_LINES {
        return false;
    }
    lines.len() > MIN_TOTAL_LINES
}

/// Infer the role of a step from its text.
pub fn detect_role(text: &str) -> StepRole {
    ROLE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(role, _)| *role)
        .unwrap_or_default()
}

/// Convert the lines of a diagram block into steps.
///
/// Arrow-only lines become connectors, lines with an arrow and text become
/// labeled steps, and every other line is dropped.
pub fn to_steps<S: AsRef<str>>(lines: &[S]) -> Vec<DiagramStep> {
    let mut steps = Vec::new();

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() || line.starts_with("```") {
            continue;
        }

        if ARROW_ONLY.contains(&line) {
            steps.push(DiagramStep::connector());
            continue;
        }

        if !STEP_ARROWS.iter().any(|a| line.contains(a)) {
            log::debug!("Dropping diagram line without arrow: {line}");
            continue;
        }

        let label = strip_box_glyphs(line);
        if label.is_empty() || label.starts_with('(') {
            log::debug!("Dropping diagram annotation: {line}");
            continue;
        }
        steps.push(DiagramStep::labeled(label, detect_role(line)));
    }

    steps
}

/// Remove box-drawing glyphs and surrounding whitespace.
pub fn strip_box_glyphs(line: &str) -> String {
    line.chars()
        .filter(|c| !BOX_GLYPHS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(box_lines: usize, total: usize) -> Vec<String> {
        (0..total)
            .map(|i| {
                if i < box_lines {
                    format!("├── step {i}")
                } else {
                    format!("plain {i}")
                }
            })
            .collect()
    }

    #[test]
    fn test_classification_boundary() {
        assert!(!is_diagram(&block(5, 20)));
        assert!(is_diagram(&block(6, 20)));
    }

    #[test]
    fn test_short_block_is_code() {
        assert!(!is_diagram(&block(10, 15)));
        assert!(is_diagram(&block(10, 16)));
    }

    #[test]
    fn test_no_glyphs_is_code() {
        let lines: Vec<String> = (0..30).map(|i| format!("let x{i} = {i};")).collect();
        assert_eq!(box_line_count(&lines), 0);
        assert!(!is_diagram(&lines));
    }

    #[test]
    fn test_detect_role_order() {
        assert_eq!(detect_role("👤 User → Orchestrator"), StepRole::User);
        assert_eq!(detect_role("Orchestrator → Planner"), StepRole::Orchestrator);
        assert_eq!(detect_role("⚙️ Executor runs"), StepRole::Executor);
        assert_eq!(detect_role("🧠 LLM call"), StepRole::Llm);
        assert_eq!(detect_role("المستخدم يسأل"), StepRole::User);
        assert_eq!(detect_role("something else"), StepRole::Generic);
    }

    #[test]
    fn test_to_steps() {
        let lines = [
            "┌──────────┐",
            "│ 👤 User asks → │",
            "└──────────┘",
            "↓",
            "├─ 📋 Planner → plan",
            "(optional retry)",
            "│ (note) → │",
            "",
            "⬇️",
            "📊 Result ↓",
        ];
        let steps = to_steps(&lines);
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0].label, "👤 User asks →");
        assert_eq!(steps[0].role, StepRole::User);
        assert!(steps[1].is_connector);
        assert_eq!(steps[2].role, StepRole::Planner);
        assert!(steps[3].is_connector);
        assert_eq!(steps[4].role, StepRole::Result);
    }

    #[test]
    fn test_strip_box_glyphs() {
        assert_eq!(strip_box_glyphs("│ ├── text ──┤"), "text");
    }
}
