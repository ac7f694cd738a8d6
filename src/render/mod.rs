//! Rendering module for converting card documents to output formats.

pub mod bidi;
mod carousel;
mod html;
mod options;
pub mod pdf;
mod stats;

pub use carousel::to_carousel;
pub use html::{escape_html, inline_html, render_block, render_card_content, to_html};
pub use options::{Direction, JsonFormat, Labels, RenderOptions};
pub use pdf::{compose_pdf, to_pdf};
pub use stats::{BlockStats, CardStats, DocumentStats};

use crate::error::Result;
use crate::layout::PageAssignment;
use crate::model::Document;

/// Serialize the card tree, stamping each card with its page when an
/// assignment is given.
pub fn to_json(doc: &Document, pages: Option<&PageAssignment>, format: JsonFormat) -> Result<String> {
    let paged;
    let doc = match pages {
        Some(assignment) => {
            let mut copy = doc.clone();
            assignment.apply_to(&mut copy);
            paged = copy;
            &paged
        }
        None => doc,
    };
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc)?,
        JsonFormat::Compact => serde_json::to_string(doc)?,
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FontLibrary, Paginator};
    use crate::model::{Block, Section};

    fn sample() -> Document {
        let mut doc = Document::with_title("Test");
        let mut section = Section::new("Intro", 0);
        section.body.push(Block::paragraph("Hello"));
        doc.push_section(section);
        doc.push_section(Section::new("Next", 0));
        doc
    }

    #[test]
    fn test_json_without_pages() {
        let json = to_json(&sample(), None, JsonFormat::Compact).unwrap();
        assert!(json.contains("\"type\":\"paragraph\""));
        assert!(!json.contains("assigned_page"));
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_json_with_pages() {
        let doc = sample();
        let assignment = Paginator::new(&FontLibrary::builtin()).assign_pages(&doc);
        let json = to_json(&doc, Some(&assignment), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"assigned_page\": 2"));
        assert!(json.contains("\"assigned_page\": 3"));
        assert_eq!(doc.sections[0].assigned_page, None);
    }
}
