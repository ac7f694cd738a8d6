//! Document-level types.

use super::Section;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A parsed card book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Title from the first top-level heading (empty when absent)
    pub main_title: String,

    /// Cards in document order
    pub sections: Vec<Section>,

    /// Document metadata
    pub metadata: Metadata,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document with a title.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            main_title: title.into(),
            ..Self::default()
        }
    }

    /// Append a card, fixing up its index to match its position.
    pub fn push_section(&mut self, mut section: Section) {
        section.index = self.sections.len();
        self.sections.push(section);
    }

    /// Number of cards.
    pub fn card_count(&self) -> usize {
        self.sections.len()
    }

    /// Check if the document has any cards.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total number of blocks across all cards.
    pub fn block_count(&self) -> usize {
        self.sections.iter().map(Section::block_count).sum()
    }

    /// Title to display, falling back to the first card title.
    pub fn display_title(&self) -> &str {
        if !self.main_title.is_empty() {
            return &self.main_title;
        }
        self.sections
            .first()
            .map(|s| s.title.as_str())
            .unwrap_or("")
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::with_capacity(self.sections.len() + 1);
        if !self.main_title.is_empty() {
            parts.push(self.main_title.clone());
        }
        parts.extend(self.sections.iter().map(Section::plain_text));
        parts.join("\n\n")
    }

    /// Whether any title or block contains strong right-to-left text.
    pub fn has_rtl_text(&self) -> bool {
        crate::render::bidi::contains_rtl(&self.main_title)
            || self.sections.iter().any(|s| {
                crate::render::bidi::contains_rtl(&s.title)
                    || crate::render::bidi::contains_rtl(&s.plain_text())
            })
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Path or name of the source file
    pub source: Option<String>,

    /// Creation date of the output
    pub created: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Create metadata stamped with the current time.
    pub fn now() -> Self {
        Self {
            created: Some(Utc::now()),
            ..Default::default()
        }
    }
}
