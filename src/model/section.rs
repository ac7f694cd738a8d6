//! Cards and sub-cards.

use super::Block;
use serde::{Deserialize, Serialize};

/// A top-level titled card. Each card gets one table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Card title
    pub title: String,

    /// 0-based position in the document
    pub index: usize,

    /// Blocks directly under the card title
    pub body: Vec<Block>,

    /// Nested sub-cards, rendered after the body
    pub subsections: Vec<Subsection>,

    /// First physical page of the card, set by pagination
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_page: Option<u32>,
}

impl Section {
    /// Create an empty card.
    pub fn new(title: impl Into<String>, index: usize) -> Self {
        Self {
            title: title.into(),
            index,
            body: Vec::new(),
            subsections: Vec::new(),
            assigned_page: None,
        }
    }

    /// Total number of blocks, including those inside sub-cards.
    pub fn block_count(&self) -> usize {
        self.body.len() + self.subsections.iter().map(|s| s.body.len()).sum::<usize>()
    }

    /// Iterate over all blocks in render order (body first, then sub-cards).
    pub fn all_blocks(&self) -> impl Iterator<Item = &Block> {
        self.body
            .iter()
            .chain(self.subsections.iter().flat_map(|s| s.body.iter()))
    }

    /// Whether the card has no content at all.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.subsections.is_empty()
    }

    /// Get plain text content of the card.
    pub fn plain_text(&self) -> String {
        let mut parts = vec![self.title.clone()];
        parts.extend(self.body.iter().map(Block::plain_text));
        for sub in &self.subsections {
            parts.push(sub.plain_text());
        }
        parts.join("\n\n")
    }
}

/// A titled unit nested one level inside a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsection {
    /// Sub-card title
    pub title: String,

    /// Sub-card blocks
    pub body: Vec<Block>,
}

impl Subsection {
    /// Create an empty sub-card.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: Vec::new(),
        }
    }

    /// Get plain text content of the sub-card.
    pub fn plain_text(&self) -> String {
        let mut parts = vec![self.title.clone()];
        parts.extend(self.body.iter().map(Block::plain_text));
        parts.join("\n\n")
    }
}
