//! Document statistics for analysis mode.

use crate::layout::Pagination;
use crate::model::{Block, Document, Section};
use serde::{Deserialize, Serialize};

/// Block counts of a card or a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStats {
    /// Number of paragraphs
    pub paragraph_count: u32,

    /// Number of lists
    pub list_count: u32,

    /// Number of tables
    pub table_count: u32,

    /// Number of literal code blocks
    pub code_count: u32,

    /// Number of diagrams
    pub diagram_count: u32,

    /// Number of blockquotes
    pub quote_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl BlockStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one block.
    pub fn add_block(&mut self, block: &Block) {
        match block {
            Block::Paragraph { .. } => self.paragraph_count += 1,
            Block::List { .. } => self.list_count += 1,
            Block::Table(_) => self.table_count += 1,
            Block::Code { .. } => self.code_count += 1,
            Block::Diagram { .. } => self.diagram_count += 1,
            Block::Blockquote { .. } => self.quote_count += 1,
        }
        self.count_text(&block.plain_text());
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Total number of blocks.
    pub fn block_count(&self) -> u32 {
        self.paragraph_count
            + self.list_count
            + self.table_count
            + self.code_count
            + self.diagram_count
            + self.quote_count
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &BlockStats) {
        self.paragraph_count += other.paragraph_count;
        self.list_count += other.list_count;
        self.table_count += other.table_count;
        self.code_count += other.code_count;
        self.diagram_count += other.diagram_count;
        self.quote_count += other.quote_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}

/// Statistics of one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStats {
    /// Card index (0-based)
    pub index: usize,

    /// Card title
    pub title: String,

    /// Number of sub-cards
    pub subsection_count: u32,

    /// Block counts including sub-cards
    pub blocks: BlockStats,

    /// First page in the PDF layout
    pub start_page: Option<u32>,

    /// Number of physical pages in the PDF layout
    pub page_count: u32,
}

impl CardStats {
    fn collect(section: &Section, pagination: Option<&Pagination>) -> Self {
        let mut blocks = BlockStats::new();
        for block in section.all_blocks() {
            blocks.add_block(block);
        }
        Self {
            index: section.index,
            title: section.title.clone(),
            subsection_count: section.subsections.len() as u32,
            blocks,
            start_page: pagination.and_then(|p| p.assignment.page_of(section.index)),
            page_count: pagination.map_or(0, |p| p.pages_of(section.index).count() as u32),
        }
    }
}

/// Statistics of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Document title
    pub title: String,

    /// Number of cards
    pub card_count: u32,

    /// Number of sub-cards over all cards
    pub subsection_count: u32,

    /// Block counts over all cards
    pub blocks: BlockStats,

    /// Number of TOC pages in the PDF layout
    pub toc_page_count: u32,

    /// Total PDF page count
    pub total_pages: u32,

    /// Per-card statistics
    pub cards: Vec<CardStats>,
}

impl DocumentStats {
    /// Collect statistics, with page numbers when a pagination is given.
    pub fn collect(doc: &Document, pagination: Option<&Pagination>) -> Self {
        let cards: Vec<CardStats> = doc
            .sections
            .iter()
            .map(|s| CardStats::collect(s, pagination))
            .collect();

        let mut blocks = BlockStats::new();
        for card in &cards {
            blocks.merge(&card.blocks);
        }

        Self {
            title: doc.display_title().to_string(),
            card_count: cards.len() as u32,
            subsection_count: cards.iter().map(|c| c.subsection_count).sum(),
            blocks,
            toc_page_count: pagination.map_or(0, |p| p.assignment.toc_page_count),
            total_pages: pagination.map_or(0, |p| p.assignment.total_pages),
            cards,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Paginator, TextMeasurer};
    use crate::model::{DiagramStep, StepRole, Subsection};

    struct Narrow;
    impl TextMeasurer for Narrow {
        fn text_width(&self, _text: &str, _size: f32) -> f32 {
            0.0
        }
    }

    fn sample() -> Document {
        let mut doc = Document::with_title("Stats");
        let mut a = Section::new("A", 0);
        a.body.push(Block::paragraph("one two three"));
        a.body.push(Block::code("x = 1"));
        let mut sub = Subsection::new("Sub");
        sub.body.push(Block::Diagram {
            steps: vec![DiagramStep::labeled("User", StepRole::User)],
        });
        a.subsections.push(sub);
        doc.push_section(a);

        let mut b = Section::new("B", 0);
        b.body.push(Block::List {
            items: vec!["x".into(), "y".into()],
        });
        doc.push_section(b);
        doc
    }

    #[test]
    fn test_count_text() {
        let mut stats = BlockStats::new();
        stats.count_text("Hello, world! This is a test.");
        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.char_count, 24);
    }

    #[test]
    fn test_collect_without_pages() {
        let stats = DocumentStats::collect(&sample(), None);
        assert_eq!(stats.card_count, 2);
        assert_eq!(stats.subsection_count, 1);
        assert_eq!(stats.blocks.block_count(), 4);
        assert_eq!(stats.blocks.code_count, 1);
        assert_eq!(stats.blocks.diagram_count, 1);
        assert_eq!(stats.cards[0].start_page, None);
    }

    #[test]
    fn test_collect_with_pages() {
        let doc = sample();
        let pagination = Paginator::new(&Narrow).paginate(&doc);
        let stats = DocumentStats::collect(&doc, Some(&pagination));
        assert_eq!(stats.toc_page_count, 1);
        assert_eq!(stats.total_pages, 3);
        assert_eq!(stats.cards[0].start_page, Some(2));
        assert_eq!(stats.cards[1].start_page, Some(3));
        assert_eq!(stats.cards[1].page_count, 1);
    }
}
