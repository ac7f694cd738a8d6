//! Page assignment for cards.
//!
//! Pagination runs over the whole document before anything is drawn: the
//! table of contents must print the first page of every card, including the
//! cards that follow it. [`Paginator::paginate`] lays out every card into
//! fixed-height items, breaks them into physical pages and returns both the
//! resulting [`PageAssignment`] and the per-page plans the composer draws.

use super::fonts::TextMeasurer;
use super::geometry::{LayoutMetrics, PageGeometry};
use super::wrap::{truncate_to_width, wrap_text};
use crate::model::{Block, Document, Section, StepRole};
use crate::parser::inline;
use serde::{Deserialize, Serialize};

/// Resolved first page of every card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAssignment {
    /// First physical page of each card, indexed by card index
    pub pages: Vec<u32>,
    /// Number of table-of-contents pages at the front
    pub toc_page_count: u32,
    /// Total number of physical pages
    pub total_pages: u32,
}

impl PageAssignment {
    /// First page of a card.
    pub fn page_of(&self, section: usize) -> Option<u32> {
        self.pages.get(section).copied()
    }

    /// Page the first card starts on.
    pub fn first_card_page(&self) -> u32 {
        self.toc_page_count + 1
    }

    /// Copy the resolved pages into the document's cards.
    pub fn apply_to(&self, doc: &mut Document) {
        for section in &mut doc.sections {
            section.assigned_page = self.page_of(section.index);
        }
    }

    /// Whether pages strictly increase and the first card follows the TOC.
    pub fn is_consistent(&self) -> bool {
        let increasing = self.pages.windows(2).all(|w| w[1] > w[0]);
        let first_ok = self
            .pages
            .first()
            .map_or(true, |&p| p == self.first_card_page());
        let last_ok = self.pages.last().map_or(true, |&p| p <= self.total_pages);
        increasing && first_ok && last_ok
    }
}

/// How a wrapped text line is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    Body,
    /// First line of a list item (drawn with a bullet)
    Bullet,
    /// Following lines of a list item
    BulletContinuation,
    Quote,
    TableHeader,
    TableRow,
}

/// One fixed-height element of a card page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayoutItem {
    /// A wrapped line of text
    Line { text: String, style: LineStyle },
    /// A sub-card heading
    Subheading { text: String },
    /// A code box; never split across pages
    Code { lines: Vec<String> },
    /// A labeled diagram step
    Step {
        label: String,
        role: StepRole,
        number: usize,
    },
    /// An arrow between diagram steps
    Connector,
    /// Vertical space after a block
    Gap(f32),
}

impl LayoutItem {
    /// Vertical space the item consumes.
    pub fn height(&self, metrics: &LayoutMetrics) -> f32 {
        match self {
            LayoutItem::Line { .. } => metrics.body_leading,
            LayoutItem::Subheading { .. } => metrics.subheading_leading,
            LayoutItem::Code { lines } => {
                metrics.code_header + lines.len() as f32 * metrics.code_leading + metrics.code_padding
            }
            LayoutItem::Step { .. } => metrics.step_height,
            LayoutItem::Connector => metrics.connector_height,
            LayoutItem::Gap(h) => *h,
        }
    }
}

/// An item positioned on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    /// Distance from the top of the page's body area
    pub offset: f32,
    /// The item
    pub item: LayoutItem,
}

/// Plan for one physical card page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardPage {
    /// Card index
    pub section: usize,
    /// Physical page number (1-based)
    pub number: u32,
    /// Whether the card started on an earlier page
    pub continuation: bool,
    /// Items in top-to-bottom order
    pub items: Vec<PlacedItem>,
}

impl CardPage {
    fn new(section: usize, number: u32, continuation: bool) -> Self {
        Self {
            section,
            number,
            continuation,
            items: Vec::new(),
        }
    }
}

/// Full pagination result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    /// First page of every card
    pub assignment: PageAssignment,
    /// Card indices listed on each TOC page
    pub toc: Vec<Vec<usize>>,
    /// Card pages in order, starting after the TOC
    pub pages: Vec<CardPage>,
}

impl Pagination {
    /// Pages occupied by one card.
    pub fn pages_of(&self, section: usize) -> impl Iterator<Item = &CardPage> {
        self.pages.iter().filter(move |p| p.section == section)
    }
}

/// Lays out a document under a fixed page geometry.
pub struct Paginator<'a> {
    geometry: PageGeometry,
    metrics: LayoutMetrics,
    measurer: &'a dyn TextMeasurer,
}

impl<'a> Paginator<'a> {
    /// Create a paginator for A4 pages with default metrics.
    pub fn new(measurer: &'a dyn TextMeasurer) -> Self {
        Self {
            geometry: PageGeometry::default(),
            metrics: LayoutMetrics::default(),
            measurer,
        }
    }

    /// Use a different page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Use different metrics.
    pub fn with_metrics(mut self, metrics: LayoutMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Resolve the first page of every card.
    pub fn assign_pages(&self, doc: &Document) -> PageAssignment {
        self.paginate(doc).assignment
    }

    /// Lay out every card and resolve page numbers.
    pub fn paginate(&self, doc: &Document) -> Pagination {
        if doc.is_empty() {
            log::warn!("Document has no cards; only the table of contents will be produced");
        }

        let toc = self.toc_pages(doc.card_count());
        let toc_page_count = toc.len() as u32;
        let mut next_page = toc_page_count + 1;
        let mut first_pages = Vec::with_capacity(doc.card_count());
        let mut pages = Vec::new();

        for section in &doc.sections {
            first_pages.push(next_page);
            let items = self.section_items(section);
            let card_pages = self.break_pages(section.index, next_page, items);
            log::debug!(
                "Card {} '{}' starts on page {} and spans {} page(s)",
                section.index,
                section.title,
                next_page,
                card_pages.len()
            );
            next_page += card_pages.len() as u32;
            pages.extend(card_pages);
        }

        Pagination {
            assignment: PageAssignment {
                pages: first_pages,
                toc_page_count,
                total_pages: next_page - 1,
            },
            toc,
            pages,
        }
    }

    /// Split card indices over TOC pages. There is always at least one page.
    fn toc_pages(&self, entries: usize) -> Vec<Vec<usize>> {
        let first = self.metrics.toc_capacity(&self.geometry, true).max(1);
        let rest = self.metrics.toc_capacity(&self.geometry, false).max(1);

        let mut pages = vec![(0..entries.min(first)).collect::<Vec<_>>()];
        let mut start = first;
        while start < entries {
            let end = (start + rest).min(entries);
            pages.push((start..end).collect());
            start = end;
        }
        pages
    }

    fn break_pages(&self, section: usize, first_page: u32, items: Vec<LayoutItem>) -> Vec<CardPage> {
        let mut pages = Vec::new();
        let mut page = CardPage::new(section, first_page, false);
        let mut capacity = self.metrics.body_capacity(&self.geometry, false);
        let mut used = 0.0_f32;

        let mut items = items.into_iter().peekable();
        while let Some(item) = items.next() {
            let is_gap = matches!(item, LayoutItem::Gap(_));
            if is_gap && page.items.is_empty() {
                continue;
            }
            let height = item.height(&self.metrics);
            // A sub-card heading stays with its first item.
            let keep_with = match (&item, items.peek()) {
                (LayoutItem::Subheading { .. }, Some(next)) if !matches!(next, LayoutItem::Gap(_)) => {
                    next.height(&self.metrics)
                }
                _ => 0.0,
            };
            if used + height + keep_with > capacity && !page.items.is_empty() {
                let number = page.number + 1;
                pages.push(std::mem::replace(
                    &mut page,
                    CardPage::new(section, number, true),
                ));
                capacity = self.metrics.body_capacity(&self.geometry, true);
                used = 0.0;
                if is_gap {
                    continue;
                }
            }
            page.items.push(PlacedItem { offset: used, item });
            used += height;
        }

        pages.push(page);
        pages
    }

    /// Flatten a card into layout items: body blocks first, then sub-cards.
    pub fn section_items(&self, section: &Section) -> Vec<LayoutItem> {
        let mut items = Vec::new();
        for block in &section.body {
            self.block_items(block, &mut items);
        }
        for sub in &section.subsections {
            items.push(LayoutItem::Subheading {
                text: inline::to_plain(&sub.title),
            });
            for block in &sub.body {
                self.block_items(block, &mut items);
            }
        }
        items
    }

    fn block_items(&self, block: &Block, items: &mut Vec<LayoutItem>) {
        let m = &self.metrics;
        let width = m.wrap_width(&self.geometry);

        match block {
            Block::Paragraph { text } => {
                self.push_lines(text, width, LineStyle::Body, items);
            }
            Block::Blockquote { text } => {
                self.push_lines(text, width - m.indent, LineStyle::Quote, items);
            }
            Block::List { items: entries } => {
                for entry in entries {
                    let lines = wrap_text(
                        self.measurer,
                        &inline::to_plain(entry),
                        m.body_size,
                        width - m.indent,
                    );
                    for (i, text) in lines.into_iter().enumerate() {
                        let style = if i == 0 {
                            LineStyle::Bullet
                        } else {
                            LineStyle::BulletContinuation
                        };
                        items.push(LayoutItem::Line { text, style });
                    }
                }
            }
            Block::Table(table) => {
                for (i, row) in table.rows.iter().enumerate() {
                    let style = if i < table.header_rows {
                        LineStyle::TableHeader
                    } else {
                        LineStyle::TableRow
                    };
                    let text = row
                        .iter()
                        .map(|c| inline::to_plain(c))
                        .collect::<Vec<_>>()
                        .join("  |  ");
                    for line in wrap_text(self.measurer, &text, m.body_size, width) {
                        items.push(LayoutItem::Line { text: line, style });
                    }
                }
            }
            Block::Code { text } => {
                let all: Vec<&str> = text.lines().collect();
                if all.len() > m.code_max_lines {
                    log::debug!(
                        "Code block has {} lines; dropping {} beyond {}",
                        all.len(),
                        all.len() - m.code_max_lines,
                        m.code_max_lines
                    );
                }
                let box_width = width - 20.0;
                let lines = all
                    .into_iter()
                    .take(m.code_max_lines)
                    .map(|l| self.fit_code(&l.replace('\t', "    "), box_width))
                    .collect();
                items.push(LayoutItem::Code { lines });
            }
            Block::Diagram { steps } => {
                let mut number = 0;
                for step in steps {
                    if step.is_connector {
                        items.push(LayoutItem::Connector);
                    } else {
                        number += 1;
                        items.push(LayoutItem::Step {
                            label: self.fit_body(&inline::to_plain(&step.label), width - 80.0),
                            role: step.role,
                            number,
                        });
                    }
                }
            }
        }
        items.push(LayoutItem::Gap(m.block_gap));
    }

    fn push_lines(&self, text: &str, width: f32, style: LineStyle, items: &mut Vec<LayoutItem>) {
        let plain = inline::to_plain(text);
        for line in wrap_text(self.measurer, &plain, self.metrics.body_size, width) {
            items.push(LayoutItem::Line { text: line, style });
        }
    }

    /// Truncate a code line to the code box.
    fn fit_code(&self, line: &str, max_width: f32) -> String {
        let size = self.metrics.code_size;
        truncate_to_width(line, max_width, false, |t| self.measurer.code_width(t, size))
    }

    /// Truncate body text with an ellipsis.
    fn fit_body(&self, text: &str, max_width: f32) -> String {
        let size = self.metrics.body_size;
        truncate_to_width(text, max_width, true, |t| self.measurer.text_width(t, size))
    }
}
