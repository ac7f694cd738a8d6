//! Rendering options and configuration.

use crate::layout::{LayoutMetrics, PageGeometry};
use crate::model::Document;
use serde::{Deserialize, Serialize};

/// JSON output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Indented
    #[default]
    Pretty,
    /// Single line
    Compact,
}

/// Base text direction of the rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Right-to-left when the document contains RTL text
    #[default]
    Auto,
    /// Right-to-left
    Rtl,
    /// Left-to-right
    Ltr,
}

impl Direction {
    /// Resolve `Auto` against a document.
    pub fn resolve(self, doc: &Document) -> Direction {
        match self {
            Direction::Auto if doc.has_rtl_text() => Direction::Rtl,
            Direction::Auto => Direction::Ltr,
            other => other,
        }
    }

    /// Whether this is right-to-left.
    pub fn is_rtl(self) -> bool {
        self == Direction::Rtl
    }

    /// Value of the HTML `dir` attribute.
    pub fn html_dir(self) -> &'static str {
        match self {
            Direction::Rtl => "rtl",
            Direction::Ltr => "ltr",
            Direction::Auto => "auto",
        }
    }
}

/// User-visible strings of navigation and TOC.
///
/// `page_indicator` and `toc_page` contain `{page}`/`{total}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub page_indicator: String,
    pub previous: String,
    pub next: String,
    pub toc: String,
    pub toc_title: String,
    pub toc_page: String,
    pub code: String,
    pub continued: String,
}

impl Labels {
    /// Arabic labels.
    pub fn arabic() -> Self {
        Self {
            page_indicator: "الصفحة {page} من {total}".to_string(),
            previous: "السابق".to_string(),
            next: "التالي".to_string(),
            toc: "الفهرس".to_string(),
            toc_title: "فهرس المحتويات".to_string(),
            toc_page: "صفحة {page}".to_string(),
            code: "الكود:".to_string(),
            continued: "(تابع)".to_string(),
        }
    }

    /// English labels.
    pub fn english() -> Self {
        Self {
            page_indicator: "Page {page} of {total}".to_string(),
            previous: "Previous".to_string(),
            next: "Next".to_string(),
            toc: "Contents".to_string(),
            toc_title: "Table of Contents".to_string(),
            toc_page: "Page {page}".to_string(),
            code: "Code:".to_string(),
            continued: "(cont.)".to_string(),
        }
    }

    /// "Page X of N" text.
    pub fn page_indicator(&self, page: u32, total: u32) -> String {
        self.page_indicator
            .replace("{page}", &page.to_string())
            .replace("{total}", &total.to_string())
    }

    /// Page number text of a TOC entry.
    pub fn toc_page(&self, page: u32) -> String {
        self.toc_page.replace("{page}", &page.to_string())
    }

    /// Header of a continuation page.
    pub fn continued_title(&self, title: &str) -> String {
        format!("{title} {}", self.continued)
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::arabic()
    }
}

/// Options for rendering a parsed document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Base text direction
    pub direction: Direction,

    /// Navigation strings; derived from the direction when unset
    pub labels: Option<Labels>,

    /// Page size and margins (PDF only)
    pub geometry: PageGeometry,

    /// Font sizes and line heights (PDF only)
    pub metrics: LayoutMetrics,

    /// Write a PDF outline with one entry per card
    pub bookmarks: bool,

    /// Deflate PDF content streams
    pub compress: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Force right-to-left.
    pub fn rtl(self) -> Self {
        self.with_direction(Direction::Rtl)
    }

    /// Force left-to-right.
    pub fn ltr(self) -> Self {
        self.with_direction(Direction::Ltr)
    }

    /// Use explicit labels.
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Set the page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the layout metrics.
    pub fn with_metrics(mut self, metrics: LayoutMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Enable or disable the PDF outline.
    pub fn with_bookmarks(mut self, bookmarks: bool) -> Self {
        self.bookmarks = bookmarks;
        self
    }

    /// Enable or disable content stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Labels for a resolved direction.
    ///
    /// Arabic labels need a Unicode font; with the built-in fonts the English
    /// set is used even for RTL documents.
    pub fn labels_for(&self, direction: Direction, unicode_font: bool) -> Labels {
        match &self.labels {
            Some(labels) => labels.clone(),
            None if direction.is_rtl() && unicode_font => Labels::arabic(),
            None => Labels::english(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Auto,
            labels: None,
            geometry: PageGeometry::default(),
            metrics: LayoutMetrics::default(),
            bookmarks: true,
            compress: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Section;

    #[test]
    fn test_direction_resolve() {
        let mut doc = Document::with_title("Guide");
        assert_eq!(Direction::Auto.resolve(&doc), Direction::Ltr);
        doc.push_section(Section::new("مقدمة", 0));
        assert_eq!(Direction::Auto.resolve(&doc), Direction::Rtl);
        assert_eq!(Direction::Ltr.resolve(&doc), Direction::Ltr);
    }

    #[test]
    fn test_labels() {
        let en = Labels::english();
        assert_eq!(en.page_indicator(3, 10), "Page 3 of 10");
        assert_eq!(en.toc_page(7), "Page 7");
        assert_eq!(Labels::arabic().page_indicator(2, 5), "الصفحة 2 من 5");
        assert_eq!(en.continued_title("Setup"), "Setup (cont.)");
    }

    #[test]
    fn test_labels_for() {
        let options = RenderOptions::new();
        assert_eq!(options.labels_for(Direction::Rtl, true), Labels::arabic());
        assert_eq!(options.labels_for(Direction::Rtl, false), Labels::english());
        assert_eq!(options.labels_for(Direction::Ltr, true), Labels::english());

        let custom = RenderOptions::new().with_labels(Labels::arabic());
        assert_eq!(custom.labels_for(Direction::Ltr, false), Labels::arabic());
    }
}
