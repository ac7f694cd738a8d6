//! # cardbook
//!
//! Converts card-structured Markdown or card HTML into a paginated PDF with a
//! linked table of contents, or into an HTML carousel.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cardbook::{parse_file, render, FontLibrary};
//!
//! fn main() -> cardbook::Result<()> {
//!     // Parse a card document
//!     let doc = parse_file("guide.md")?;
//!
//!     // Lay it out and compose a PDF
//!     let fonts = FontLibrary::system();
//!     let pdf = render::to_pdf(&doc, &fonts, &render::RenderOptions::default())?;
//!     std::fs::write("guide_carousel.pdf", pdf)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Two inputs**: `##`-sectioned Markdown and `div.card` HTML parse to the same tree
//! - **Two-pass PDF layout**: TOC page numbers are resolved before any page is drawn
//! - **Navigation**: TOC links, previous/next/TOC footer links and bookmarks
//! - **Diagrams**: box-drawing flow charts become role-coloured steps
//! - **RTL support**: Arabic shaping and bidirectional reordering

pub mod convert;
pub mod detect;
pub mod error;
pub mod layout;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use convert::{
    convert_batch, convert_file, ConversionOutcome, ConvertOptions, ConvertResult,
    ConverterRegistry, DocumentConverter, OutputFormat,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, InputFormat};
pub use error::{Error, Result};
pub use layout::{FontLibrary, PageAssignment, PageGeometry, Pagination, Paginator, TextMeasurer};
pub use model::{Block, DiagramStep, Document, Metadata, Section, StepRole, Subsection, Table};
pub use parser::{parse_str, ErrorMode, ParseOptions};
pub use render::{Direction, DocumentStats, JsonFormat, Labels, RenderOptions};

use std::path::Path;

/// Parse a Markdown or card HTML file into a document.
///
/// # Example
///
/// ```no_run
/// use cardbook::parse_file;
///
/// let doc = parse_file("guide.md").unwrap();
/// println!("Cards: {}", doc.card_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    parser::parse_path(path, &ParseOptions::default())
}

/// Parse a file with custom options.
///
/// # Example
///
/// ```no_run
/// use cardbook::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().strict();
/// let doc = parse_file_with_options("guide.md", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    parser::parse_path(path, &options)
}

/// Convert a file to PDF bytes using the first available system font.
///
/// # Example
///
/// ```no_run
/// let pdf = cardbook::to_pdf("guide.md").unwrap();
/// std::fs::write("guide_carousel.pdf", pdf).unwrap();
/// ```
pub fn to_pdf<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    Cardbook::new().with_system_fonts().parse(path)?.to_pdf()
}

/// Convert a file to a self-contained HTML carousel.
pub fn to_carousel<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(Cardbook::new().parse(path)?.to_carousel())
}

/// Convert a file to scrolling card HTML.
pub fn to_html<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(Cardbook::new().parse(path)?.to_html())
}

/// Convert a file to JSON, with the page each card starts on.
///
/// # Example
///
/// ```no_run
/// use cardbook::{to_json, JsonFormat};
///
/// let json = to_json("guide.md", JsonFormat::Pretty).unwrap();
/// std::fs::write("guide.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    Cardbook::new().parse(path)?.to_json(format)
}

/// Builder for parsing and converting card documents.
///
/// # Example
///
/// ```no_run
/// use cardbook::Cardbook;
///
/// let pdf = Cardbook::new()
///     .strict()
///     .rtl()
///     .with_system_fonts()
///     .parse("guide.md")?
///     .to_pdf()?;
/// # Ok::<(), cardbook::Error>(())
/// ```
pub struct Cardbook {
    parse_options: ParseOptions,
    render_options: RenderOptions,
    fonts: FontLibrary,
}

impl Cardbook {
    /// Create a new builder measuring with the built-in fonts.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
            fonts: FontLibrary::builtin(),
        }
    }

    /// Recover from malformed structure (default).
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Report malformed structure as an error.
    pub fn strict(mut self) -> Self {
        self.parse_options = self.parse_options.strict();
        self
    }

    /// Force the input format instead of detecting it.
    pub fn with_format(mut self, format: InputFormat) -> Self {
        self.parse_options = self.parse_options.with_format(format);
        self
    }

    /// Force right-to-left layout.
    pub fn rtl(mut self) -> Self {
        self.render_options = self.render_options.rtl();
        self
    }

    /// Force left-to-right layout.
    pub fn ltr(mut self) -> Self {
        self.render_options = self.render_options.ltr();
        self
    }

    /// Override the navigation and TOC strings.
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.render_options = self.render_options.with_labels(labels);
        self
    }

    /// Set the page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.render_options = self.render_options.with_geometry(geometry);
        self
    }

    /// Enable or disable PDF bookmarks.
    pub fn with_bookmarks(mut self, bookmarks: bool) -> Self {
        self.render_options = self.render_options.with_bookmarks(bookmarks);
        self
    }

    /// Use a prepared font library.
    pub fn with_fonts(mut self, fonts: FontLibrary) -> Self {
        self.fonts = fonts;
        self
    }

    /// Register the first usable system font.
    pub fn with_system_fonts(mut self) -> Self {
        self.fonts = FontLibrary::system();
        self
    }

    /// Parse a file and return a result wrapper.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<CardbookResult> {
        let document = parser::parse_path(path, &self.parse_options)?;
        Ok(self.into_result(document))
    }

    /// Parse markup text.
    pub fn parse_str(self, text: &str) -> Result<CardbookResult> {
        let document = parser::parse_str(text, &self.parse_options)?;
        Ok(self.into_result(document))
    }

    fn into_result(self, document: Document) -> CardbookResult {
        CardbookResult {
            document,
            render_options: self.render_options,
            fonts: self.fonts,
        }
    }
}

impl Default for Cardbook {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing a card document.
pub struct CardbookResult {
    /// The parsed document
    pub document: Document,
    /// Render options to use
    render_options: RenderOptions,
    fonts: FontLibrary,
}

impl CardbookResult {
    /// Resolve page numbers without composing.
    pub fn paginate(&self) -> Pagination {
        Paginator::new(&self.fonts)
            .with_geometry(self.render_options.geometry)
            .with_metrics(self.render_options.metrics)
            .paginate(&self.document)
    }

    /// Compose the PDF.
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        let pagination = self.paginate();
        render::compose_pdf(&self.document, &pagination, &self.fonts, &self.render_options)
    }

    /// Render the HTML carousel.
    pub fn to_carousel(&self) -> String {
        render::to_carousel(&self.document, &self.render_options)
    }

    /// Render scrolling card HTML.
    pub fn to_html(&self) -> String {
        render::to_html(&self.document, &self.render_options)
    }

    /// Convert to JSON, with the page each card starts on.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        let pagination = self.paginate();
        render::to_json(&self.document, Some(&pagination.assignment), format)
    }

    /// Counts and page numbers.
    pub fn stats(&self) -> DocumentStats {
        DocumentStats::collect(&self.document, Some(&self.paginate()))
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUIDE: &str = "# Guide\n## One\nFirst\n## Two\nSecond\n";

    #[test]
    fn test_cardbook_builder() {
        let builder = Cardbook::new().strict().rtl().with_bookmarks(false);
        assert_eq!(builder.parse_options.error_mode, ErrorMode::Strict);
        assert_eq!(builder.render_options.direction, Direction::Rtl);
        assert!(!builder.render_options.bookmarks);
        assert!(builder.fonts.is_builtin());
    }

    #[test]
    fn test_cardbook_builder_default() {
        let builder = Cardbook::default();
        assert_eq!(builder.parse_options.error_mode, ErrorMode::Lenient);
        assert_eq!(builder.render_options.direction, Direction::Auto);
    }

    #[test]
    fn test_parse_str_outputs() {
        let result = Cardbook::new().parse_str(GUIDE).unwrap();
        assert_eq!(result.document().card_count(), 2);
        assert!(result.to_pdf().unwrap().starts_with(b"%PDF"));
        assert!(result.to_carousel().contains("id=\"card-2\""));
        assert!(result.to_html().contains("class=\"card\""));
    }

    #[test]
    fn test_json_carries_pages() {
        let result = Cardbook::new().parse_str(GUIDE).unwrap();
        let json = result.to_json(JsonFormat::Compact).unwrap();
        assert!(json.contains("\"assigned_page\":2"));
        assert!(json.contains("\"assigned_page\":3"));
        assert_eq!(result.document().sections[0].assigned_page, None);
    }

    #[test]
    fn test_stats() {
        let stats = Cardbook::new().parse_str(GUIDE).unwrap().stats();
        assert_eq!(stats.total_pages, 3);
        assert_eq!(stats.cards[0].start_page, Some(2));
    }

    #[test]
    fn test_strict_empty_input() {
        let result = Cardbook::new().strict().parse_str("no cards here\n");
        assert!(matches!(result, Err(Error::EmptyDocument)));
    }

    #[test]
    fn test_parse_missing_file() {
        let result = parse_file("/nonexistent/guide.md");
        assert!(matches!(result, Err(Error::InputNotFound(_))));
    }
}
