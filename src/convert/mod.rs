//! Conversion boundary: a plugin-style registry of input converters plus the
//! file, batch, analysis and sample entry points used by the CLI.
//!
//! Every converter parses its input into the card [`Document`] tree and
//! renders it in the requested [`OutputFormat`].
//!
//! # Example
//!
//! ```no_run
//! use cardbook::convert::{ConverterRegistry, ConvertOptions, OutputFormat};
//! use std::path::Path;
//!
//! fn main() -> cardbook::Result<()> {
//!     let registry = ConverterRegistry::with_defaults();
//!     let options = ConvertOptions::new().with_format(OutputFormat::Carousel);
//!     let result = registry.convert(Path::new("guide.md"), &options)?;
//!     std::fs::write("guide.html", &result.content)?;
//!     Ok(())
//! }
//! ```

mod analyze;
mod batch;
mod html;
mod markdown;
mod sample;

pub use analyze::{analyze_file, analyze_path, Analysis};
pub use batch::{
    batch_inputs, convert_batch, convert_batch_with, convert_file, default_output_path,
    BatchReport, ConversionOutcome, DEFAULT_BATCH_DIR,
};
pub use html::HtmlConverter;
pub use markdown::MarkdownConverter;
pub use sample::{convert_sample, SAMPLE_MARKDOWN};

use crate::detect::{self, InputFormat};
use crate::error::{Error, Result};
use crate::layout::{FontLibrary, Paginator};
use crate::model::{Document, Metadata};
use crate::parser::{self, ParseOptions};
use crate::render::{self, DocumentStats, JsonFormat, RenderOptions};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Options for document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Parsing options
    pub parse: ParseOptions,

    /// Rendering options
    pub render: RenderOptions,

    /// Whether to collect statistics during conversion
    pub collect_stats: bool,

    /// Output format
    pub output_format: OutputFormat,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set parsing options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Enable statistics collection.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// Output format for conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Paginated PDF with TOC and navigation
    #[default]
    Pdf,

    /// Scrolling card HTML
    Html,

    /// HTML carousel with one slide per card
    Carousel,

    /// JSON dump of the card tree
    Json,
}

impl OutputFormat {
    /// File extension written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Html | OutputFormat::Carousel => "html",
            OutputFormat::Json => "json",
        }
    }

    /// MIME type of the rendered bytes.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Html | OutputFormat::Carousel => "text/html",
            OutputFormat::Json => "application/json",
        }
    }

    /// Pick the format implied by an output path.
    ///
    /// `.html`/`.htm` selects the carousel, `.json` selects JSON.
    pub fn from_output_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(OutputFormat::Pdf),
            "html" | "htm" => Some(OutputFormat::Carousel),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Pdf => write!(f, "PDF"),
            OutputFormat::Html => write!(f, "HTML"),
            OutputFormat::Carousel => write!(f, "HTML carousel"),
            OutputFormat::Json => write!(f, "JSON"),
        }
    }
}

/// Result of document conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Rendered bytes
    pub content: Vec<u8>,

    /// Document title
    pub title: String,

    /// Number of cards rendered
    pub card_count: usize,

    /// Source document metadata
    pub metadata: Metadata,

    /// Document statistics (if collected)
    pub stats: Option<DocumentStats>,

    /// Format of the content
    pub format: OutputFormat,
}

impl ConvertResult {
    /// MIME type of the content.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }

    /// Content as text, for the HTML and JSON formats.
    pub fn as_text(&self) -> Option<&str> {
        match self.format {
            OutputFormat::Pdf => None,
            _ => std::str::from_utf8(&self.content).ok(),
        }
    }
}

/// Trait for document converters.
///
/// Implement this trait to add support for a new input markup.
pub trait DocumentConverter: Send + Sync {
    /// Get the supported file extensions for this converter.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["md"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this converter.
    fn name(&self) -> &str;

    /// Convert a file at the given path.
    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult>;

    /// Convert from bytes.
    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult>;

    /// Check if this converter supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for document converters.
///
/// The registry maps file extensions to converters and provides
/// convenient methods for converting documents.
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn DocumentConverter>>,
    by_name: HashMap<String, Arc<dyn DocumentConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the Markdown and HTML converters measuring
    /// with the built-in fonts.
    pub fn with_defaults() -> Self {
        Self::with_fonts(Arc::new(FontLibrary::builtin()))
    }

    /// Create a registry with the Markdown and HTML converters sharing a
    /// font library.
    pub fn with_fonts(fonts: Arc<FontLibrary>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MarkdownConverter::with_fonts(fonts.clone())));
        registry.register(Arc::new(HtmlConverter::with_fonts(fonts)));
        registry
    }

    /// Register a converter.
    ///
    /// The converter will be registered for all its supported extensions.
    pub fn register(&mut self, converter: Arc<dyn DocumentConverter>) {
        for ext in converter.supported_extensions() {
            self.converters
                .insert(ext.to_lowercase(), converter.clone());
        }
        self.by_name
            .insert(converter.name().to_lowercase(), converter);
    }

    /// Get a converter by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.converters.get(&ext.to_lowercase()).cloned()
    }

    /// Get a converter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.converters.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.converters.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Convert a file using the appropriate converter.
    ///
    /// Files with an unknown extension are sniffed.
    pub fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let by_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.get_by_extension(ext));

        let converter = match by_ext {
            Some(converter) => converter,
            None => {
                let format = detect::detect_format_from_path(path)?;
                self.get_by_name(&format.to_string())
                    .ok_or_else(|| Error::Other(format!("No converter for {} input", format)))?
            }
        };

        converter.convert(path, options)
    }

    /// Convert bytes using the specified extension to determine the converter.
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        ext: &str,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let converter = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::Other(format!("No converter for extension: {}", ext)))?;

        converter.convert_bytes(bytes, options)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Parse a file as a known input format.
fn parse_file_as(path: &Path, format: InputFormat, options: &ConvertOptions) -> Result<Document> {
    let parse_opts = options.parse.clone().with_format(format);
    parser::parse_path(path, &parse_opts)
}

/// Parse in-memory bytes as a known input format.
fn parse_bytes_as(bytes: &[u8], format: InputFormat, options: &ConvertOptions) -> Result<Document> {
    let text = std::str::from_utf8(bytes).map_err(|_| Error::UnknownFormat)?;
    parser::parse_str_as(text, format, &options.parse)
}

/// Render a parsed document in the requested output format.
fn render_document(
    doc: &Document,
    options: &ConvertOptions,
    fonts: &FontLibrary,
) -> Result<ConvertResult> {
    let format = options.output_format;
    let mut stats = None;

    let paginate = || {
        Paginator::new(fonts)
            .with_geometry(options.render.geometry)
            .with_metrics(options.render.metrics)
            .paginate(doc)
    };

    let content = match format {
        OutputFormat::Pdf => {
            let pagination = paginate();
            if options.collect_stats {
                stats = Some(DocumentStats::collect(doc, Some(&pagination)));
            }
            render::compose_pdf(doc, &pagination, fonts, &options.render)?
        }
        OutputFormat::Html => render::to_html(doc, &options.render).into_bytes(),
        OutputFormat::Carousel => render::to_carousel(doc, &options.render).into_bytes(),
        OutputFormat::Json => {
            let pagination = paginate();
            if options.collect_stats {
                stats = Some(DocumentStats::collect(doc, Some(&pagination)));
            }
            render::to_json(doc, Some(&pagination.assignment), JsonFormat::Pretty)?.into_bytes()
        }
    };

    if options.collect_stats && stats.is_none() {
        stats = Some(DocumentStats::collect(doc, None));
    }

    log::debug!(
        "Rendered '{}' as {}: {} bytes",
        doc.display_title(),
        format,
        content.len()
    );

    Ok(ConvertResult {
        content,
        title: doc.display_title().to_string(),
        card_count: doc.card_count(),
        metadata: doc.metadata.clone(),
        stats,
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_parse_options(ParseOptions::new().strict())
            .with_stats(true)
            .with_format(OutputFormat::Json);

        assert!(options.collect_stats);
        assert_eq!(options.output_format, OutputFormat::Json);
        assert_eq!(options.parse.error_mode, crate::parser::ErrorMode::Strict);
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(
            OutputFormat::from_output_path(Path::new("out.HTML")),
            Some(OutputFormat::Carousel)
        );
        assert_eq!(
            OutputFormat::from_output_path(Path::new("out.json")),
            Some(OutputFormat::Json)
        );
        assert_eq!(
            OutputFormat::from_output_path(Path::new("out.pdf")),
            Some(OutputFormat::Pdf)
        );
        assert_eq!(OutputFormat::from_output_path(Path::new("out")), None);
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = ConverterRegistry::with_defaults();
        assert!(registry.supports("md"));
        assert!(registry.supports("MARKDOWN"));
        assert!(registry.supports("htm"));
        assert!(!registry.supports("pdf"));
        assert_eq!(
            registry.supported_extensions(),
            vec!["htm", "html", "markdown", "md"]
        );
    }

    #[test]
    fn test_registry_get_by_name() {
        let registry = ConverterRegistry::with_defaults();
        assert_eq!(registry.get_by_name("Markdown").unwrap().name(), "markdown");
        assert_eq!(registry.get_by_name("HTML").unwrap().name(), "html");
    }

    #[test]
    fn test_convert_bytes_formats() {
        let registry = ConverterRegistry::with_defaults();
        let input = b"# Guide\n## One\nFirst card\n## Two\nSecond card\n";

        let pdf = registry
            .convert_bytes(input, "md", &ConvertOptions::new())
            .unwrap();
        assert!(pdf.content.starts_with(b"%PDF"));
        assert_eq!(pdf.card_count, 2);
        assert_eq!(pdf.mime_type(), "application/pdf");
        assert!(pdf.as_text().is_none());

        let json = registry
            .convert_bytes(input, "md", &ConvertOptions::new().with_format(OutputFormat::Json))
            .unwrap();
        assert!(json.as_text().unwrap().contains("\"main_title\": \"Guide\""));
    }

    #[test]
    fn test_stats_collected_with_pages() {
        let registry = ConverterRegistry::with_defaults();
        let options = ConvertOptions::new().with_stats(true);
        let result = registry
            .convert_bytes(b"## A\ntext\n## B\ntext\n", "md", &options)
            .unwrap();
        let stats = result.stats.unwrap();
        assert_eq!(stats.card_count, 2);
        assert_eq!(stats.total_pages, 3);
        assert_eq!(stats.cards[1].start_page, Some(3));
    }

    #[test]
    fn test_unknown_extension_errors() {
        let registry = ConverterRegistry::with_defaults();
        let err = registry
            .convert_bytes(b"x", "docx", &ConvertOptions::new())
            .unwrap_err();
        assert!(err.to_string().contains("docx"));
    }
}
