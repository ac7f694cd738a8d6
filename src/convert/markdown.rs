//! Markdown card converter.

use crate::detect::InputFormat;
use crate::error::Result;
use crate::layout::FontLibrary;
use std::path::Path;
use std::sync::Arc;

use super::{parse_bytes_as, parse_file_as, render_document, ConvertOptions, ConvertResult, DocumentConverter};

/// Markdown card converter.
///
/// Converts `##`-sectioned Markdown to PDF, HTML, carousel or JSON.
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    fonts: Arc<FontLibrary>,
}

impl MarkdownConverter {
    /// Create a converter measuring with the built-in fonts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter sharing a font library.
    pub fn with_fonts(fonts: Arc<FontLibrary>) -> Self {
        Self { fonts }
    }
}

impl DocumentConverter for MarkdownConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn name(&self) -> &str {
        "markdown"
    }

    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let doc = parse_file_as(path, InputFormat::Markdown, options)?;
        render_document(&doc, options, &self.fonts)
    }

    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
        let doc = parse_bytes_as(bytes, InputFormat::Markdown, options)?;
        render_document(&doc, options, &self.fonts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::OutputFormat;

    #[test]
    fn test_supported_extensions() {
        let converter = MarkdownConverter::new();
        assert!(converter.supports_extension("md"));
        assert!(converter.supports_extension("Markdown"));
        assert!(!converter.supports_extension("html"));
    }

    #[test]
    fn test_convert_bytes_to_carousel() {
        let options = ConvertOptions::new().with_format(OutputFormat::Carousel);
        let result = MarkdownConverter::new()
            .convert_bytes(b"# Book\n## Card\n**bold** text\n", &options)
            .unwrap();
        let html = result.as_text().unwrap();
        assert!(html.contains("<strong>bold</strong> text"));
        assert_eq!(result.title, "Book");
    }

    #[test]
    fn test_invalid_utf8() {
        let err = MarkdownConverter::new()
            .convert_bytes(&[0xff, 0xfe, 0x00], &ConvertOptions::new())
            .unwrap_err();
        assert!(matches!(err, crate::Error::UnknownFormat));
    }
}
