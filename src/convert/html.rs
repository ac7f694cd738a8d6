//! Card HTML converter.

use crate::detect::InputFormat;
use crate::error::Result;
use crate::layout::FontLibrary;
use std::path::Path;
use std::sync::Arc;

use super::{parse_bytes_as, parse_file_as, render_document, ConvertOptions, ConvertResult, DocumentConverter};

/// Card HTML converter.
///
/// Reads HTML whose cards are `div.card` containers, such as a previously
/// rendered carousel, and re-renders it.
#[derive(Debug, Clone, Default)]
pub struct HtmlConverter {
    fonts: Arc<FontLibrary>,
}

impl HtmlConverter {
    /// Create a converter measuring with the built-in fonts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter sharing a font library.
    pub fn with_fonts(fonts: Arc<FontLibrary>) -> Self {
        Self { fonts }
    }
}

impl DocumentConverter for HtmlConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn name(&self) -> &str {
        "html"
    }

    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let doc = parse_file_as(path, InputFormat::Html, options)?;
        render_document(&doc, options, &self.fonts)
    }

    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
        let doc = parse_bytes_as(bytes, InputFormat::Html, options)?;
        render_document(&doc, options, &self.fonts)
    }
}
