//! Card markup parsing module.
//!
//! Markdown and card HTML both produce the same [`Document`] tree.

pub mod diagram;
mod dom;
mod html;
pub mod inline;
mod markdown;
mod options;
pub mod reflow;

pub use html::HtmlParser;
pub use markdown::{MarkdownParser, FALLBACK_SECTION_TITLE};
pub use options::{ErrorMode, ParseOptions};

use crate::detect::{self, InputFormat};
use crate::error::{Error, Result};
use crate::model::Document;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Parse markup text, detecting the format unless the options force one.
pub fn parse_str(text: &str, options: &ParseOptions) -> Result<Document> {
    let format = match options.format {
        Some(format) => format,
        None => detect::detect_format_from_bytes(text.as_bytes())?,
    };
    parse_str_as(text, format, options)
}

/// Parse markup text in a known format.
pub fn parse_str_as(text: &str, format: InputFormat, options: &ParseOptions) -> Result<Document> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let normalized;
    let text = if options.normalize {
        normalized = text.nfc().collect::<String>();
        normalized.as_str()
    } else {
        text
    };

    let doc = match format {
        InputFormat::Markdown => MarkdownParser::new(options.clone()).parse(text)?,
        InputFormat::Html => HtmlParser::new(options.clone()).parse(text)?,
    };
    if doc.is_empty() && options.error_mode == ErrorMode::Strict {
        return Err(Error::EmptyDocument);
    }
    log::debug!(
        "Parsed {} input: {} cards, {} blocks",
        format,
        doc.card_count(),
        doc.block_count()
    );
    Ok(doc)
}

/// Read and parse a markup file.
pub fn parse_path<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Document> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }
    let format = match options.format {
        Some(format) => format,
        None => detect::detect_format_from_path(path)?,
    };
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|_| Error::UnknownFormat)?;

    let mut doc = parse_str_as(&text, format, options)?;
    doc.metadata.source = Some(path.display().to_string());
    if doc.main_title.is_empty() {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            log::debug!("No top-level title; using file name '{stem}'");
            doc.main_title = stem.replace(['_', '-'], " ");
        }
    }
    Ok(doc)
}
