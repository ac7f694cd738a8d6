//! Input format detection.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported input markup formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Markdown with `#`-level headings and fenced code
    Markdown,
    /// HTML with `card`-classed containers
    Html,
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Markdown => write!(f, "Markdown"),
            InputFormat::Html => write!(f, "HTML"),
        }
    }
}

/// File extensions accepted by batch conversion.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["md", "markdown", "html", "htm"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Bytes inspected when sniffing content.
const SNIFF_LEN: usize = 1024;

/// Map a file extension to an input format.
pub fn format_from_extension(ext: &str) -> Option<InputFormat> {
    match ext.to_ascii_lowercase().as_str() {
        "md" | "markdown" => Some(InputFormat::Markdown),
        "html" | "htm" => Some(InputFormat::Html),
        _ => None,
    }
}

/// Detect the input format from a file path.
///
/// The extension decides when it is known; otherwise the leading bytes of the
/// file are sniffed.
///
/// # Example
/// ```no_run
/// use cardbook::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("guide.md").unwrap();
/// println!("Input: {}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<InputFormat> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }
    if let Some(format) = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(format_from_extension)
    {
        return Ok(format);
    }
    let data = std::fs::read(path)?;
    detect_format_from_bytes(&data)
}

/// Detect the input format from content.
///
/// # Returns
/// * `Ok(InputFormat::Html)` if the content looks like an HTML document or fragment
/// * `Ok(InputFormat::Markdown)` for any other UTF-8 text
/// * `Err(Error::UnknownFormat)` for empty or non-UTF-8 data
pub fn detect_format_from_bytes(data: &[u8]) -> Result<InputFormat> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let head = &data[..data.len().min(SNIFF_LEN)];
    let text = match std::str::from_utf8(head) {
        Ok(t) => t,
        // A multi-byte sequence may be cut at the sniff boundary.
        Err(e) if e.valid_up_to() > 0 && head.len() == SNIFF_LEN => {
            std::str::from_utf8(&head[..e.valid_up_to()]).map_err(|_| Error::UnknownFormat)?
        }
        Err(_) => return Err(Error::UnknownFormat),
    };

    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Err(Error::UnknownFormat);
    }

    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("<!doctype html") || lower.starts_with("<html") {
        return Ok(InputFormat::Html);
    }
    if lower.contains("class=\"card") && !lower.starts_with('#') {
        return Ok(InputFormat::Html);
    }
    Ok(InputFormat::Markdown)
}

/// Check if a path has a supported input extension.
pub fn is_supported_path<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .and_then(format_from_extension)
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_markdown() {
        let format = detect_format_from_bytes(b"# Title\n\n## Card\ntext").unwrap();
        assert_eq!(format, InputFormat::Markdown);
    }

    #[test]
    fn test_detect_html() {
        let format = detect_format_from_bytes(b"<!DOCTYPE html><html></html>").unwrap();
        assert_eq!(format, InputFormat::Html);

        let format =
            detect_format_from_bytes(b"  <div class=\"card\"><h2>A</h2></div>").unwrap();
        assert_eq!(format, InputFormat::Html);
    }

    #[test]
    fn test_detect_with_bom() {
        let format = detect_format_from_bytes(b"\xEF\xBB\xBF<html><body></body></html>").unwrap();
        assert_eq!(format, InputFormat::Html);
    }

    #[test]
    fn test_detect_empty() {
        assert!(matches!(
            detect_format_from_bytes(b""),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            detect_format_from_bytes(b"   \n\t"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_binary() {
        let data = [0xFF, 0xFE, 0x00, 0x01, 0x02];
        assert!(matches!(
            detect_format_from_bytes(&data),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(format_from_extension("MD"), Some(InputFormat::Markdown));
        assert_eq!(format_from_extension("htm"), Some(InputFormat::Html));
        assert_eq!(format_from_extension("pdf"), None);
    }

    #[test]
    fn test_detect_from_path_sniffs_unknown_extension() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "<html><body><div class=\"card\"></div></body></html>").unwrap();
        let format = detect_format_from_path(file.path()).unwrap();
        assert_eq!(format, InputFormat::Html);
    }

    #[test]
    fn test_detect_missing_path() {
        let result = detect_format_from_path("/definitely/not/here.md");
        assert!(matches!(result, Err(Error::InputNotFound(_))));
    }

    #[test]
    fn test_is_supported_path() {
        assert!(is_supported_path("a/b/guide.markdown"));
        assert!(!is_supported_path("a/b/guide.pdf"));
        assert!(!is_supported_path("README"));
    }
}
