//! Error types for cardbook library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cardbook operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while parsing, laying out or rendering a card book.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input file does not exist.
    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The input is neither card Markdown nor card HTML.
    #[error("Unknown input format: expected Markdown or card HTML")]
    UnknownFormat,

    /// The input markup nests headings or fences in an unsupported way.
    ///
    /// Only reported when parsing in [`ErrorMode::Strict`](crate::parser::ErrorMode::Strict);
    /// lenient parsing recovers instead.
    #[error("Malformed structure at line {line}: {message}")]
    Malformed {
        /// 1-based input line
        line: usize,
        /// What was wrong
        message: String,
    },

    /// The document has no cards to paginate.
    #[error("Document contains no cards")]
    EmptyDocument,

    /// A font could not be loaded or parsed.
    #[error("Font error: {0}")]
    Font(String),

    /// Layout could not place content.
    #[error("Layout error: {0}")]
    Layout(String),

    /// Error during rendering (HTML, carousel, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Error assembling or writing the PDF object graph.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a malformed-structure error.
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Error::Malformed {
            line,
            message: message.into(),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Pdf(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::EmptyDocument;
        assert_eq!(err.to_string(), "Document contains no cards");

        let err = Error::malformed(12, "subsection heading without a card");
        assert_eq!(
            err.to_string(),
            "Malformed structure at line 12: subsection heading without a card"
        );
    }

    #[test]
    fn test_input_not_found_display() {
        let err = Error::InputNotFound(PathBuf::from("missing.md"));
        assert_eq!(err.to_string(), "Input not found: missing.md");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
