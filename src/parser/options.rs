//! Parsing options and configuration.

use crate::detect::InputFormat;

/// Options for parsing card markup.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Force an input format instead of detecting it
    pub format: Option<InputFormat>,

    /// Skip `<div dir="rtl">` / `</div>` wrapper lines in Markdown
    pub strip_rtl_wrappers: bool,

    /// Apply Unicode NFC normalization before parsing
    pub normalize: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (recover from malformed structure).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable strict mode (report malformed structure as an error).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Force the input format.
    pub fn with_format(mut self, format: InputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Enable or disable RTL wrapper stripping.
    pub fn with_rtl_wrappers_stripped(mut self, strip: bool) -> Self {
        self.strip_rtl_wrappers = strip;
        self
    }

    /// Enable or disable NFC normalization.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            format: None,
            strip_rtl_wrappers: true,
            normalize: true,
        }
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Report malformed structure as [`Error::Malformed`](crate::Error::Malformed)
    Strict,
    /// Recover from malformed structure and continue
    #[default]
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_builder() {
        let options = ParseOptions::new()
            .strict()
            .with_format(InputFormat::Html)
            .with_normalize(false);

        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.format, Some(InputFormat::Html));
        assert!(!options.normalize);
        assert!(options.strip_rtl_wrappers);
    }

    #[test]
    fn test_parse_options_default_is_lenient() {
        let options = ParseOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert!(options.format.is_none());
    }
}
