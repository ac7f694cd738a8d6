//! Single-file and batch conversion with boolean outcomes.
//!
//! These are the outermost calls: every error is turned into a
//! [`ConversionOutcome`] with a readable message, so a failing file never
//! aborts a batch.

use crate::detect::SUPPORTED_EXTENSIONS;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::{ConvertOptions, ConverterRegistry, OutputFormat};

/// Output directory name used by batch runs when none is given.
pub const DEFAULT_BATCH_DIR: &str = "pdfs";

/// Result of converting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    /// Whether the output was written
    pub success: bool,

    /// Human-readable status
    pub message: String,

    /// Path of the written output
    pub output: Option<PathBuf>,

    /// Size of the written output
    pub bytes_written: u64,
}

impl ConversionOutcome {
    fn converted(output: PathBuf, bytes_written: u64, message: String) -> Self {
        Self {
            success: true,
            message,
            output: Some(output),
            bytes_written,
        }
    }

    /// A failed conversion with a message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            output: None,
            bytes_written: 0,
        }
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Directory written to
    pub output_dir: PathBuf,

    /// Outcome per input file, in processing order
    pub results: Vec<(PathBuf, ConversionOutcome)>,

    /// Set when the batch could not start
    pub error: Option<String>,
}

impl BatchReport {
    /// Number of files converted successfully.
    pub fn converted(&self) -> usize {
        self.results.iter().filter(|(_, o)| o.success).count()
    }

    /// Number of files attempted.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Whether every file converted.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.converted() == self.total()
    }

    /// `k/n converted` line.
    pub fn summary(&self) -> String {
        match &self.error {
            Some(error) => error.clone(),
            None => format!("{}/{} converted", self.converted(), self.total()),
        }
    }
}

/// Default output file name for an input: `<stem>_carousel.<ext>`.
///
/// The name is relative, so it lands in the working directory unless joined
/// to a directory.
pub fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    PathBuf::from(format!("{}_carousel.{}", stem, format.extension()))
}

/// Convert one file, reporting the result instead of failing.
///
/// An `output` ending in `.html`/`.htm` selects the carousel and `.json`
/// selects JSON; without an output the default name is used.
pub fn convert_file(
    registry: &ConverterRegistry,
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
) -> ConversionOutcome {
    match try_convert_file(registry, input, output, options) {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("Conversion of {} failed: {}", input.display(), e);
            ConversionOutcome::failed(format!("{}: {}", input.display(), e))
        }
    }
}

fn try_convert_file(
    registry: &ConverterRegistry,
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
) -> Result<ConversionOutcome> {
    if !input.exists() {
        return Err(Error::InputNotFound(input.to_path_buf()));
    }

    let mut options = options.clone();
    if let Some(format) = output.and_then(OutputFormat::from_output_path) {
        // Keep scrolling HTML when the path only says "html".
        if format.extension() != options.output_format.extension() {
            options.output_format = format;
        }
    }
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(input, options.output_format),
    };

    let result = registry.convert(input, &options)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, &result.content)?;

    let bytes = result.content_len() as u64;
    log::info!(
        "Wrote {} ({} cards, {} bytes)",
        output.display(),
        result.card_count,
        bytes
    );
    let message = format!(
        "{} -> {} ({} cards, {} bytes)",
        input.display(),
        output.display(),
        result.card_count,
        bytes
    );
    Ok(ConversionOutcome::converted(output, bytes, message))
}

/// List the convertible files of a directory, sorted and non-recursive.
pub fn batch_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::InputNotFound(dir.to_path_buf()));
    }

    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .map_or(false, |e| SUPPORTED_EXTENSIONS.contains(&e.as_str()));
        if supported && path.is_file() {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// Convert every Markdown and HTML file of a directory.
///
/// Outputs go to `output_dir`, or `<dir>/pdfs` when unset.
pub fn convert_batch(
    registry: &ConverterRegistry,
    dir: &Path,
    output_dir: Option<&Path>,
    options: &ConvertOptions,
) -> BatchReport {
    convert_batch_with(registry, dir, output_dir, options, |_, _| {})
}

/// [`convert_batch`] with a callback after each file.
pub fn convert_batch_with<F>(
    registry: &ConverterRegistry,
    dir: &Path,
    output_dir: Option<&Path>,
    options: &ConvertOptions,
    mut on_file: F,
) -> BatchReport
where
    F: FnMut(&Path, &ConversionOutcome),
{
    let output_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.join(DEFAULT_BATCH_DIR));
    let mut report = BatchReport {
        output_dir: output_dir.clone(),
        ..Default::default()
    };

    let inputs = match batch_inputs(dir) {
        Ok(inputs) => inputs,
        Err(e) => {
            report.error = Some(format!("{}: {}", dir.display(), e));
            return report;
        }
    };
    if inputs.is_empty() {
        log::warn!("No Markdown or HTML files in {}", dir.display());
    }

    for input in inputs {
        let output = output_dir.join(default_output_path(&input, options.output_format));
        let outcome = convert_file(registry, &input, Some(&output), options);
        on_file(&input, &outcome);
        report.results.push((input, outcome));
    }

    log::info!("Batch {}: {}", dir.display(), report.summary());
    report
}
