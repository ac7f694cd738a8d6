//! Analysis mode: parse and paginate without rendering.

use crate::detect::{self, InputFormat};
use crate::error::{Error, Result};
use crate::layout::{Paginator, TextMeasurer};
use crate::parser;
use crate::render::DocumentStats;
use std::path::{Path, PathBuf};

use super::batch::batch_inputs;
use super::ConvertOptions;

/// Statistics of one analysed file.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Analysed file
    pub path: PathBuf,

    /// Detected input format
    pub format: InputFormat,

    /// Counts and page numbers
    pub stats: DocumentStats,
}

/// Parse a file and lay it out to find the page each card starts on.
pub fn analyze_file(
    path: &Path,
    options: &ConvertOptions,
    measurer: &dyn TextMeasurer,
) -> Result<Analysis> {
    let format = match options.parse.format {
        Some(format) => format,
        None => detect::detect_format_from_path(path)?,
    };
    let parse_opts = options.parse.clone().with_format(format);
    let doc = parser::parse_path(path, &parse_opts)?;

    let pagination = Paginator::new(measurer)
        .with_geometry(options.render.geometry)
        .with_metrics(options.render.metrics)
        .paginate(&doc);

    Ok(Analysis {
        path: path.to_path_buf(),
        format,
        stats: DocumentStats::collect(&doc, Some(&pagination)),
    })
}

/// Analyse a file, or every Markdown and HTML file of a directory.
///
/// Per-file failures are returned alongside their path; only a missing
/// path fails the whole call.
pub fn analyze_path(
    path: &Path,
    options: &ConvertOptions,
    measurer: &dyn TextMeasurer,
) -> Result<Vec<(PathBuf, Result<Analysis>)>> {
    if !path.exists() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }

    let files = if path.is_dir() {
        batch_inputs(path)?
    } else {
        vec![path.to_path_buf()]
    };

    Ok(files
        .into_iter()
        .map(|file| {
            let analysis = analyze_file(&file, options, measurer);
            (file, analysis)
        })
        .collect())
}
