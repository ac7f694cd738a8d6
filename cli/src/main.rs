//! cardbook CLI - card Markdown/HTML to PDF and HTML carousel converter

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use cardbook::convert::{
    analyze_path, batch_inputs, convert_batch_with, convert_sample, Analysis, ConversionOutcome,
};
use cardbook::{convert_file, ConvertOptions, ConverterRegistry, FontLibrary};

#[derive(Parser)]
#[command(name = "cardbook")]
#[command(version)]
#[command(about = "Convert card Markdown or HTML to a navigable PDF or HTML carousel", long_about = None)]
struct Cli {
    /// Input Markdown or HTML file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (`<stem>_carousel.pdf` if not specified; .html selects the carousel)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Convert every .md/.html file of a directory: DIR [OUTPUT_DIR]
    #[arg(long, value_name = "DIR", num_args = 1..=2)]
    batch: Option<Vec<PathBuf>>,

    /// Convert a built-in sample document
    #[arg(long)]
    test: bool,

    /// Print card and page statistics of a file or directory
    #[arg(long, value_name = "PATH")]
    analyze: Option<PathBuf>,

    /// TrueType font to embed (tried in order before system fonts)
    #[arg(long, value_name = "TTF")]
    font: Vec<PathBuf>,

    /// Print analysis results as JSON as well
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one file
    Convert {
        /// Input Markdown or HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    // Failures are printed; the exit status is always 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return;
        }
    };
    let options = ConvertOptions::new();

    match cli.command {
        Some(Commands::Convert { input, output }) => {
            let registry = registry(&cli.font);
            cmd_convert(&registry, &input, output.as_deref(), &options);
        }
        Some(Commands::Version) => cmd_version(),
        None => {
            if let Some(paths) = cli.batch.as_deref() {
                let registry = registry(&cli.font);
                cmd_batch(&registry, &paths[0], paths.get(1).map(PathBuf::as_path), &options);
            } else if cli.test {
                cmd_test(&registry(&cli.font), &options);
            } else if let Some(path) = cli.analyze.as_deref() {
                cmd_analyze(path, &fonts(&cli.font), &options, cli.verbose);
            } else if let Some(input) = cli.input.as_deref() {
                cmd_convert(&registry(&cli.font), input, cli.output.as_deref(), &options);
            } else {
                println!("{}", "Usage: cardbook <FILE> [OUTPUT]".yellow());
                println!("       cardbook --batch <DIR> [OUTPUT_DIR]");
                println!("       cardbook --test");
                println!("       cardbook --analyze <FILE|DIR>");
                println!("       cardbook --help for more information");
            }
        }
    }
}

/// Register the requested fonts, falling back to system fonts.
fn fonts(candidates: &[PathBuf]) -> FontLibrary {
    if !candidates.is_empty() {
        let mut library = FontLibrary::builtin();
        if library.register_candidates(candidates).is_some() {
            return library;
        }
        eprintln!(
            "{} none of the given fonts could be loaded; trying system fonts",
            "Warning:".yellow().bold()
        );
    }
    FontLibrary::system()
}

fn registry(candidates: &[PathBuf]) -> ConverterRegistry {
    ConverterRegistry::with_fonts(Arc::new(fonts(candidates)))
}

fn print_outcome(outcome: &ConversionOutcome) {
    if outcome.success {
        println!("{} {}", "Converted".green().bold(), outcome.message);
    } else {
        println!("{} {}", "Failed".red().bold(), outcome.message);
    }
}

fn cmd_convert(
    registry: &ConverterRegistry,
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
) {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Converting {}...", input.display()));
    let outcome = convert_file(registry, input, output, options);
    spinner.finish_and_clear();
    print_outcome(&outcome);
}

fn cmd_batch(
    registry: &ConverterRegistry,
    dir: &Path,
    output_dir: Option<&Path>,
    options: &ConvertOptions,
) {
    let total = batch_inputs(dir).map(|inputs| inputs.len()).unwrap_or(0);

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid progress template")
            .progress_chars("#>-"),
    );

    let report = convert_batch_with(registry, dir, output_dir, options, |input, outcome| {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if outcome.success {
            pb.set_message(name);
        } else {
            pb.println(format!("{} {}", "Failed".red().bold(), outcome.message));
        }
        pb.inc(1);
    });
    pb.finish_and_clear();

    if let Some(error) = &report.error {
        println!("{} {}", "Error:".red().bold(), error);
        return;
    }
    if report.total() == 0 {
        println!("{} no Markdown or HTML files in {}", "Nothing to do:".yellow(), dir.display());
        return;
    }

    println!("\n{}", "Output files:".green().bold());
    let written: Vec<&ConversionOutcome> = report
        .results
        .iter()
        .map(|(_, outcome)| outcome)
        .filter(|outcome| outcome.success)
        .collect();
    for (i, outcome) in written.iter().enumerate() {
        let branch = if i + 1 == written.len() { "└─" } else { "├─" };
        if let Some(path) = &outcome.output {
            println!("  {} {}", branch.dimmed(), path.display());
        }
    }

    let summary = report.summary();
    if report.is_success() {
        println!("\n{} {}", "Done!".green().bold(), summary);
    } else {
        println!("\n{} {}", "Done with failures:".yellow().bold(), summary);
    }
}

fn cmd_test(registry: &ConverterRegistry, options: &ConvertOptions) {
    let dir = std::env::temp_dir().join(format!("cardbook_test_{}", std::process::id()));
    println!("{} {}", "Sample output in".cyan(), dir.display());

    for outcome in convert_sample(registry, &dir, options) {
        print_outcome(&outcome);
        if let Some(path) = &outcome.output {
            println!(
                "  {} {} ({} bytes)",
                "└─".dimmed(),
                path.display(),
                outcome.bytes_written
            );
        }
    }
}

fn cmd_analyze(path: &Path, fonts: &FontLibrary, options: &ConvertOptions, verbose: bool) {
    let results = match analyze_path(path, options, fonts) {
        Ok(results) => results,
        Err(e) => {
            println!("{} {}", "Error:".red().bold(), e);
            return;
        }
    };
    if results.is_empty() {
        println!("{} no Markdown or HTML files in {}", "Nothing to do:".yellow(), path.display());
        return;
    }

    for (file, analysis) in results {
        match analysis {
            Ok(analysis) => print_analysis(&analysis, verbose),
            Err(e) => println!("{} {}: {}", "Failed".red().bold(), file.display(), e),
        }
        println!();
    }
}

fn print_analysis(analysis: &Analysis, verbose: bool) {
    let stats = &analysis.stats;

    println!("{}", "Document Analysis".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), analysis.path.display());
    println!("{}: {}", "Format".bold(), analysis.format);
    println!("{}: {}", "Title".bold(), stats.title);
    println!("{}: {}", "Cards".bold(), stats.card_count);
    println!("{}: {}", "Sub-cards".bold(), stats.subsection_count);
    println!("{}: {}", "TOC pages".bold(), stats.toc_page_count);
    println!("{}: {}", "Total pages".bold(), stats.total_pages);
    println!("{}: {}", "Words".bold(), stats.blocks.word_count);

    if !stats.cards.is_empty() {
        println!();
        println!("{}", "Cards".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
    }
    for card in &stats.cards {
        let page = card
            .start_page
            .map(|p| format!("page {p}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>3}. {} {}",
            card.index + 1,
            card.title.bold(),
            format!("({page}, {} pages)", card.page_count).dimmed()
        );
        println!(
            "     blocks {}, sub-cards {}, code {}, diagrams {}, tables {}",
            card.blocks.block_count(),
            card.subsection_count,
            card.blocks.code_count,
            card.blocks.diagram_count,
            card.blocks.table_count
        );
    }

    if verbose {
        match serde_json::to_string_pretty(stats) {
            Ok(json) => println!("{json}"),
            Err(e) => println!("{} {}", "Error:".red().bold(), e),
        }
    }
}

fn cmd_version() {
    println!("{} {}", "cardbook".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Card Markdown/HTML to PDF and HTML carousel converter");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_convert() {
        let cli = Cli::try_parse_from(["cardbook", "guide.md", "guide.html"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("guide.md")));
        assert_eq!(cli.output, Some(PathBuf::from("guide.html")));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_batch_with_output_dir() {
        let cli = Cli::try_parse_from(["cardbook", "--batch", "docs", "out"]).unwrap();
        assert_eq!(
            cli.batch,
            Some(vec![PathBuf::from("docs"), PathBuf::from("out")])
        );
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_convert_subcommand() {
        let cli = Cli::try_parse_from(["cardbook", "convert", "guide.md"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Convert { ref input, output: None }) if input == Path::new("guide.md")
        ));
    }

    #[test]
    fn test_usage_errors_are_returned() {
        assert!(Cli::try_parse_from(["cardbook", "--batch"]).is_err());
        let err = Cli::try_parse_from(["cardbook", "--bogus"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_analyze_and_fonts() {
        let cli = Cli::try_parse_from([
            "cardbook",
            "--analyze",
            "docs",
            "--font",
            "a.ttf",
            "--font",
            "b.ttf",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.analyze, Some(PathBuf::from("docs")));
        assert_eq!(cli.font.len(), 2);
        assert!(cli.verbose);
    }
}
