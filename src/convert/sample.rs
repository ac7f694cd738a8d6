//! Built-in sample document for the `--test` mode.

use std::fs;
use std::path::Path;

use super::batch::{convert_file, ConversionOutcome};
use super::{ConvertOptions, ConverterRegistry, OutputFormat};

/// Two cards, the second with a role-coloured workflow diagram.
pub const SAMPLE_MARKDOWN: &str = r##"# Sample Card Book

## Getting Started
Cards are separated by second-level headings and may use **bold** and `code`.
- Each card starts on its own page
- Long cards continue on following pages

```python
def greet(name):
    return f"Hello, {name}"
```

## Request Flow
#### Overview
A request passes through the agents in order:

```
┌────────────────────────────┐
│ 👤 User sends a request →  │
└────────────────────────────┘
              ↓
┌────────────────────────────┐
│ 🎼 Orchestrator routes it → │
└────────────────────────────┘
              ↓
┌────────────────────────────┐
│ 📋 Planner splits work →   │
└────────────────────────────┘
              ↓
┌────────────────────────────┐
│ ⚙ Executor calls tools →   │
└────────────────────────────┘
              ↓
┌────────────────────────────┐
│ 📊 Result is returned →    │
└────────────────────────────┘
```
"##;

/// Write the sample document to `dir` and convert it to PDF and carousel HTML.
///
/// The first outcome is for the PDF, the second for the HTML.
pub fn convert_sample(
    registry: &ConverterRegistry,
    dir: &Path,
    options: &ConvertOptions,
) -> Vec<ConversionOutcome> {
    let input = dir.join("sample.md");
    if let Err(e) = fs::create_dir_all(dir).and_then(|_| fs::write(&input, SAMPLE_MARKDOWN)) {
        return vec![ConversionOutcome::failed(format!(
            "Cannot write sample to {}: {}",
            dir.display(),
            e
        ))];
    }

    [OutputFormat::Pdf, OutputFormat::Carousel]
        .into_iter()
        .map(|format| {
            let output = dir.join(format!("sample_carousel.{}", format.extension()));
            let options = options.clone().with_format(format);
            convert_file(registry, &input, Some(&output), &options)
        })
        .collect()
}
