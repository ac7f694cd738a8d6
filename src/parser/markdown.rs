//! Line-oriented Markdown card parser.
//!
//! Headings drive the tree: `#` sets the document title, `##`/`###` open a
//! card, `####` opens a sub-card. Fenced blocks are buffered and classified
//! as code or diagram when the fence closes. Plain lines are collected per
//! container and reflowed into blocks whenever the container receives a
//! fenced block or closes, so block order follows the source.

use super::options::{ErrorMode, ParseOptions};
use super::{diagram, reflow};
use crate::error::{Error, Result};
use crate::model::{Block, Document, Section, Subsection};

/// Title given to a card synthesized for an orphaned sub-card when the
/// document has no title either.
pub const FALLBACK_SECTION_TITLE: &str = "Introduction";

const FENCE: &str = "```";
const RTL_OPEN: &str = "<div dir=\"rtl\">";
const RTL_CLOSE: &str = "</div>";

/// Parser for card Markdown.
#[derive(Debug, Clone, Default)]
pub struct MarkdownParser {
    options: ParseOptions,
}

impl MarkdownParser {
    /// Create a parser with options.
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse Markdown text into a document.
    pub fn parse(&self, text: &str) -> Result<Document> {
        let mut builder = TreeBuilder::new(self.options.error_mode);
        let mut state = LineState::Outside;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;

            if line.trim_start().starts_with(FENCE) {
                state = match state {
                    LineState::Outside => LineState::InCode {
                        start_line: line_no,
                        buffer: Vec::new(),
                    },
                    LineState::InCode { buffer, .. } => {
                        builder.push_fenced(&buffer, line_no)?;
                        LineState::Outside
                    }
                };
                continue;
            }

            if let LineState::InCode { buffer, .. } = &mut state {
                buffer.push(line.to_string());
                continue;
            }

            if self.options.strip_rtl_wrappers {
                let trimmed = line.trim();
                if trimmed == RTL_OPEN || trimmed == RTL_CLOSE {
                    continue;
                }
            }

            match heading(line) {
                Some((1, title)) => builder.set_title(title),
                Some((2 | 3, title)) => builder.open_section(title),
                Some((4, title)) => builder.open_subsection(title, line_no)?,
                _ => builder.push_line(line),
            }
        }

        if let LineState::InCode { start_line, buffer } = state {
            if self.options.error_mode == ErrorMode::Strict {
                return Err(Error::malformed(start_line, "code fence is never closed"));
            }
            log::warn!("Code fence opened at line {start_line} is never closed; closing at end of input");
            builder.push_fenced(&buffer, start_line)?;
        }

        Ok(builder.finish())
    }
}

enum LineState {
    Outside,
    InCode {
        start_line: usize,
        buffer: Vec<String>,
    },
}

/// Split a heading line into level and text. Only `#` runs followed by a
/// space count.
fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if level == 0 {
        return None;
    }
    let rest = &line[level..];
    if !rest.starts_with(' ') {
        return None;
    }
    Some((level, rest.trim()))
}

/// A card or sub-card being filled, with raw lines not yet reflowed.
#[derive(Default)]
struct OpenContainer {
    title: String,
    body: Vec<Block>,
    pending: Vec<String>,
}

impl OpenContainer {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            let lines = std::mem::take(&mut self.pending);
            self.body.extend(reflow::reflow(&lines));
        }
    }

    fn push_block(&mut self, block: Block) {
        self.flush();
        self.body.push(block);
    }
}

struct TreeBuilder {
    mode: ErrorMode,
    doc: Document,
    title_seen: bool,
    section: Option<(OpenContainer, Vec<Subsection>)>,
    subsection: Option<OpenContainer>,
}

impl TreeBuilder {
    fn new(mode: ErrorMode) -> Self {
        Self {
            mode,
            doc: Document::new(),
            title_seen: false,
            section: None,
            subsection: None,
        }
    }

    fn set_title(&mut self, title: &str) {
        if self.title_seen {
            log::debug!("Extra top-level heading kept as text: {title}");
            self.push_line(title);
            return;
        }
        self.doc.main_title = title.to_string();
        self.title_seen = true;
    }

    fn open_section(&mut self, title: &str) {
        self.close_section();
        self.section = Some((OpenContainer::new(title), Vec::new()));
    }

    fn open_subsection(&mut self, title: &str, line_no: usize) -> Result<()> {
        self.close_subsection();
        if self.section.is_none() {
            if self.mode == ErrorMode::Strict {
                return Err(Error::malformed(
                    line_no,
                    format!("sub-card '{title}' appears before any card"),
                ));
            }
            let fallback = if self.doc.main_title.is_empty() {
                FALLBACK_SECTION_TITLE.to_string()
            } else {
                self.doc.main_title.clone()
            };
            log::warn!("Sub-card '{title}' at line {line_no} has no card; opening '{fallback}'");
            self.section = Some((OpenContainer::new(&fallback), Vec::new()));
        }
        self.subsection = Some(OpenContainer::new(title));
        Ok(())
    }

    fn push_line(&mut self, line: &str) {
        if let Some(sub) = self.subsection.as_mut() {
            sub.pending.push(line.to_string());
        } else if let Some((section, _)) = self.section.as_mut() {
            section.pending.push(line.to_string());
        } else if !line.trim().is_empty() {
            log::debug!("Discarding text outside any card: {}", line.trim());
        }
    }

    fn push_fenced(&mut self, lines: &[String], line_no: usize) -> Result<()> {
        let block = if diagram::is_diagram(lines) {
            Block::Diagram {
                steps: diagram::to_steps(lines),
            }
        } else {
            Block::code(lines.join("\n"))
        };

        if let Some(sub) = self.subsection.as_mut() {
            sub.push_block(block);
        } else if let Some((section, _)) = self.section.as_mut() {
            section.push_block(block);
        } else if self.mode == ErrorMode::Strict {
            return Err(Error::malformed(line_no, "code block outside any card"));
        } else {
            log::warn!("Discarding {} block outside any card (line {line_no})", block.kind());
        }
        Ok(())
    }

    fn close_subsection(&mut self) {
        if let Some(mut sub) = self.subsection.take() {
            sub.flush();
            match self.section.as_mut() {
                Some((_, subsections)) => subsections.push(Subsection {
                    title: sub.title,
                    body: sub.body,
                }),
                None => log::debug!("Dropping sub-card '{}' without card", sub.title),
            }
        }
    }

    fn close_section(&mut self) {
        self.close_subsection();
        if let Some((mut open, subsections)) = self.section.take() {
            open.flush();
            let mut section = Section::new(open.title, self.doc.sections.len());
            section.body = open.body;
            section.subsections = subsections;
            self.doc.push_section(section);
        }
    }

    fn finish(mut self) -> Document {
        self.close_section();
        self.doc
    }
}
