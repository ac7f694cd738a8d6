//! Secondary sweep turning raw container lines into blocks.

use crate::model::{Block, Table};
use regex::Regex;
use std::sync::OnceLock;

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\s|:\-]+$").expect("table separator pattern"))
}

/// Group raw lines into paragraphs, lists, tables and blockquotes.
///
/// Contiguous `- ` lines form one list and contiguous lines containing `|`
/// form one table. A blank line ends either grouping. Horizontal rules are
/// dropped and every other line becomes its own paragraph.
pub fn reflow<S: AsRef<str>>(lines: &[S]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut list: Vec<String> = Vec::new();
    let mut table: Vec<&str> = Vec::new();

    for line in lines {
        let s = line.as_ref().trim();

        if s.is_empty() {
            flush_list(&mut list, &mut blocks);
            flush_table(&mut table, &mut blocks);
            continue;
        }

        if s.contains('|') {
            flush_list(&mut list, &mut blocks);
            table.push(s);
            continue;
        }
        flush_table(&mut table, &mut blocks);

        if let Some(item) = s.strip_prefix("- ") {
            list.push(item.trim().to_string());
            continue;
        }
        flush_list(&mut list, &mut blocks);

        if let Some(quote) = s.strip_prefix("> ") {
            blocks.push(Block::blockquote(quote.trim()));
        } else if s.starts_with("---") {
            continue;
        } else {
            blocks.push(Block::paragraph(s));
        }
    }

    flush_list(&mut list, &mut blocks);
    flush_table(&mut table, &mut blocks);
    blocks
}

fn flush_list(list: &mut Vec<String>, blocks: &mut Vec<Block>) {
    if !list.is_empty() {
        blocks.push(Block::List {
            items: std::mem::take(list),
        });
    }
}

fn flush_table(lines: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if lines.is_empty() {
        return;
    }
    let rows: Vec<Vec<String>> = lines
        .drain(..)
        .filter(|line| !separator_regex().is_match(line))
        .map(split_row)
        .filter(|cells| !cells.is_empty())
        .collect();
    if !rows.is_empty() {
        blocks.push(Block::Table(Table::from_rows(rows)));
    }
}

/// Split a table line into trimmed non-empty cells.
fn split_row(line: &str) -> Vec<String> {
    line.split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}
