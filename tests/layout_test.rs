//! Integration tests for pagination and page assignment.

use cardbook::layout::{wrap_words, LayoutItem, LayoutMetrics, PageGeometry};
use cardbook::{parse_str, Block, Document, FontLibrary, ParseOptions, Paginator, Section, TextMeasurer};

/// Fixed advance per non-space character; spaces are free.
struct Fixed(f32);

impl TextMeasurer for Fixed {
    fn text_width(&self, text: &str, _font_size: f32) -> f32 {
        text.chars().filter(|c| !c.is_whitespace()).count() as f32 * self.0
    }

    fn code_width(&self, text: &str, font_size: f32) -> f32 {
        self.text_width(text, font_size)
    }
}

/// Title line, two cards each with one paragraph and a 20-line fenced block
/// holding 6 box-drawing lines.
fn scenario(paragraph: &str) -> String {
    let mut text = String::from("# Scenario\n");
    for card in ["First", "Second"] {
        text.push_str(&format!("## {card}\n{paragraph}\n```\n"));
        for i in 0..20 {
            if i % 3 == 0 && i < 18 {
                text.push_str(&format!("│ 👤 User action {i} → │\n"));
            } else {
                text.push_str("\n");
            }
        }
        text.push_str("```\n");
    }
    text
}

fn words(n: usize) -> String {
    (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
}

#[test]
fn test_end_to_end_short_cards() {
    let doc = parse_str(&scenario("short text"), &ParseOptions::default()).unwrap();
    for section in &doc.sections {
        assert!(matches!(section.body[1], Block::Diagram { .. }));
    }

    let pagination = Paginator::new(&Fixed(1.0)).paginate(&doc);
    let assignment = &pagination.assignment;
    assert_eq!(assignment.toc_page_count, 1);
    assert_eq!(assignment.pages, vec![2, 3]);
    assert_eq!(assignment.total_pages, 3);
    assert!(assignment.is_consistent());
}

#[test]
fn test_end_to_end_wrapped_cards() {
    // Every word is wider than half a line, so 40 words take 40 lines:
    // 35 under the title and 5 on a continuation page.
    let doc = parse_str(&scenario(&words(40)), &ParseOptions::default()).unwrap();
    let pagination = Paginator::new(&Fixed(300.0)).paginate(&doc);
    let assignment = &pagination.assignment;

    assert_eq!(assignment.toc_page_count, 1);
    assert_eq!(assignment.pages, vec![2, 4]);
    assert_eq!(assignment.total_pages, 5);

    let first: Vec<_> = pagination.pages_of(0).collect();
    assert_eq!(first.len(), 2);
    assert!(!first[0].continuation);
    assert!(first[1].continuation);
    let steps = first[1]
        .items
        .iter()
        .filter(|p| matches!(p.item, LayoutItem::Step { .. }))
        .count();
    assert_eq!(steps, 6);
}

#[test]
fn test_pages_strictly_increase() {
    let mut doc = Document::with_title("Many");
    for i in 0..60 {
        let mut section = Section::new(format!("Card {i}"), 0);
        section.body.push(Block::paragraph(words(i % 7 * 10)));
        doc.push_section(section);
    }

    let pagination = Paginator::new(&Fixed(300.0)).paginate(&doc);
    let assignment = &pagination.assignment;
    // 23 entries on the first TOC page, 25 on the second, 12 on the third.
    assert_eq!(assignment.toc_page_count, 3);
    assert_eq!(assignment.pages[0], 4);
    assert!(assignment.is_consistent());
    assert_eq!(pagination.toc.iter().map(Vec::len).collect::<Vec<_>>(), vec![23, 25, 12]);
    assert_eq!(pagination.pages.len() as u32 + 3, assignment.total_pages);
}

#[test]
fn test_apply_to_document() {
    let mut doc = parse_str("## A\nx\n## B\ny\n", &ParseOptions::default()).unwrap();
    let assignment = Paginator::new(&FontLibrary::builtin()).assign_pages(&doc);
    assignment.apply_to(&mut doc);
    assert_eq!(doc.sections[0].assigned_page, Some(2));
    assert_eq!(doc.sections[1].assigned_page, Some(3));
}

#[test]
fn test_custom_geometry_changes_capacity() {
    let doc = parse_str(&format!("## Long\n{}\n", words(40)), &ParseOptions::default()).unwrap();
    let tall = PageGeometry {
        height: 2000.0,
        ..PageGeometry::a4()
    };
    let pagination = Paginator::new(&Fixed(300.0))
        .with_geometry(tall)
        .with_metrics(LayoutMetrics::default())
        .paginate(&doc);
    assert_eq!(pagination.pages.len(), 1);
}

#[test]
fn test_greedy_wrap() {
    // Every word is 10 wide and spaces are free: three words fill 30.
    let lines = wrap_words("a b c d", 30.0, |line| {
        line.split_whitespace().count() as f32 * 10.0
    });
    assert_eq!(lines, vec!["a b c".to_string(), "d".to_string()]);
}
