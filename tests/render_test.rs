//! Integration tests for the HTML, carousel, JSON and PDF renderers.

use cardbook::render::{self, render_block, JsonFormat, RenderOptions};
use cardbook::{parse_str, Block, Direction, Document, FontLibrary, ParseOptions};

const GUIDE: &str = "# Guide
## Basics
Intro with **bold**.
- one
- two
> quoted
| A | B |
|---|---|
| 1 | 2 |
```
let x = 1;
```
#### Deeper
More text
## Flow
```
│ 👤 User asks → │
↓
│ 🧠 LLM answers → │
│ 📊 Result shown → │
│ 💾 Index updated → │
│ 🛠 Tool runs → │
│ ⚙ Executor ends → │










```
";

fn guide() -> Document {
    parse_str(GUIDE, &ParseOptions::default()).unwrap()
}

fn kinds_in(html: &str) -> Vec<String> {
    html.split("data-block=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}

#[test]
fn test_one_rendered_element_per_block() {
    let doc = guide();
    for section in &doc.sections {
        let html = render::render_card_content(section);
        let expected: Vec<String> = section
            .all_blocks()
            .map(|b| b.kind().to_string())
            .collect();
        assert_eq!(kinds_in(&html), expected, "card {}", section.title);
    }
}

#[test]
fn test_render_block_escapes() {
    let html = render_block(&Block::code("if a < b && c > d {}"));
    assert!(html.contains("if a &lt; b &amp;&amp; c &gt; d {}"));
}

#[test]
fn test_diagram_html() {
    let doc = guide();
    assert!(matches!(doc.sections[1].body[0], Block::Diagram { .. }));
    let html = render::to_html(&doc, &RenderOptions::default());
    assert!(html.contains("workflow-step user"));
    assert!(html.contains("workflow-step llm"));
    assert!(html.contains("workflow-arrow"));
}

#[test]
fn test_carousel_parses_back() {
    let doc = guide();
    let html = render::to_carousel(&doc, &RenderOptions::default());
    let parsed = parse_str(&html, &ParseOptions::default()).unwrap();
    assert_eq!(parsed.main_title, doc.main_title);
    assert_eq!(parsed.card_count(), doc.card_count());
    for (a, b) in parsed.sections.iter().zip(&doc.sections) {
        assert_eq!(a.title, b.title);
        assert_eq!(a.body, b.body);
        assert_eq!(a.subsections, b.subsections);
    }
}

#[test]
fn test_carousel_rtl() {
    let doc = parse_str("# دليل\n## مقدمة\nنص\n## خاتمة\nنص\n", &ParseOptions::default()).unwrap();
    let html = render::to_carousel(&doc, &RenderOptions::default());
    assert!(html.contains("<html lang=\"ar\" dir=\"rtl\">"));

    let html = render::to_carousel(&doc, &RenderOptions::default().ltr());
    assert!(html.contains("dir=\"ltr\""));
    assert!(html.contains("Previous"));
}

#[test]
fn test_json_round_trip() {
    let doc = guide();
    let json = render::to_json(&doc, None, JsonFormat::Pretty).unwrap();
    let back: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn test_pdf_navigation() {
    let doc = guide();
    let fonts = FontLibrary::builtin();
    let bytes = render::to_pdf(&doc, &fonts, &RenderOptions::default()).unwrap();
    let pdf = lopdf::Document::load_mem(&bytes).unwrap();

    let pages = pdf.get_pages();
    assert_eq!(pages.len(), 3);

    // TOC page links to both cards; each card page links to its neighbour and the TOC.
    for (number, expected) in [(1u32, 2usize), (2, 2), (3, 2)] {
        let page = pdf.get_dictionary(pages[&number]).unwrap();
        let annots = page.get(b"Annots").unwrap().as_array().unwrap();
        assert_eq!(annots.len(), expected, "page {number}");
    }
}

#[test]
fn test_pdf_rtl_with_builtin_fonts() {
    let doc = parse_str("# دليل\n## مقدمة\nنص عربي\n", &ParseOptions::default()).unwrap();
    assert_eq!(Direction::Auto.resolve(&doc), Direction::Rtl);

    let fonts = FontLibrary::builtin();
    let options = RenderOptions::default().with_compression(false);
    let bytes = render::to_pdf(&doc, &fonts, &options).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    // Without a Unicode font the navigation falls back to English.
    assert!(text.contains("(Table of Contents)"));
    assert!(lopdf::Document::load_mem(&bytes).is_ok());
}

#[test]
fn test_stats_match_pdf() {
    let doc = guide();
    let fonts = FontLibrary::builtin();
    let pagination = cardbook::Paginator::new(&fonts).paginate(&doc);
    let stats = render::DocumentStats::collect(&doc, Some(&pagination));
    let bytes = render::compose_pdf(&doc, &pagination, &fonts, &RenderOptions::default()).unwrap();
    let pdf = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(pdf.get_pages().len() as u32, stats.total_pages);
    assert_eq!(stats.blocks.diagram_count, 1);
    assert_eq!(stats.subsection_count, 1);
}
