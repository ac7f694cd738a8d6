//! Card-annotated HTML parser.
//!
//! html5ever builds the element tree, then cards are extracted from every
//! `div` carrying the `card` class. Only the handful of tags that card pages
//! use are interpreted; anything else is walked through for its children.

use super::diagram;
use super::dom::{parse_html, Element, Node};
use super::options::{ErrorMode, ParseOptions};
use crate::error::{Error, Result};
use crate::model::{Block, DiagramStep, Document, Section, StepRole, Subsection, Table};

/// Parser for card HTML.
#[derive(Debug, Clone, Default)]
pub struct HtmlParser {
    options: ParseOptions,
}

impl HtmlParser {
    /// Create a parser with options.
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse card HTML into a document.
    pub fn parse(&self, html: &str) -> Result<Document> {
        let root = parse_html(html);

        let mut doc = Document::new();
        doc.main_title = root
            .find_first(&|e: &Element| e.name == "h1")
            .or_else(|| root.find_first(&|e: &Element| e.name == "title"))
            .map(|e| collapse_whitespace(&e.inline_text()))
            .unwrap_or_default();
        doc.metadata.author = meta_content(&root, "author");
        doc.metadata.subject = meta_content(&root, "description");

        let mut cards = Vec::new();
        collect_cards(&root, &mut cards);
        log::debug!("Found {} card elements", cards.len());

        for (idx, card) in cards.into_iter().enumerate() {
            let (section, titled) = extract_card(card, idx);
            if !titled {
                if self.options.error_mode == ErrorMode::Strict {
                    return Err(Error::malformed(card.line, "card has no heading"));
                }
                log::warn!("Card at line {} has no heading; using '{}'", card.line, section.title);
            }
            doc.push_section(section);
        }
        Ok(doc)
    }
}

/// Content of the first `<meta name="..">` with a non-blank value.
fn meta_content(root: &Element, name: &str) -> Option<String> {
    root.find_first(&|e: &Element| {
        e.name == "meta"
            && e.attr("name").is_some_and(|n| n.eq_ignore_ascii_case(name))
            && e.attr("content").is_some_and(|c| !c.trim().is_empty())
    })
    .and_then(|e| e.attr("content"))
    .map(collapse_whitespace)
}

fn collect_cards<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
    for child in element.elements() {
        if child.name == "div" && child.has_class("card") {
            out.push(child);
        } else {
            collect_cards(child, out);
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build a card section. The flag reports whether a heading was found.
fn extract_card(card: &Element, idx: usize) -> (Section, bool) {
    let mut section = Section::new(format!("Card {}", idx + 1), idx);
    let mut title_found = false;
    let mut current_sub: Option<Subsection> = None;

    walk_card(card, &mut section, &mut current_sub, &mut title_found);

    if let Some(sub) = current_sub.take() {
        section.subsections.push(sub);
    }
    (section, title_found)
}

fn walk_card(
    element: &Element,
    section: &mut Section,
    current_sub: &mut Option<Subsection>,
    title_found: &mut bool,
) {
    for child in &element.children {
        let e = match child {
            Node::Element(e) => e,
            Node::Text(t) => {
                let text = collapse_whitespace(t);
                if !text.is_empty() {
                    push_block(section, current_sub, Block::paragraph(text));
                }
                continue;
            }
        };

        let is_title = matches!(e.name.as_str(), "h2" | "h3") || e.has_class("card-title");
        if is_title && !*title_found {
            let title = collapse_whitespace(&e.inline_text());
            if !title.is_empty() {
                section.title = title;
            }
            *title_found = true;
            continue;
        }

        if e.has_class("process-step") {
            if let Some(sub) = current_sub.take() {
                section.subsections.push(sub);
            }
            section.subsections.push(extract_subsection(e));
            continue;
        }

        if e.name == "h4" {
            if let Some(sub) = current_sub.take() {
                section.subsections.push(sub);
            }
            *current_sub = Some(Subsection::new(collapse_whitespace(&e.inline_text())));
            continue;
        }

        match extract_element(e) {
            Extracted::Block(block) => push_block(section, current_sub, block),
            Extracted::Skip => {}
            Extracted::Walk => walk_card(e, section, current_sub, title_found),
        }
    }
}

fn push_block(section: &mut Section, current_sub: &mut Option<Subsection>, block: Block) {
    match current_sub {
        Some(sub) => sub.body.push(block),
        None => section.body.push(block),
    }
}

fn extract_subsection(step: &Element) -> Subsection {
    let mut sub = Subsection::new("");
    let mut blocks = Vec::new();
    collect_sub_blocks(step, &mut sub, &mut blocks);
    sub.body = blocks;
    sub
}

fn collect_sub_blocks(element: &Element, sub: &mut Subsection, blocks: &mut Vec<Block>) {
    for e in element.elements() {
        if sub.title.is_empty() && matches!(e.name.as_str(), "h3" | "h4" | "h5") {
            sub.title = collapse_whitespace(&e.inline_text());
            continue;
        }
        match extract_element(e) {
            Extracted::Block(block) => blocks.push(block),
            Extracted::Skip => {}
            Extracted::Walk => collect_sub_blocks(e, sub, blocks),
        }
    }
}

/// What to do with an element found inside a card.
enum Extracted {
    Block(Block),
    Skip,
    Walk,
}

/// Map a content element to a block, or decide to skip or walk into it.
fn extract_element(e: &Element) -> Extracted {
    if e.has_class("workflow-diagram") {
        return Extracted::Block(workflow_diagram(e));
    }
    if e.has_class("code-card") || e.name == "pre" {
        let pre = if e.name == "pre" {
            e
        } else {
            e.find_first(&|c: &Element| c.name == "pre").unwrap_or(e)
        };
        return Extracted::Block(code_block(&pre.raw_text()));
    }

    let text_block = |make: fn(String) -> Block| {
        let text = collapse_whitespace(&e.inline_text());
        if text.is_empty() {
            Extracted::Skip
        } else {
            Extracted::Block(make(text))
        }
    };

    match e.name.as_str() {
        "p" => text_block(Block::paragraph),
        "blockquote" => text_block(Block::blockquote),
        "h5" | "h6" => text_block(|t| Block::paragraph(format!("**{t}**"))),
        "ul" | "ol" => {
            let items: Vec<String> = e
                .elements()
                .filter(|li| li.name == "li")
                .map(|li| collapse_whitespace(&li.inline_text()))
                .filter(|t| !t.is_empty())
                .collect();
            if items.is_empty() {
                Extracted::Skip
            } else {
                Extracted::Block(Block::List { items })
            }
        }
        "table" => Extracted::Block(table_block(e)),
        "script" | "style" | "nav" | "button" | "svg" => Extracted::Skip,
        _ => Extracted::Walk,
    }
}

fn code_block(raw: &str) -> Block {
    let text = raw.trim_matches('\n');
    let lines: Vec<&str> = text.lines().collect();
    if diagram::is_diagram(&lines) {
        Block::Diagram {
            steps: diagram::to_steps(&lines),
        }
    } else {
        Block::code(text)
    }
}

fn table_block(table: &Element) -> Block {
    let mut rows = Vec::new();
    let mut header_rows = 0;
    collect_rows(table, &mut rows, &mut header_rows);
    Block::Table(Table { rows, header_rows })
}

fn collect_rows(element: &Element, rows: &mut Vec<Vec<String>>, header_rows: &mut usize) {
    for e in element.elements() {
        if e.name == "tr" {
            let cells: Vec<&Element> = e
                .elements()
                .filter(|c| c.name == "td" || c.name == "th")
                .collect();
            if cells.is_empty() {
                continue;
            }
            let all_header = cells.iter().all(|c| c.name == "th");
            if all_header && *header_rows == rows.len() {
                *header_rows += 1;
            }
            rows.push(
                cells
                    .iter()
                    .map(|c| collapse_whitespace(&c.inline_text()))
                    .collect(),
            );
        } else {
            collect_rows(e, rows, header_rows);
        }
    }
}

fn workflow_diagram(container: &Element) -> Block {
    let mut steps = Vec::new();
    collect_workflow(container, &mut steps);
    Block::Diagram { steps }
}

fn collect_workflow(element: &Element, steps: &mut Vec<DiagramStep>) {
    for e in element.elements() {
        if e.has_class("workflow-arrow") {
            steps.push(DiagramStep::connector());
        } else if e.has_class("workflow-step") {
            let label = e
                .find_first(&|c: &Element| matches!(c.name.as_str(), "h3" | "h4" | "p"))
                .map(|h| collapse_whitespace(&h.inline_text()))
                .unwrap_or_else(|| collapse_whitespace(&e.inline_text()));
            let role = e
                .classes
                .iter()
                .find_map(|c| role_from_class(c))
                .unwrap_or_else(|| diagram::detect_role(&label));
            steps.push(DiagramStep::labeled(label, role));
        } else {
            collect_workflow(e, steps);
        }
    }
}

fn role_from_class(class: &str) -> Option<StepRole> {
    Some(match class {
        "user" => StepRole::User,
        "orchestrator" => StepRole::Orchestrator,
        "planner" => StepRole::Planner,
        "executor" => StepRole::Executor,
        "tool" => StepRole::Tool,
        "llm" => StepRole::Llm,
        "result" => StepRole::Result,
        "index" => StepRole::Index,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn parse(html: &str) -> Document {
        HtmlParser::default().parse(html).unwrap()
    }

    #[test]
    fn test_cards_and_title() {
        let doc = parse(
            r#"<html><head><title>Tab</title></head><body>
            <h1>Guide &amp; Notes</h1>
            <div class="card"><h2>First</h2><p>Hello <strong>world</strong></p></div>
            <div class="card active"><h3>Second</h3><ul><li>a</li><li>b</li></ul></div>
            </body></html>"#,
        );
        assert_eq!(doc.main_title, "Guide & Notes");
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].title, "First");
        assert_eq!(doc.sections[0].body, vec![Block::paragraph("Hello **world**")]);
        assert_eq!(
            doc.sections[1].body,
            vec![Block::List {
                items: vec!["a".into(), "b".into()]
            }]
        );
    }

    #[test]
    fn test_title_fallback_to_title_tag() {
        let doc = parse("<title>Tab Title</title><div class=\"card\"></div>");
        assert_eq!(doc.main_title, "Tab Title");
        assert_eq!(doc.sections[0].title, "Card 1");
    }

    #[test]
    fn test_code_card_and_table() {
        let doc = parse(
            r#"<div class="card"><h2>C</h2>
            <div class="code-card"><pre>let a = 1 &lt; 2;
let b = 3;</pre></div>
            <table><tr><th>K</th><th>V</th></tr><tr><td>x</td><td>y</td></tr></table>
            </div>"#,
        );
        let body = &doc.sections[0].body;
        assert_eq!(body[0], Block::code("let a = 1 < 2;\nlet b = 3;"));
        match &body[1] {
            Block::Table(t) => {
                assert_eq!(t.header_rows, 1);
                assert_eq!(t.rows[1], vec!["x".to_string(), "y".to_string()]);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_process_step_subsection() {
        let doc = parse(
            r#"<div class="card"><h2>Card</h2><p>intro</p>
            <div class="process-step"><h4>Step A</h4><p>detail</p></div></div>"#,
        );
        let section = &doc.sections[0];
        assert_eq!(section.body, vec![Block::paragraph("intro")]);
        assert_eq!(section.subsections[0].title, "Step A");
        assert_eq!(section.subsections[0].body, vec![Block::paragraph("detail")]);
    }

    #[test]
    fn test_workflow_diagram() {
        let doc = parse(
            r#"<div class="card"><h2>Flow</h2><div class="workflow-diagram"><div class="workflow-container">
            <div class="workflow-step user"><div class="step-number">1</div><h3>Ask</h3></div>
            <div class="workflow-arrow">⬇️</div>
            <div class="workflow-step"><div class="step-number">2</div><h3>🧠 LLM answers</h3></div>
            </div></div></div>"#,
        );
        match &doc.sections[0].body[0] {
            Block::Diagram { steps } => {
                assert_eq!(steps.len(), 3);
                assert_eq!(steps[0].role, StepRole::User);
                assert_eq!(steps[0].label, "Ask");
                assert!(steps[1].is_connector);
                assert_eq!(steps[2].role, StepRole::Llm);
            }
            other => panic!("expected diagram, got {other:?}"),
        }
    }

    #[test]
    fn test_script_content_ignored() {
        let doc = parse(
            "<script>if (a < b) { document.write('<div class=\"card\">') }</script><div class=\"card\"><h2>Real</h2></div>",
        );
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].title, "Real");
    }

    #[test]
    fn test_unclosed_tags_recovered() {
        let doc = parse("<div class=\"card\"><h2>Open</h2><p>one<p>two");
        assert_eq!(doc.sections[0].title, "Open");
        assert_eq!(
            doc.sections[0].body,
            vec![Block::paragraph("one"), Block::paragraph("two")]
        );
    }

    #[test]
    fn test_strict_requires_cards() {
        let html = "<html><body><p>none</p></body></html>";
        let lenient = HtmlParser::new(ParseOptions::new()).parse(html).unwrap();
        assert!(lenient.is_empty());
        let strict = crate::parser::parse_str_as(
            html,
            crate::detect::InputFormat::Html,
            &ParseOptions::new().strict(),
        );
        assert!(matches!(strict, Err(Error::EmptyDocument)));
    }

    #[test]
    fn test_strict_untitled_card_reports_line() {
        let html = "<html>\n<body>\n<div class=\"card\">\n<p>x</p>\n</div>\n</body></html>";
        let err = HtmlParser::new(ParseOptions::new().strict())
            .parse(html)
            .unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 3, .. }));
    }

    #[test]
    fn test_paragraph_implicitly_closed() {
        let doc = parse(r#"<div class="card"><h2>One</h2><p>Intro<ul><li>a</li><li>b</li></ul></div>"#);
        assert_eq!(
            doc.sections[0].body,
            vec![
                Block::paragraph("Intro"),
                Block::List {
                    items: vec!["a".into(), "b".into()]
                },
            ]
        );
    }

    #[test]
    fn test_entities_in_cards() {
        let doc = parse(r#"<div class="card"><h2>A &amp; B</h2><p>x &lt; y&nbsp;&#65;</p></div>"#);
        assert_eq!(doc.sections[0].title, "A & B");
        assert_eq!(doc.sections[0].body, vec![Block::paragraph("x < y A")]);
    }

    #[test]
    fn test_meta_author_and_description() {
        let doc = parse(
            r#"<html><head><meta charset="utf-8"><meta name="author" content=" Lina  Haddad ">
            <meta name="description" content="Agent notes"></head>
            <body><div class="card"><h2>One</h2></div></body></html>"#,
        );
        assert_eq!(doc.metadata.author.as_deref(), Some("Lina Haddad"));
        assert_eq!(doc.metadata.subject.as_deref(), Some("Agent notes"));

        let bare = parse("<div class=\"card\"><h2>One</h2></div>");
        assert_eq!(bare.metadata.author, None);
    }
}
