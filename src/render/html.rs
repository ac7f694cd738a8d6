//! Card HTML rendering.
//!
//! Every block becomes exactly one outer element carrying a `data-block`
//! attribute, so the output can be checked block for block against the
//! parsed tree. The markup uses the same classes the HTML parser reads
//! (`card`, `card-title`, `process-step`, `code-card`, `workflow-diagram`).

use super::options::{Direction, RenderOptions};
use crate::model::{Block, DiagramStep, Document, Section, StepRole, Subsection, Table};
use crate::parser::inline;
use std::fmt::Write;

/// Stylesheet shared by the scrolling page and the carousel.
pub(crate) const BASE_CSS: &str = r#"
* { box-sizing: border-box; }
body { margin: 0; padding: 24px; background: #f4f6fb; color: #1f2933;
       font-family: "Segoe UI", Tahoma, "DejaVu Sans", Arial, sans-serif; line-height: 1.7; }
h1.main-title { text-align: center; color: #243b53; }
.card { background: #fff; border-radius: 14px; padding: 28px 32px; margin: 0 auto 28px;
        max-width: 860px; box-shadow: 0 6px 24px rgba(36, 59, 83, 0.12); }
.card-title { margin-top: 0; color: #102a43; border-bottom: 2px solid #d9e2ec; padding-bottom: 8px; }
.process-step { background: #f0f4f8; border-inline-start: 4px solid #486581;
                border-radius: 8px; padding: 12px 18px; margin: 16px 0; }
.process-step h4 { margin: 0 0 8px; color: #334e68; }
blockquote { margin: 12px 0; padding: 8px 16px; border-inline-start: 4px solid #9fb3c8;
             background: #f7f9fc; color: #486581; }
table { border-collapse: collapse; width: 100%; margin: 12px 0; }
th, td { border: 1px solid #d9e2ec; padding: 6px 10px; text-align: start; }
th { background: #e8eef5; }
code { background: #eef2f7; padding: 1px 5px; border-radius: 4px; direction: ltr; unicode-bidi: embed; }
.code-card { direction: ltr; text-align: left; background: #1e2430; color: #e6edf3;
             border-radius: 10px; margin: 14px 0; overflow-x: auto; }
.code-card .code-label { padding: 6px 14px; font-size: 0.8em; color: #9fb3c8; border-bottom: 1px solid #2f3a4c; }
.code-card pre { margin: 0; padding: 12px 14px; }
.code-card code { background: none; padding: 0; color: inherit; }
.workflow-diagram { display: flex; flex-direction: column; align-items: center; margin: 18px 0; }
.workflow-step { display: flex; align-items: center; gap: 10px; min-width: 60%; padding: 10px 16px;
                 border-radius: 10px; border: 1px solid #cbd2d9; opacity: 0;
                 animation: step-in 0.5s ease forwards; }
.workflow-step h3 { margin: 0; font-size: 1em; font-weight: 600; }
.step-number { display: inline-flex; justify-content: center; align-items: center; width: 26px; height: 26px;
               border-radius: 50%; background: #334e68; color: #fff; font-size: 0.85em; }
.workflow-arrow { font-size: 1.4em; color: #829ab1; opacity: 0; animation: step-in 0.4s ease forwards; }
@keyframes step-in { from { opacity: 0; transform: translateY(-8px); } to { opacity: 1; transform: none; } }
"#;

/// Escape text for element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text and convert inline emphasis and code markers.
pub fn inline_html(text: &str) -> String {
    inline::to_markup(&escape_html(text))
}

/// CSS rules colouring diagram steps by role.
pub(crate) fn role_css() -> String {
    const ROLES: [StepRole; 9] = [
        StepRole::User,
        StepRole::Orchestrator,
        StepRole::Planner,
        StepRole::Executor,
        StepRole::Tool,
        StepRole::Llm,
        StepRole::Result,
        StepRole::Index,
        StepRole::Generic,
    ];
    let mut css = String::new();
    for role in ROLES {
        let (r, g, b) = role.fill_rgb();
        let _ = writeln!(
            css,
            ".workflow-step.{} {{ background: rgb({r}, {g}, {b}); }}",
            role.class_name()
        );
    }
    css
}

/// Render one block as a single element.
pub fn render_block(block: &Block) -> String {
    let kind = block.kind();
    match block {
        Block::Paragraph { text } => {
            format!("<p data-block=\"{kind}\">{}</p>\n", inline_html(text))
        }
        Block::Blockquote { text } => {
            format!(
                "<blockquote data-block=\"{kind}\">{}</blockquote>\n",
                inline_html(text)
            )
        }
        Block::List { items } => {
            let mut out = format!("<ul data-block=\"{kind}\">\n");
            for item in items {
                let _ = writeln!(out, "  <li>{}</li>", inline_html(item));
            }
            out.push_str("</ul>\n");
            out
        }
        Block::Table(table) => render_table(table),
        Block::Code { text } => format!(
            "<div class=\"code-card\" data-block=\"{kind}\">\
             <div class=\"code-label\">code</div>\
             <pre><code>{}</code></pre></div>\n",
            escape_html(text)
        ),
        Block::Diagram { steps } => render_diagram(steps),
    }
}

fn render_table(table: &Table) -> String {
    let mut out = String::from("<table data-block=\"table\">\n");
    if table.header_rows > 0 {
        out.push_str("<thead>\n");
        for row in table.header() {
            out.push_str("  <tr>");
            for cell in row {
                let _ = write!(out, "<th>{}</th>", inline_html(cell));
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</thead>\n");
    }
    out.push_str("<tbody>\n");
    for row in table.body() {
        out.push_str("  <tr>");
        for cell in row {
            let _ = write!(out, "<td>{}</td>", inline_html(cell));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

fn render_diagram(steps: &[DiagramStep]) -> String {
    let mut out = String::from("<div class=\"workflow-diagram\" data-block=\"diagram\">\n");
    let mut number = 0;
    for (i, step) in steps.iter().enumerate() {
        let delay = i as f32 * 0.3;
        if step.is_connector {
            let _ = writeln!(
                out,
                "  <div class=\"workflow-arrow\" style=\"animation-delay: {delay:.1}s\">&#8595;</div>"
            );
        } else {
            number += 1;
            let _ = writeln!(
                out,
                "  <div class=\"workflow-step {}\" style=\"animation-delay: {delay:.1}s\">\
                 <span class=\"step-number\">{number}</span><h3>{}</h3></div>",
                step.role.class_name(),
                inline_html(&step.label)
            );
        }
    }
    out.push_str("</div>\n");
    out
}

fn render_subsection(sub: &Subsection) -> String {
    let mut out = format!(
        "<div class=\"process-step\">\n<h4>{}</h4>\n",
        inline_html(&sub.title)
    );
    for block in &sub.body {
        out.push_str(&render_block(block));
    }
    out.push_str("</div>\n");
    out
}

/// Render a card's title, body blocks and sub-cards.
///
/// The returned markup is the card's inner content; callers wrap it in the
/// `div.card` element.
pub fn render_card_content(section: &Section) -> String {
    let mut out = format!(
        "<h2 class=\"card-title\">{}</h2>\n",
        inline_html(&section.title)
    );
    for block in &section.body {
        out.push_str(&render_block(block));
    }
    for sub in &section.subsections {
        out.push_str(&render_subsection(sub));
    }
    out
}

/// Render the document as one scrolling HTML page.
pub fn to_html(doc: &Document, options: &RenderOptions) -> String {
    let direction = options.direction.resolve(doc);
    let title = escape_html(doc.display_title());

    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"{}\" dir=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{BASE_CSS}{}</style>\n</head>\n<body>\n",
        if direction == Direction::Rtl { "ar" } else { "en" },
        direction.html_dir(),
        role_css()
    );
    if !doc.main_title.is_empty() {
        let _ = writeln!(out, "<h1 class=\"main-title\">{}</h1>", inline_html(&doc.main_title));
    }
    for section in &doc.sections {
        let _ = write!(
            out,
            "<div class=\"card\" id=\"card-{}\">\n{}</div>\n",
            section.index + 1,
            render_card_content(section)
        );
    }
    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_inline_after_escape() {
        assert_eq!(
            inline_html("**x** < `y`"),
            "<strong>x</strong> &lt; <code>y</code>"
        );
    }

    #[test]
    fn test_one_element_per_block() {
        let mut section = Section::new("Card", 0);
        section.body = vec![
            Block::paragraph("p"),
            Block::List {
                items: vec!["a".into(), "b".into()],
            },
            Block::code("let x = 1;"),
        ];
        let html = render_card_content(&section);
        assert_eq!(html.matches("data-block=").count(), 3);
        let p = html.find("data-block=\"paragraph\"").unwrap();
        let l = html.find("data-block=\"list\"").unwrap();
        let c = html.find("data-block=\"code\"").unwrap();
        assert!(p < l && l < c);
    }

    #[test]
    fn test_code_is_escaped_not_marked_up() {
        let html = render_block(&Block::code("a **b** <c>"));
        assert!(html.contains("a **b** &lt;c&gt;"));
    }

    #[test]
    fn test_diagram_markup() {
        let html = render_block(&Block::Diagram {
            steps: vec![
                DiagramStep::labeled("User asks", StepRole::User),
                DiagramStep::connector(),
                DiagramStep::labeled("Model answers", StepRole::Llm),
            ],
        });
        assert!(html.contains("workflow-step user"));
        assert!(html.contains("workflow-step llm"));
        assert_eq!(html.matches("workflow-arrow").count(), 1);
        assert!(html.contains("<span class=\"step-number\">2</span>"));
    }

    #[test]
    fn test_table_header() {
        let table = Table::from_rows(vec![
            vec!["h1".into(), "h2".into()],
            vec!["a".into(), "b".into()],
        ]);
        let html = render_block(&Block::Table(table));
        assert!(html.contains("<th>h1</th>"));
        assert!(html.contains("<td>b</td>"));
    }

    #[test]
    fn test_to_html_direction() {
        let mut doc = Document::with_title("دليل");
        doc.push_section(Section::new("مقدمة", 0));
        let html = to_html(&doc, &RenderOptions::default());
        assert!(html.contains("dir=\"rtl\""));
        assert!(html.contains("id=\"card-1\""));
    }
}
