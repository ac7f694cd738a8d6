//! HTML carousel: a TOC slide followed by one slide per card.
//!
//! Slides are plain anchors (`#toc`, `#card-N`) so navigation works without
//! scripting; a small script adds arrow-key navigation and shows one slide
//! at a time. Slide numbering matches the PDF layout with one TOC page:
//! the TOC is slide 1 and card `i` is slide `i + 2`.

use super::html::{escape_html, inline_html, render_card_content, role_css, BASE_CSS};
use super::options::{Direction, Labels, RenderOptions};
use crate::model::Document;
use crate::parser::inline;
use std::fmt::Write;

const CAROUSEL_CSS: &str = r#"
.slide { display: none; }
.slide.active, .slide:target { display: block; }
.toc-slide { background: #fff; border-radius: 14px; padding: 28px 32px; margin: 0 auto 28px;
             max-width: 860px; box-shadow: 0 6px 24px rgba(36, 59, 83, 0.12); }
.toc-slide ol { list-style: none; padding: 0; margin: 0; }
.toc-slide li { display: flex; align-items: baseline; gap: 8px; padding: 6px 0; }
.toc-slide li a { color: #102a43; text-decoration: none; }
.toc-slide li a:hover { text-decoration: underline; }
.toc-leader { flex: 1; border-bottom: 1px dotted #9fb3c8; }
.toc-page { color: #627d98; white-space: nowrap; }
.card-nav { display: grid; grid-template-columns: 1fr auto 1fr; align-items: center;
            margin-top: 28px; padding-top: 14px; border-top: 1px solid #d9e2ec; font-size: 0.95em; }
.card-nav a { color: #007bff; text-decoration: none; }
.card-nav .nav-prev { justify-self: start; }
.card-nav .nav-next { justify-self: end; }
.card-nav .nav-center { text-align: center; }
.page-indicator { display: block; color: #627d98; font-size: 0.85em; }
"#;

const CAROUSEL_JS: &str = r#"
(function () {
  var slides = Array.prototype.slice.call(document.querySelectorAll('.slide'));
  var rtl = document.documentElement.dir === 'rtl';
  var current = 0;
  function show(i) {
    if (i < 0 || i >= slides.length) { return; }
    slides[current].classList.remove('active');
    current = i;
    slides[current].classList.add('active');
    if (history.replaceState) { history.replaceState(null, '', '#' + slides[current].id); }
    window.scrollTo(0, 0);
  }
  function fromHash() {
    var id = location.hash.slice(1);
    for (var i = 0; i < slides.length; i++) { if (slides[i].id === id) { return i; } }
    return 0;
  }
  current = fromHash();
  slides[current].classList.add('active');
  window.addEventListener('hashchange', function () { show(fromHash()); });
  document.addEventListener('keydown', function (e) {
    var forward = rtl ? 'ArrowLeft' : 'ArrowRight';
    var back = rtl ? 'ArrowRight' : 'ArrowLeft';
    if (e.key === forward) { show(current + 1); }
    else if (e.key === back) { show(current - 1); }
    else if (e.key === 'Home') { show(0); }
  });
})();
"#;

/// Render the document as a self-contained carousel page.
pub fn to_carousel(doc: &Document, options: &RenderOptions) -> String {
    let direction = options.direction.resolve(doc);
    let labels = options.labels_for(direction, true);
    let title = doc.display_title();
    let total = doc.card_count() as u32 + 1;

    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"{}\" dir=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{BASE_CSS}{}{CAROUSEL_CSS}</style>\n\
         <noscript><style>.slide {{ display: block; }}</style></noscript>\n</head>\n<body>\n",
        if direction == Direction::Rtl { "ar" } else { "en" },
        direction.html_dir(),
        escape_html(&inline::to_plain(title)),
        role_css()
    );
    let _ = writeln!(out, "<h1 class=\"main-title\">{}</h1>", inline_html(title));

    write_toc(&mut out, doc, &labels, total);

    let count = doc.sections.len();
    for section in &doc.sections {
        let i = section.index;
        let _ = write!(
            out,
            "<div class=\"card slide\" id=\"card-{}\">\n{}",
            i + 1,
            render_card_content(section)
        );
        out.push_str("<nav class=\"card-nav\">\n");
        if i > 0 {
            let _ = writeln!(
                out,
                "  <a class=\"nav-prev\" href=\"#card-{i}\">{}</a>",
                escape_html(&labels.previous)
            );
        } else {
            out.push_str("  <span class=\"nav-prev\"></span>\n");
        }
        let _ = writeln!(
            out,
            "  <span class=\"nav-center\"><span class=\"page-indicator\">{}</span>\
             <a class=\"nav-toc\" href=\"#toc\">{}</a></span>",
            escape_html(&labels.page_indicator(i as u32 + 2, total)),
            escape_html(&labels.toc)
        );
        if i + 1 < count {
            let _ = writeln!(
                out,
                "  <a class=\"nav-next\" href=\"#card-{}\">{}</a>",
                i + 2,
                escape_html(&labels.next)
            );
        } else {
            out.push_str("  <span class=\"nav-next\"></span>\n");
        }
        out.push_str("</nav>\n</div>\n");
    }

    let _ = write!(out, "<script>{CAROUSEL_JS}</script>\n</body>\n</html>\n");
    out
}

fn write_toc(out: &mut String, doc: &Document, labels: &Labels, total: u32) {
    let _ = write!(
        out,
        "<div class=\"slide toc-slide\" id=\"toc\">\n<h2 class=\"card-title\">{}</h2>\n<ol>\n",
        escape_html(&labels.toc_title)
    );
    for section in &doc.sections {
        let _ = writeln!(
            out,
            "  <li><a href=\"#card-{}\">{}. {}</a><span class=\"toc-leader\"></span>\
             <span class=\"toc-page\">{}</span></li>",
            section.index + 1,
            section.index + 1,
            inline_html(&section.title),
            escape_html(&labels.toc_page(section.index as u32 + 2))
        );
    }
    let _ = writeln!(
        out,
        "</ol>\n<nav class=\"card-nav\"><span></span><span class=\"nav-center\">\
         <span class=\"page-indicator\">{}</span></span><span></span></nav>\n</div>",
        escape_html(&labels.page_indicator(1, total))
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Section};

    fn sample() -> Document {
        let mut doc = Document::with_title("Guide");
        for title in ["One", "Two", "Three"] {
            let mut s = Section::new(title, 0);
            s.body.push(Block::paragraph(format!("About {title}")));
            doc.push_section(s);
        }
        doc
    }

    #[test]
    fn test_toc_links_every_card() {
        let html = to_carousel(&sample(), &RenderOptions::default());
        assert!(html.contains("href=\"#card-1\">1. One</a>"));
        assert!(html.contains("href=\"#card-3\">3. Three</a>"));
        assert!(html.contains("<span class=\"toc-page\">Page 4</span>"));
    }

    #[test]
    fn test_prev_next_only_where_they_exist() {
        let html = to_carousel(&sample(), &RenderOptions::default());
        assert_eq!(html.matches("class=\"nav-prev\" href=").count(), 2);
        assert_eq!(html.matches("class=\"nav-next\" href=").count(), 2);
        assert_eq!(html.matches("class=\"nav-toc\"").count(), 3);
        assert!(html.contains("Page 2 of 4"));
    }

    #[test]
    fn test_arabic_labels() {
        let mut doc = Document::with_title("دليل");
        doc.push_section(Section::new("مقدمة", 0));
        let html = to_carousel(&doc, &RenderOptions::default());
        assert!(html.contains("dir=\"rtl\""));
        assert!(html.contains("فهرس المحتويات"));
        assert!(html.contains("الصفحة 2 من 2"));
    }

    #[test]
    fn test_parses_back_to_same_cards() {
        let doc = sample();
        let html = to_carousel(&doc, &RenderOptions::default());
        let parsed = crate::parser::HtmlParser::default().parse(&html).unwrap();
        assert_eq!(parsed.main_title, "Guide");
        assert_eq!(parsed.card_count(), 3);
        assert_eq!(parsed.sections[1].title, "Two");
        assert_eq!(parsed.sections[1].body, vec![Block::paragraph("About Two")]);
    }

    #[test]
    fn test_empty_document() {
        let html = to_carousel(&Document::new(), &RenderOptions::default());
        assert!(html.contains("id=\"toc\""));
        assert!(!html.contains("id=\"card-1\""));
    }
}
