//! PDF composition.
//!
//! Composition never measures or breaks pages itself: it draws the
//! [`Pagination`] computed beforehand, so every page number printed in the
//! table of contents is already final when the first page is written.
//!
//! With a registered TrueType face all text is shaped and written as glyph
//! ids through a Type0/Identity-H font; otherwise the standard Helvetica and
//! Courier fonts are used with WinAnsi encoding.

use super::bidi;
use super::options::{Direction, Labels, RenderOptions};
use crate::error::{Error, Result};
use crate::layout::{
    truncate_to_width, BuiltinFont, CardPage, FontLibrary, LayoutItem, LayoutMetrics, LineStyle,
    LoadedFont, PageGeometry, Pagination, Paginator, TextMeasurer,
};
use crate::model::{Document, StepRole};
use crate::parser::inline;
use chrono::Utc;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;
use std::io::Write;

type Rgb = (f32, f32, f32);

const TEXT: Rgb = (0.13, 0.16, 0.2);
const TITLE: Rgb = (0.06, 0.16, 0.26);
const SUBHEADING: Rgb = (0.2, 0.3, 0.45);
const MUTED: Rgb = (0.38, 0.45, 0.53);
const ACCENT: Rgb = (0.9, 0.49, 0.13);
const NAV: Rgb = (0.0, 0.48, 1.0);
const RULE: Rgb = (0.85, 0.87, 0.9);
const CODE_BG: Rgb = (0.95, 0.95, 0.95);
const HEADER_BG: Rgb = (0.91, 0.93, 0.96);

const BODY_FONT: &[u8] = b"F1";
const BOLD_FONT: &[u8] = b"F2";
const MONO_FONT: &[u8] = b"F3";

/// Lay out and compose a document into PDF bytes.
pub fn to_pdf(doc: &Document, fonts: &FontLibrary, options: &RenderOptions) -> Result<Vec<u8>> {
    let pagination = Paginator::new(fonts)
        .with_geometry(options.geometry)
        .with_metrics(options.metrics)
        .paginate(doc);
    compose_pdf(doc, &pagination, fonts, options)
}

/// Compose an already paginated document into PDF bytes.
pub fn compose_pdf(
    doc: &Document,
    pagination: &Pagination,
    fonts: &FontLibrary,
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    let direction = options.direction.resolve(doc);
    let mut composer = Composer {
        doc,
        pagination,
        fonts,
        font: fonts.font(),
        options,
        geometry: options.geometry,
        metrics: options.metrics,
        rtl: direction.is_rtl(),
        labels: options.labels_for(direction, !fonts.is_builtin()),
        used_glyphs: BTreeMap::new(),
    };
    composer.compose()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Body,
    Bold,
    Mono,
}

/// A link annotation on a page, targeting a physical page number.
struct Link {
    rect: [f32; 4],
    page: u32,
}

/// Drawing operations of one page.
#[derive(Default)]
struct Canvas {
    ops: Vec<Operation>,
    links: Vec<Link>,
    fill: Rgb,
}

impl Canvas {
    fn fill_color(&mut self, color: Rgb) {
        self.fill = color;
        self.ops.push(Operation::new(
            "rg",
            vec![color.0.into(), color.1.into(), color.2.into()],
        ));
    }

    fn stroke_color(&mut self, color: Rgb) {
        self.ops.push(Operation::new(
            "RG",
            vec![color.0.into(), color.1.into(), color.2.into()],
        ));
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.fill_color(color);
        self.ops.push(Operation::new(
            "re",
            vec![x.into(), y.into(), width.into(), height.into()],
        ));
        self.ops.push(Operation::new("f", vec![]));
    }

    fn stroked_rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Rgb, stroke: Rgb) {
        self.fill_color(fill);
        self.stroke_color(stroke);
        self.ops.push(Operation::new("w", vec![0.75.into()]));
        self.ops.push(Operation::new(
            "re",
            vec![x.into(), y.into(), width.into(), height.into()],
        ));
        self.ops.push(Operation::new("B", vec![]));
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb) {
        self.stroke_color(color);
        self.ops.push(Operation::new("w", vec![width.into()]));
        self.ops.push(Operation::new("m", vec![from.0.into(), from.1.into()]));
        self.ops.push(Operation::new("l", vec![to.0.into(), to.1.into()]));
        self.ops.push(Operation::new("S", vec![]));
    }

    fn dotted_line(&mut self, from: (f32, f32), to: (f32, f32)) {
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "d",
            vec![Object::Array(vec![3.into(), 3.into()]), 0.into()],
        ));
        self.line(from, to, 0.5, (0.7, 0.7, 0.7));
        self.ops.push(Operation::new("Q", vec![]));
    }

    fn arrow_down(&mut self, x: f32, top: f32, bottom: f32, color: Rgb) {
        self.line((x, top), (x, bottom + 5.0), 1.2, color);
        self.fill_color(color);
        self.ops.push(Operation::new("m", vec![(x - 4.0).into(), (bottom + 6.0).into()]));
        self.ops.push(Operation::new("l", vec![(x + 4.0).into(), (bottom + 6.0).into()]));
        self.ops.push(Operation::new("l", vec![x.into(), bottom.into()]));
        self.ops.push(Operation::new("f", vec![]));
    }

    fn link(&mut self, rect: [f32; 4], page: u32) {
        self.links.push(Link { rect, page });
    }
}

struct Composer<'a> {
    doc: &'a Document,
    pagination: &'a Pagination,
    fonts: &'a FontLibrary,
    font: Option<&'a LoadedFont>,
    options: &'a RenderOptions,
    geometry: PageGeometry,
    metrics: LayoutMetrics,
    rtl: bool,
    labels: Labels,
    /// Glyphs written with the embedded face and the text they stand for
    used_glyphs: BTreeMap<u16, String>,
}

impl Composer<'_> {
    fn compose(&mut self) -> Result<Vec<u8>> {
        let pagination = self.pagination;
        let mut canvases = Vec::new();
        let toc_pages = pagination.toc.len();
        for (i, entries) in pagination.toc.iter().enumerate() {
            canvases.push(self.draw_toc_page(i, entries));
        }
        for page in &pagination.pages {
            canvases.push(self.draw_card_page(page));
        }

        let total = pagination.assignment.total_pages as usize;
        if canvases.len() != total {
            return Err(Error::Layout(format!(
                "composed {} pages but pagination counted {total}",
                canvases.len()
            )));
        }
        log::debug!(
            "Composed {} TOC page(s) and {} card page(s)",
            toc_pages,
            total - toc_pages
        );

        self.write_pdf(canvases)
    }

    fn left(&self) -> f32 {
        self.geometry.left()
    }

    fn right(&self) -> f32 {
        self.geometry.right()
    }

    fn top(&self) -> f32 {
        self.geometry.content_top()
    }

    /// Left and right edges of body text.
    fn text_edges(&self) -> (f32, f32) {
        let inset = self.metrics.wrap_inset / 2.0;
        (self.left() + inset, self.right() - inset)
    }

    fn width(&self, face: Face, text: &str, size: f32) -> f32 {
        match (face, self.font) {
            (Face::Mono, _) => BuiltinFont::Courier.text_width(text, size),
            (Face::Bold, None) => BuiltinFont::HelveticaBold.text_width(text, size),
            _ => self.fonts.text_width(text, size),
        }
    }

    fn fit(&self, face: Face, text: &str, size: f32, max_width: f32) -> String {
        truncate_to_width(text, max_width, true, |t| self.width(face, t, size))
    }

    /// Draw `text` aligned to the reading edge between `left` and `right`.
    #[allow(clippy::too_many_arguments)]
    fn aligned(
        &mut self,
        canvas: &mut Canvas,
        face: Face,
        size: f32,
        y: f32,
        left: f32,
        right: f32,
        text: &str,
        color: Rgb,
    ) -> f32 {
        let width = self.width(face, text, size);
        let x = if self.rtl { right - width } else { left };
        self.text(canvas, face, size, x, y, text, color);
        x
    }

    fn centered(&mut self, canvas: &mut Canvas, face: Face, size: f32, y: f32, text: &str, color: Rgb) -> f32 {
        let width = self.width(face, text, size);
        let x = (self.geometry.width - width) / 2.0;
        self.text(canvas, face, size, x, y, text, color);
        x
    }

    #[allow(clippy::too_many_arguments)]
    fn text(&mut self, canvas: &mut Canvas, face: Face, size: f32, x: f32, y: f32, text: &str, color: Rgb) {
        if text.is_empty() {
            return;
        }
        canvas.fill_color(color);
        canvas.ops.push(Operation::new("BT", vec![]));

        match (face, self.font) {
            (Face::Mono, _) => {
                canvas.ops.push(Operation::new("Tf", vec![Object::Name(MONO_FONT.to_vec()), size.into()]));
                canvas.ops.push(Operation::new("Td", vec![x.into(), y.into()]));
                canvas.ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
                ));
            }
            (_, Some(font)) => {
                canvas.ops.push(Operation::new("Tf", vec![Object::Name(BODY_FONT.to_vec()), size.into()]));
                if face == Face::Bold {
                    canvas.stroke_color(canvas.fill);
                    canvas.ops.push(Operation::new("w", vec![(size * 0.03).into()]));
                    canvas.ops.push(Operation::new("Tr", vec![2.into()]));
                }
                canvas.ops.push(Operation::new("Td", vec![x.into(), y.into()]));
                let glyphs = self.glyph_array(font, text, size);
                canvas.ops.push(Operation::new("TJ", vec![Object::Array(glyphs)]));
                if face == Face::Bold {
                    canvas.ops.push(Operation::new("Tr", vec![0.into()]));
                }
            }
            (_, None) => {
                let name = if face == Face::Bold { BOLD_FONT } else { BODY_FONT };
                canvas.ops.push(Operation::new("Tf", vec![Object::Name(name.to_vec()), size.into()]));
                canvas.ops.push(Operation::new("Td", vec![x.into(), y.into()]));
                let visual = bidi::visual_string(text, Direction::Auto);
                canvas.ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(to_win_ansi(&visual), StringFormat::Literal)],
                ));
            }
        }
        canvas.ops.push(Operation::new("ET", vec![]));
    }

    /// Shape each visual run and build a `TJ` array of glyph ids, with
    /// kerning adjustments where the shaped advance differs from the
    /// glyph's nominal width.
    fn glyph_array(&mut self, font: &LoadedFont, text: &str, size: f32) -> Vec<Object> {
        let mut items = Vec::new();
        let mut pending = Vec::new();

        for run in bidi::visual_runs(text, Direction::Auto) {
            let glyphs = font.shape(run.text, size);
            let mut starts: Vec<usize> = glyphs.iter().map(|g| g.cluster as usize).collect();
            starts.sort_unstable();
            starts.dedup();

            for glyph in &glyphs {
                let start = glyph.cluster as usize;
                let end = starts
                    .iter()
                    .copied()
                    .find(|&s| s > start)
                    .unwrap_or(run.text.len());
                self.used_glyphs
                    .entry(glyph.glyph_id)
                    .or_insert_with(|| run.text.get(start..end).unwrap_or_default().to_string());

                pending.extend_from_slice(&glyph.glyph_id.to_be_bytes());
                let nominal = font.glyph_width_1000(glyph.glyph_id);
                let adjust = nominal - glyph.advance * 1000.0 / size;
                if adjust.abs() > 0.5 {
                    items.push(Object::String(std::mem::take(&mut pending), StringFormat::Hexadecimal));
                    items.push(adjust.into());
                }
            }
        }
        if !pending.is_empty() {
            items.push(Object::String(pending, StringFormat::Hexadecimal));
        }
        items
    }

    fn draw_toc_page(&mut self, index: usize, entries: &[usize]) -> Canvas {
        let (doc, pagination) = (self.doc, self.pagination);
        let mut canvas = Canvas::default();
        let m = self.metrics;
        let top = self.top();
        let (left, right) = (self.left(), self.right());
        let content_width = self.geometry.content_width();

        let first_entry_y = if index == 0 {
            let title = self.fit(
                Face::Bold,
                &inline::to_plain(doc.display_title()),
                m.toc_main_title_size,
                content_width,
            );
            self.centered(&mut canvas, Face::Bold, m.toc_main_title_size, top - 30.0, &title, TITLE);
            let toc_title = self.labels.toc_title.clone();
            self.aligned(&mut canvas, Face::Bold, m.toc_title_size, top - 80.0, left, right, &toc_title, TITLE);
            top - m.toc_header
        } else {
            let toc_title = self.labels.continued_title(&self.labels.toc_title);
            self.aligned(&mut canvas, Face::Bold, m.toc_title_size, top - 30.0, left, right, &toc_title, TITLE);
            top - m.toc_continuation_header
        };

        let size = m.toc_entry_size;
        for (row, &section_index) in entries.iter().enumerate() {
            let Some(section) = doc.sections.get(section_index) else {
                continue;
            };
            let Some(page) = pagination.assignment.page_of(section_index) else {
                continue;
            };
            let y = first_entry_y - row as f32 * m.toc_entry_height;

            let page_text = self.labels.toc_page(page);
            let page_width = self.width(Face::Body, &page_text, size);
            let entry = format!("{}. {}", section_index + 1, inline::to_plain(&section.title));
            let entry = self.fit(Face::Body, &entry, size, content_width - page_width - 30.0);
            let entry_width = self.width(Face::Body, &entry, size);

            let (entry_x, page_x) = if self.rtl {
                (right - entry_width, left)
            } else {
                (left, right - page_width)
            };
            self.text(&mut canvas, Face::Body, size, entry_x, y, &entry, TEXT);
            self.text(&mut canvas, Face::Body, size, page_x, y, &page_text, MUTED);

            let (dots_from, dots_to) = if self.rtl {
                (left + page_width + 10.0, right - entry_width - 10.0)
            } else {
                (left + entry_width + 10.0, right - page_width - 10.0)
            };
            if dots_to > dots_from {
                canvas.dotted_line((dots_from, y + 3.0), (dots_to, y + 3.0));
            }
            canvas.link([left, y - 4.0, right, y + size + 2.0], page);
        }

        let total = pagination.assignment.total_pages;
        let indicator = self.labels.page_indicator(index as u32 + 1, total);
        let nav_y = self.geometry.margin + 10.0;
        self.centered(&mut canvas, Face::Body, m.nav_size, nav_y + 20.0, &indicator, MUTED);
        canvas
    }

    fn draw_card_page(&mut self, page: &CardPage) -> Canvas {
        let mut canvas = Canvas::default();
        let m = self.metrics;
        let top = self.top();
        let (left, right) = (self.left(), self.right());
        let title = self
            .doc
            .sections
            .get(page.section)
            .map(|s| inline::to_plain(&s.title))
            .unwrap_or_default();

        let body_top = if page.continuation {
            let header = self.labels.continued_title(&title);
            let header = self.fit(Face::Bold, &header, 12.0, self.geometry.content_width());
            self.aligned(&mut canvas, Face::Bold, 12.0, top - 15.0, left, right, &header, MUTED);
            canvas.line((left, top - 22.0), (right, top - 22.0), 0.5, RULE);
            top - m.continuation_block
        } else {
            let title = self.fit(Face::Bold, &title, m.title_size, self.geometry.content_width());
            self.aligned(&mut canvas, Face::Bold, m.title_size, top - m.title_baseline, left, right, &title, TITLE);
            canvas.line((left, top - m.title_rule), (right, top - m.title_rule), 1.5, ACCENT);
            top - m.title_block
        };

        for placed in &page.items {
            self.draw_item(&mut canvas, &placed.item, body_top - placed.offset);
        }

        self.draw_navigation(&mut canvas, page);
        canvas
    }

    fn draw_item(&mut self, canvas: &mut Canvas, item: &LayoutItem, top: f32) {
        let m = self.metrics;
        let (left, right) = self.text_edges();

        match item {
            LayoutItem::Line { text, style } => {
                let baseline = top - m.body_size - 1.0;
                match style {
                    LineStyle::Body => {
                        self.aligned(canvas, Face::Body, m.body_size, baseline, left, right, text, TEXT);
                    }
                    LineStyle::Bullet | LineStyle::BulletContinuation => {
                        if *style == LineStyle::Bullet {
                            self.aligned(canvas, Face::Body, m.body_size, baseline, left, right, "\u{2022}", ACCENT);
                        }
                        let (l, r) = self.indented(left, right);
                        self.aligned(canvas, Face::Body, m.body_size, baseline, l, r, text, TEXT);
                    }
                    LineStyle::Quote => {
                        let bar_x = if self.rtl { right - 3.0 } else { left };
                        canvas.rect(bar_x, top - m.body_leading, 3.0, m.body_leading, (0.62, 0.7, 0.78));
                        let (l, r) = self.indented(left, right);
                        self.aligned(canvas, Face::Body, m.body_size, baseline, l, r, text, MUTED);
                    }
                    LineStyle::TableHeader => {
                        canvas.rect(left, top - m.body_leading, right - left, m.body_leading, HEADER_BG);
                        self.aligned(canvas, Face::Bold, m.body_size, baseline, left + 4.0, right - 4.0, text, TITLE);
                    }
                    LineStyle::TableRow => {
                        self.aligned(canvas, Face::Body, m.body_size, baseline, left + 4.0, right - 4.0, text, TEXT);
                        let y = top - m.body_leading;
                        canvas.line((left, y), (right, y), 0.5, RULE);
                    }
                }
            }
            LayoutItem::Subheading { text } => {
                let baseline = top - m.subheading_size - 3.0;
                self.aligned(canvas, Face::Bold, m.subheading_size, baseline, left, right, text, SUBHEADING);
            }
            LayoutItem::Code { lines } => {
                let label = self.labels.code.clone();
                self.aligned(canvas, Face::Body, 10.0, top - 14.0, left, right, &label, MUTED);

                let box_top = top - m.code_header;
                let height = lines.len() as f32 * m.code_leading + m.code_padding;
                canvas.rect(left, box_top - height, right - left, height, CODE_BG);
                let padding = m.code_padding / 2.0;
                for (i, line) in lines.iter().enumerate() {
                    let baseline = box_top - padding - m.code_size - i as f32 * m.code_leading;
                    self.text(canvas, Face::Mono, m.code_size, left + padding, baseline, line, TEXT);
                }
            }
            LayoutItem::Step { label, role, number } => {
                let box_left = left + 20.0;
                let box_right = right - 20.0;
                let height = m.step_height - 6.0;
                let (r, g, b) = role.fill_rgb();
                let fill = (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
                canvas.stroked_rect(box_left, top - 3.0 - height, box_right - box_left, height, fill, role_stroke(*role));

                let baseline = top - m.step_height / 2.0 - m.body_size * 0.35;
                let num = number.to_string();
                let num_width = self.width(Face::Bold, &num, m.body_size);
                let num_x = if self.rtl { box_right - 8.0 - num_width } else { box_left + 8.0 };
                self.text(canvas, Face::Bold, m.body_size, num_x, baseline, &num, SUBHEADING);
                self.centered(canvas, Face::Body, m.body_size, baseline, label, TEXT);
            }
            LayoutItem::Connector => {
                let x = self.geometry.width / 2.0;
                canvas.arrow_down(x, top - 2.0, top - m.connector_height + 2.0, MUTED);
            }
            LayoutItem::Gap(_) => {}
        }
    }

    fn indented(&self, left: f32, right: f32) -> (f32, f32) {
        let indent = self.metrics.indent;
        if self.rtl {
            (left, right - indent)
        } else {
            (left + indent, right)
        }
    }

    fn draw_navigation(&mut self, canvas: &mut Canvas, page: &CardPage) {
        let m = self.metrics;
        let size = m.nav_size;
        let (left, right) = (self.left(), self.right());
        let nav_y = self.geometry.margin + 10.0;
        let pagination = self.pagination;
        let assignment = &pagination.assignment;
        let count = self.doc.card_count();

        let rule_y = self.geometry.margin + self.geometry.nav_height;
        canvas.line((left, rule_y), (right, rule_y), 0.5, RULE);

        let indicator = self.labels.page_indicator(page.number, assignment.total_pages);
        self.centered(canvas, Face::Body, size, nav_y + 20.0, &indicator, MUTED);

        let previous = page
            .section
            .checked_sub(1)
            .and_then(|i| assignment.page_of(i));
        let next = if page.section + 1 < count {
            assignment.page_of(page.section + 1)
        } else {
            None
        };

        // Previous sits on the reading start side.
        let (prev_side_left, next_side_left) = (!self.rtl, self.rtl);
        if let Some(target) = previous {
            let label = self.labels.previous.clone();
            self.nav_link(canvas, &label, prev_side_left, nav_y, target);
        }
        if let Some(target) = next {
            let label = self.labels.next.clone();
            self.nav_link(canvas, &label, next_side_left, nav_y, target);
        }

        let toc = self.labels.toc.clone();
        let x = self.centered(canvas, Face::Body, size, nav_y, &toc, NAV);
        let width = self.width(Face::Body, &toc, size);
        canvas.link([x, nav_y - 3.0, x + width, nav_y + size], 1);
    }

    fn nav_link(&mut self, canvas: &mut Canvas, label: &str, at_left: bool, y: f32, target: u32) {
        let size = self.metrics.nav_size;
        let width = self.width(Face::Body, label, size);
        let x = if at_left { self.left() } else { self.right() - width };
        self.text(canvas, Face::Body, size, x, y, label, NAV);
        canvas.link([x, y - 3.0, x + width, y + size], target);
    }

    fn encode_stream(&self, content: Vec<u8>, dict: Dictionary) -> Result<Stream> {
        encode_stream(content, dict, self.options.compress)
    }

    fn write_pdf(&mut self, canvases: Vec<Canvas>) -> Result<Vec<u8>> {
        let mut pdf = lopdf::Document::with_version("1.7");
        let pages_id = pdf.new_object_id();
        let page_ids: Vec<ObjectId> = canvases.iter().map(|_| pdf.new_object_id()).collect();
        let height = self.geometry.height;

        let mut page_contents = Vec::with_capacity(canvases.len());
        for canvas in canvases {
            let bytes = Content { operations: canvas.ops }.encode()?;
            page_contents.push((self.encode_stream(bytes, Dictionary::new())?, canvas.links));
        }

        let fonts = self.font_resources(&mut pdf)?;
        let resources_id = pdf.add_object(dictionary! { "Font" => fonts });

        for ((stream, links), &page_id) in page_contents.into_iter().zip(&page_ids) {
            let content_id = pdf.add_object(stream);
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), self.geometry.width.into(), height.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            };

            let mut annots = Vec::new();
            for link in links {
                let Some(&target) = page_ids.get(link.page as usize - 1) else {
                    continue;
                };
                let action = dictionary! {
                    "Type" => "Action",
                    "S" => "GoTo",
                    "D" => vec![Object::Reference(target), "FitH".into(), height.into()],
                };
                let action_id = pdf.add_object(action);
                let rect: Vec<Object> = link.rect.iter().map(|&v| v.into()).collect();
                let annot = dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Link",
                    "Rect" => rect,
                    "Border" => vec![0.into(), 0.into(), 0.into()],
                    "A" => action_id,
                };
                annots.push(Object::Reference(pdf.add_object(annot)));
            }
            if !annots.is_empty() {
                page.set("Annots", annots);
            }
            pdf.objects.insert(page_id, Object::Dictionary(page));
        }

        let kids: Vec<Object> = page_ids.iter().map(|&id| id.into()).collect();
        pdf.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_ids.len() as i64,
            }),
        );

        let mut catalog = dictionary! { "Type" => "Catalog", "Pages" => pages_id };
        if self.options.bookmarks {
            if let Some(outlines_id) = self.build_outlines(&mut pdf, &page_ids) {
                catalog.set("Outlines", outlines_id);
                catalog.set("PageMode", "UseOutlines");
            }
        }
        let catalog_id = pdf.add_object(catalog);
        pdf.trailer.set("Root", catalog_id);

        let info_id = pdf.add_object(self.info_dictionary());
        pdf.trailer.set("Info", info_id);

        let mut out = Vec::new();
        pdf.save_to(&mut out)?;
        Ok(out)
    }

    fn build_outlines(&self, pdf: &mut lopdf::Document, page_ids: &[ObjectId]) -> Option<ObjectId> {
        let targets: Vec<(String, ObjectId)> = self
            .doc
            .sections
            .iter()
            .filter_map(|s| {
                let page = self.pagination.assignment.page_of(s.index)?;
                let id = page_ids.get(page as usize - 1)?;
                Some((inline::to_plain(&s.title), *id))
            })
            .collect();
        if targets.is_empty() {
            return None;
        }

        let outlines_id = pdf.new_object_id();
        let item_ids: Vec<ObjectId> = targets.iter().map(|_| pdf.new_object_id()).collect();
        for (i, (title, page_id)) in targets.iter().enumerate() {
            let mut item = dictionary! {
                "Title" => text_string(title),
                "Parent" => outlines_id,
                "Dest" => vec![Object::Reference(*page_id), "Fit".into()],
            };
            if i > 0 {
                item.set("Prev", item_ids[i - 1]);
            }
            if let Some(next) = item_ids.get(i + 1) {
                item.set("Next", *next);
            }
            pdf.objects.insert(item_ids[i], Object::Dictionary(item));
        }

        let first = item_ids[0];
        let last = item_ids[item_ids.len() - 1];
        pdf.objects.insert(
            outlines_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => first,
                "Last" => last,
                "Count" => item_ids.len() as i64,
            }),
        );
        Some(outlines_id)
    }

    fn info_dictionary(&self) -> Dictionary {
        let created = self.doc.metadata.created.unwrap_or_else(Utc::now);
        let mut info = dictionary! {
            "Title" => text_string(&inline::to_plain(self.doc.display_title())),
            "Producer" => text_string("cardbook"),
            "CreationDate" => Object::string_literal(created.format("D:%Y%m%d%H%M%S+00'00'").to_string()),
        };
        if let Some(author) = &self.doc.metadata.author {
            info.set("Author", text_string(author));
        }
        if let Some(subject) = &self.doc.metadata.subject {
            info.set("Subject", text_string(subject));
        }
        info
    }

    /// Font dictionary for the page resources: `F1` body, `F2` bold,
    /// `F3` monospaced.
    fn font_resources(&self, pdf: &mut lopdf::Document) -> Result<Dictionary> {
        let courier = pdf.add_object(builtin_font(BuiltinFont::Courier));
        let (body, bold) = match self.font {
            Some(font) => {
                let id = self.embed_font(pdf, font)?;
                (id, id)
            }
            None => (
                pdf.add_object(builtin_font(BuiltinFont::Helvetica)),
                pdf.add_object(builtin_font(BuiltinFont::HelveticaBold)),
            ),
        };
        Ok(dictionary! { "F1" => body, "F2" => bold, "F3" => courier })
    }

    fn embed_font(&self, pdf: &mut lopdf::Document, font: &LoadedFont) -> Result<ObjectId> {
        let name = font.postscript_name.as_str();
        let data = font.data().to_vec();
        let length = data.len() as i64;
        let file_id = pdf.add_object(self.encode_stream(data, dictionary! { "Length1" => length })?);

        let scale = 1000.0 / font.units_per_em as f32;
        let (x_min, y_min, x_max, y_max) = font.bbox_1000();
        let ascent = font.ascender as f32 * scale;
        let descriptor_id = pdf.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => name,
            "Flags" => 32,
            "FontBBox" => vec![x_min.into(), y_min.into(), x_max.into(), y_max.into()],
            "ItalicAngle" => 0,
            "Ascent" => ascent,
            "Descent" => font.descender as f32 * scale,
            "CapHeight" => ascent,
            "StemV" => 80,
            "FontFile2" => file_id,
        });

        let mut widths = Vec::new();
        for &glyph_id in self.used_glyphs.keys() {
            widths.push(Object::Integer(glyph_id as i64));
            widths.push(Object::Array(vec![font.glyph_width_1000(glyph_id).into()]));
        }
        let cid_id = pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => name,
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => descriptor_id,
            "DW" => 1000,
            "W" => widths,
            "CIDToGIDMap" => "Identity",
        });

        let cmap = to_unicode_cmap(&self.used_glyphs);
        let cmap_id = pdf.add_object(self.encode_stream(cmap.into_bytes(), Dictionary::new())?);

        Ok(pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => name,
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_id)],
            "ToUnicode" => cmap_id,
        }))
    }
}

fn role_stroke(role: StepRole) -> Rgb {
    let (r, g, b) = role.fill_rgb();
    (
        r as f32 / 255.0 * 0.7,
        g as f32 / 255.0 * 0.7,
        b as f32 / 255.0 * 0.7,
    )
}

fn builtin_font(font: BuiltinFont) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_name(),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn encode_stream(content: Vec<u8>, mut dict: Dictionary, compress: bool) -> Result<Stream> {
    if !compress {
        return Ok(Stream::new(dict, content));
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&content)?;
    dict.set("Filter", "FlateDecode");
    Ok(Stream::new(dict, encoder.finish()?))
}

/// PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Encode text for a WinAnsi simple font; unencodable characters become `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            c if (c as u32) < 0x80 || ((c as u32) >= 0xA0 && (c as u32) <= 0xFF) => c as u8,
            _ => b'?',
        })
        .collect()
}

/// ToUnicode CMap mapping 2-byte glyph codes back to their text.
fn to_unicode_cmap(glyphs: &BTreeMap<u16, String>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n/CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );
    let mapped: Vec<(&u16, &String)> = glyphs.iter().filter(|(_, t)| !t.is_empty()).collect();
    for chunk in mapped.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (glyph_id, text) in chunk {
            let hex: String = text.encode_utf16().map(|u| format!("{u:04X}")).collect();
            cmap.push_str(&format!("<{glyph_id:04X}> <{hex}>\n"));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Section};

    fn sample(cards: usize) -> Document {
        let mut doc = Document::with_title("Guide");
        for i in 0..cards {
            let mut s = Section::new(format!("Card {}", i + 1), 0);
            s.body.push(Block::paragraph("Some **bold** text"));
            s.body.push(Block::code("fn main() {}"));
            doc.push_section(s);
        }
        doc
    }

    fn load(bytes: &[u8]) -> lopdf::Document {
        lopdf::Document::load_mem(bytes).unwrap()
    }

    #[test]
    fn test_page_count_matches_pagination() {
        let fonts = FontLibrary::builtin();
        let bytes = to_pdf(&sample(3), &fonts, &RenderOptions::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert_eq!(load(&bytes).get_pages().len(), 4);
    }

    #[test]
    fn test_empty_document_has_toc_page_only() {
        let fonts = FontLibrary::builtin();
        let bytes = to_pdf(&Document::new(), &fonts, &RenderOptions::default()).unwrap();
        assert_eq!(load(&bytes).get_pages().len(), 1);
    }

    #[test]
    fn test_uncompressed_contains_labels() {
        let fonts = FontLibrary::builtin();
        let options = RenderOptions::default().with_compression(false);
        let bytes = to_pdf(&sample(2), &fonts, &options).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("(Table of Contents)"));
        assert!(text.contains("(Page 2 of 3)"));
        assert!(text.contains("(Next)"));
        assert!(text.contains("(Previous)"));
        assert!(text.contains("/Helvetica-Bold"));
        assert!(text.contains("/Courier"));
    }

    #[test]
    fn test_outline_and_links() {
        let fonts = FontLibrary::builtin();
        let bytes = to_pdf(&sample(2), &fonts, &RenderOptions::default()).unwrap();
        let pdf = load(&bytes);
        let catalog = pdf.catalog().unwrap();
        assert!(catalog.has(b"Outlines"));

        let pages = pdf.get_pages();
        let toc_id = pages[&1];
        let toc = pdf.get_dictionary(toc_id).unwrap();
        let annots = toc.get(b"Annots").unwrap().as_array().unwrap();
        assert_eq!(annots.len(), 2);
    }

    #[test]
    fn test_bookmarks_can_be_disabled() {
        let fonts = FontLibrary::builtin();
        let options = RenderOptions::default().with_bookmarks(false);
        let bytes = to_pdf(&sample(1), &fonts, &options).unwrap();
        assert!(!load(&bytes).catalog().unwrap().has(b"Outlines"));
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(to_win_ansi("a\u{e9}\u{2022}"), vec![b'a', 0xE9, 0x95]);
        assert_eq!(to_win_ansi("\u{645}"), vec![b'?']);
    }

    #[test]
    fn test_text_string() {
        assert!(matches!(
            text_string("abc"),
            Object::String(ref bytes, StringFormat::Literal) if bytes == b"abc"
        ));
        match text_string("\u{645}") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(bytes, vec![0xFE, 0xFF, 0x06, 0x45]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_to_unicode_cmap() {
        let mut glyphs = BTreeMap::new();
        glyphs.insert(3u16, "A".to_string());
        glyphs.insert(0x1F4u16, "\u{fb01}".to_string());
        let cmap = to_unicode_cmap(&glyphs);
        assert!(cmap.contains("2 beginbfchar"));
        assert!(cmap.contains("<0003> <0041>"));
        assert!(cmap.contains("<01F4> <FB01>"));
    }
}
