//! Font registration and text measurement.
//!
//! A [`FontLibrary`] is set up once per process and then shared read-only by
//! every conversion. Registration is idempotent: the first candidate that
//! loads wins and later calls are no-ops. When no TrueType face can be
//! loaded the library measures with the built-in Helvetica metrics, which is
//! also what the PDF writer falls back to.

use crate::error::{Error, Result};
use rustybuzz::{Feature, UnicodeBuffer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use ttf_parser::{GlyphId, Tag};

/// Well-known locations of fonts with Arabic and Latin coverage.
pub const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansArabic-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:/Windows/Fonts/arial.ttf",
];

/// Family names tried against the system font database.
const SYSTEM_FAMILIES: &[&str] = &["DejaVu Sans", "Noto Sans Arabic", "Arial", "Liberation Sans"];

/// Measures the advance width of a string at a font size, in points.
pub trait TextMeasurer {
    /// Width of `text` in the proportional body face.
    fn text_width(&self, text: &str, font_size: f32) -> f32;

    /// Width of `text` in the monospaced code face.
    fn code_width(&self, text: &str, font_size: f32) -> f32 {
        BuiltinFont::Courier.text_width(text, font_size)
    }
}

/// The standard PDF fonts used when no TrueType face is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
    Courier,
}

impl BuiltinFont {
    /// PostScript base font name.
    pub fn base_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
            BuiltinFont::Courier => "Courier",
        }
    }

    /// Advance of one character in 1/1000 em.
    pub fn char_width(&self, c: char) -> u16 {
        match self {
            BuiltinFont::Courier => 600,
            // Bold is measured with regular widths.
            BuiltinFont::Helvetica | BuiltinFont::HelveticaBold => helvetica_width(c),
        }
    }

    /// Width of `text` at `font_size`.
    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 * font_size / 1000.0
    }
}

/// Helvetica AFM widths for printable ASCII; other characters use the
/// width of a digit.
fn helvetica_width(c: char) -> u16 {
    const ASCII: [u16; 95] = [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
        278, 278, 584, 584, 584, 556, 1015, // :..@
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
        278, 278, 278, 469, 556, 333, // [..`
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
        334, 260, 334, 584, // {..~
    ];
    match c {
        ' '..='~' => ASCII[(c as usize) - 32],
        '\u{a0}' => 278,
        _ => 556,
    }
}

/// A registered TrueType face.
#[derive(Debug, Clone)]
pub struct LoadedFont {
    data: Arc<Vec<u8>>,
    /// PostScript name (used as the PDF base font)
    pub postscript_name: String,
    /// Where the face was loaded from, if from disk
    pub source: Option<PathBuf>,
    /// Design units per em
    pub units_per_em: u16,
    /// Ascender in design units
    pub ascender: i16,
    /// Descender in design units (negative)
    pub descender: i16,
    /// Number of glyphs in the face
    pub glyph_count: u16,
}

/// One shaped glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    /// Glyph id in the registered face
    pub glyph_id: u16,
    /// Byte offset of the source cluster in the shaped text
    pub cluster: u32,
    /// Advance in points
    pub advance: f32,
}

impl LoadedFont {
    /// Parse a face from raw TrueType/OpenType bytes.
    pub fn from_bytes(data: Vec<u8>, source: Option<PathBuf>) -> Result<Self> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| Error::Font(format!("cannot parse font: {e}")))?;
        if face.tables().glyf.is_none() {
            return Err(Error::Font(
                "only TrueType outlines (glyf) can be embedded".to_string(),
            ));
        }

        let postscript_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .and_then(|n| n.to_string())
            .map(|n| sanitize_font_name(&n))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "CardbookSans".to_string());

        Ok(Self {
            postscript_name,
            source,
            units_per_em: face.units_per_em(),
            ascender: face.ascender(),
            descender: face.descender(),
            glyph_count: face.number_of_glyphs(),
            data: Arc::new(data),
        })
    }

    /// Read and parse a face from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data, Some(path.to_path_buf()))
    }

    /// Raw font file bytes, for embedding.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Shape `text` as one run, in the order rustybuzz produces for the
    /// run's script direction.
    pub fn shape(&self, text: &str, font_size: f32) -> Vec<ShapedGlyph> {
        let Some(face) = rustybuzz::Face::from_slice(&self.data, 0) else {
            return Vec::new();
        };
        let features = [
            Feature::new(Tag::from_bytes(b"liga"), 1, ..),
            Feature::new(Tag::from_bytes(b"kern"), 1, ..),
        ];
        let scale = font_size / self.units_per_em as f32;

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();
        let output = rustybuzz::shape(&face, &features, buffer);

        output
            .glyph_infos()
            .iter()
            .zip(output.glyph_positions())
            .map(|(info, pos)| ShapedGlyph {
                glyph_id: info.glyph_id as u16,
                cluster: info.cluster,
                advance: pos.x_advance as f32 * scale,
            })
            .collect()
    }

    /// Horizontal advance of a glyph in 1/1000 em, for the PDF width array.
    pub fn glyph_width_1000(&self, glyph_id: u16) -> f32 {
        let Ok(face) = ttf_parser::Face::parse(&self.data, 0) else {
            return 0.0;
        };
        let advance = face.glyph_hor_advance(GlyphId(glyph_id)).unwrap_or(0);
        advance as f32 * 1000.0 / self.units_per_em as f32
    }

    /// Bounding box in 1/1000 em: (x_min, y_min, x_max, y_max).
    pub fn bbox_1000(&self) -> (f32, f32, f32, f32) {
        let Ok(face) = ttf_parser::Face::parse(&self.data, 0) else {
            return (0.0, 0.0, 1000.0, 1000.0);
        };
        let r = face.global_bounding_box();
        let s = 1000.0 / self.units_per_em as f32;
        (
            r.x_min as f32 * s,
            r.y_min as f32 * s,
            r.x_max as f32 * s,
            r.y_max as f32 * s,
        )
    }
}

impl TextMeasurer for LoadedFont {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        self.shape(text, font_size).iter().map(|g| g.advance).sum()
    }
}

/// PDF names cannot contain whitespace or delimiters.
fn sanitize_font_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_graphic() && !"()<>[]{}/%#".contains(*c))
        .collect()
}

/// Process-wide font registry.
#[derive(Debug, Clone, Default)]
pub struct FontLibrary {
    font: Option<LoadedFont>,
}

impl FontLibrary {
    /// Create a library that measures with the built-in fonts only.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Create a library and register the first usable system font.
    pub fn system() -> Self {
        let mut library = Self::default();
        let candidates: Vec<PathBuf> = DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from).collect();
        if library.register_candidates(&candidates).is_none() && !library.register_system() {
            log::warn!("No TrueType font found; falling back to built-in Helvetica");
        }
        library
    }

    /// Register the first candidate path that loads.
    ///
    /// Returns the registered face. Once a face is registered this returns
    /// it without touching the candidates.
    pub fn register_candidates(&mut self, candidates: &[PathBuf]) -> Option<&LoadedFont> {
        if self.font.is_none() {
            for path in candidates {
                if !path.exists() {
                    continue;
                }
                match LoadedFont::from_path(path) {
                    Ok(font) => {
                        log::info!(
                            "Registered font {} from {}",
                            font.postscript_name,
                            path.display()
                        );
                        self.font = Some(font);
                        break;
                    }
                    Err(e) => log::debug!("Skipping font {}: {e}", path.display()),
                }
            }
        }
        self.font.as_ref()
    }

    /// Register raw font bytes unless a face is already registered.
    pub fn register_bytes(&mut self, data: Vec<u8>) -> Result<&LoadedFont> {
        if self.font.is_none() {
            self.font = Some(LoadedFont::from_bytes(data, None)?);
        }
        self.font
            .as_ref()
            .ok_or_else(|| Error::Font("font registration failed".to_string()))
    }

    /// Query the system font database for a sans-serif face.
    pub fn register_system(&mut self) -> bool {
        if self.font.is_some() {
            return true;
        }
        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        let families: Vec<fontdb::Family<'_>> = SYSTEM_FAMILIES
            .iter()
            .map(|f| fontdb::Family::Name(*f))
            .chain(std::iter::once(fontdb::Family::SansSerif))
            .collect();
        let query = fontdb::Query {
            families: &families,
            weight: fontdb::Weight::NORMAL,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };

        let Some(id) = db.query(&query) else {
            log::debug!("fontdb found no sans-serif face");
            return false;
        };
        let loaded = db.with_face_data(id, |data, index| {
            if index != 0 {
                return None;
            }
            LoadedFont::from_bytes(data.to_vec(), None).ok()
        });
        match loaded.flatten() {
            Some(font) => {
                log::info!("Registered system font {}", font.postscript_name);
                self.font = Some(font);
                true
            }
            None => false,
        }
    }

    /// The registered face, if any.
    pub fn font(&self) -> Option<&LoadedFont> {
        self.font.as_ref()
    }

    /// Whether measurement uses the built-in fallback.
    pub fn is_builtin(&self) -> bool {
        self.font.is_none()
    }
}

impl TextMeasurer for FontLibrary {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        match &self.font {
            Some(font) => font.text_width(text, font_size),
            None => BuiltinFont::Helvetica.text_width(text, font_size),
        }
    }
}
