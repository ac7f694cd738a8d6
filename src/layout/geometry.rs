//! Page geometry and fixed typographic metrics.

use serde::{Deserialize, Serialize};

/// Points per centimetre.
pub const CM: f32 = 72.0 / 2.54;

/// Physical page size and margins, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Margin on every side
    pub margin: f32,
    /// Height of the navigation footer band
    pub nav_height: f32,
}

impl PageGeometry {
    /// A4 portrait with 2 cm margins and a 1.5 cm navigation band.
    pub fn a4() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin: 2.0 * CM,
            nav_height: 1.5 * CM,
        }
    }

    /// Width between the side margins.
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Height between the top and bottom margins.
    pub fn content_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }

    /// Y coordinate (PDF space, origin bottom-left) of the top of the content box.
    pub fn content_top(&self) -> f32 {
        self.height - self.margin
    }

    /// Left edge of the content box.
    pub fn left(&self) -> f32 {
        self.margin
    }

    /// Right edge of the content box.
    pub fn right(&self) -> f32 {
        self.width - self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Font sizes, line heights and block heights used by layout and drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutMetrics {
    /// Card title font size
    pub title_size: f32,
    /// Baseline of the card title below the content top
    pub title_baseline: f32,
    /// Underline rule below the content top
    pub title_rule: f32,
    /// Space taken by the title block on a card's first page
    pub title_block: f32,
    /// Space taken by the repeated header on continuation pages
    pub continuation_block: f32,

    /// Body font size
    pub body_size: f32,
    /// Body line height
    pub body_leading: f32,
    /// Text is wrapped this much narrower than the content box
    pub wrap_inset: f32,
    /// Extra indent for list items and quotes
    pub indent: f32,
    /// Space after each block
    pub block_gap: f32,

    /// Sub-card heading font size
    pub subheading_size: f32,
    /// Sub-card heading line height
    pub subheading_leading: f32,

    /// Code font size (Courier)
    pub code_size: f32,
    /// Code line height
    pub code_leading: f32,
    /// Space for the gap and "code" label above a code box
    pub code_header: f32,
    /// Vertical padding inside the code box
    pub code_padding: f32,
    /// Lines beyond this are dropped from a code box
    pub code_max_lines: usize,

    /// Height of one labeled diagram step
    pub step_height: f32,
    /// Height of one diagram connector
    pub connector_height: f32,

    /// Main title size on the TOC page
    pub toc_main_title_size: f32,
    /// TOC heading size
    pub toc_title_size: f32,
    /// TOC entry font size
    pub toc_entry_size: f32,
    /// Space above the first entry on the first TOC page
    pub toc_header: f32,
    /// Space above the first entry on following TOC pages
    pub toc_continuation_header: f32,
    /// Height of one TOC entry
    pub toc_entry_height: f32,
    /// Space kept free below the last TOC entry
    pub toc_bottom: f32,

    /// Footer font size
    pub nav_size: f32,
    /// Free space kept above the navigation band
    pub nav_clearance: f32,
}

impl LayoutMetrics {
    /// Vertical space reserved at the foot of every card page.
    pub fn nav_reserve(&self, geometry: &PageGeometry) -> f32 {
        geometry.nav_height + self.nav_clearance
    }

    /// Usable body height on a card page.
    pub fn body_capacity(&self, geometry: &PageGeometry, continuation: bool) -> f32 {
        let header = if continuation {
            self.continuation_block
        } else {
            self.title_block
        };
        geometry.content_height() - header - self.nav_reserve(geometry)
    }

    /// Number of TOC entries that fit on a TOC page.
    pub fn toc_capacity(&self, geometry: &PageGeometry, first_page: bool) -> usize {
        let header = if first_page {
            self.toc_header
        } else {
            self.toc_continuation_header
        };
        let room = geometry.content_height() - header - self.toc_bottom;
        if room < 0.0 {
            return 1;
        }
        (room / self.toc_entry_height).floor() as usize + 1
    }

    /// Width that body text is wrapped to.
    pub fn wrap_width(&self, geometry: &PageGeometry) -> f32 {
        geometry.content_width() - self.wrap_inset
    }
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            title_size: 18.0,
            title_baseline: 30.0,
            title_rule: 35.0,
            title_block: 70.0,
            continuation_block: 30.0,
            body_size: 11.0,
            body_leading: 16.0,
            wrap_inset: 40.0,
            indent: 20.0,
            block_gap: 8.0,
            subheading_size: 13.0,
            subheading_leading: 22.0,
            code_size: 9.0,
            code_leading: 12.0,
            code_header: 25.0,
            code_padding: 20.0,
            code_max_lines: 15,
            step_height: 30.0,
            connector_height: 18.0,
            toc_main_title_size: 24.0,
            toc_title_size: 18.0,
            toc_entry_size: 12.0,
            toc_header: 120.0,
            toc_continuation_header: 60.0,
            toc_entry_height: 25.0,
            toc_bottom: 50.0,
            nav_size: 10.0,
            nav_clearance: 50.0,
        }
    }
}
