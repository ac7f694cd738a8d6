//! Page geometry, text measurement and pagination.

pub mod fonts;
pub mod geometry;
pub mod paginate;
pub mod wrap;

pub use fonts::{BuiltinFont, FontLibrary, LoadedFont, ShapedGlyph, TextMeasurer};
pub use geometry::{LayoutMetrics, PageGeometry};
pub use paginate::{
    CardPage, LayoutItem, LineStyle, PageAssignment, Pagination, Paginator, PlacedItem,
};
pub use wrap::{truncate_to_width, wrap_text, wrap_words};
