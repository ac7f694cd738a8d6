//! Document model types for card books.
//!
//! This module defines the tree produced by the parsers and consumed by the
//! layout engine and renderers: a document holds ordered cards, a card holds
//! blocks and at most one level of sub-cards.

mod block;
mod document;
mod section;
mod table;

pub use block::{Block, DiagramStep, StepRole};
pub use document::{Document, Metadata};
pub use section::{Section, Subsection};
pub use table::Table;
