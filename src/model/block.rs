//! Content blocks owned by cards and sub-cards.

use super::Table;
use serde::{Deserialize, Serialize};

/// A block-level content element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A single paragraph of inline-marked text
    Paragraph { text: String },

    /// A bulleted list
    List { items: Vec<String> },

    /// A table
    Table(Table),

    /// Literal code, rendered verbatim in a monospaced left-to-right box
    Code { text: String },

    /// A flow diagram recovered from box-drawing art
    Diagram { steps: Vec<DiagramStep> },

    /// A quoted paragraph
    Blockquote { text: String },
}

impl Block {
    /// Create a paragraph block.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph { text: text.into() }
    }

    /// Create a code block.
    pub fn code(text: impl Into<String>) -> Self {
        Block::Code { text: text.into() }
    }

    /// Create a blockquote block.
    pub fn blockquote(text: impl Into<String>) -> Self {
        Block::Blockquote { text: text.into() }
    }

    /// Short name of the variant, used by stats and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Paragraph { .. } => "paragraph",
            Block::List { .. } => "list",
            Block::Table(_) => "table",
            Block::Code { .. } => "code",
            Block::Diagram { .. } => "diagram",
            Block::Blockquote { .. } => "blockquote",
        }
    }

    /// Whether this block is laid out left-to-right regardless of document direction.
    pub fn is_code(&self) -> bool {
        matches!(self, Block::Code { .. })
    }

    /// Get plain text content of the block.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph { text } | Block::Blockquote { text } | Block::Code { text } => {
                text.clone()
            }
            Block::List { items } => items.join("\n"),
            Block::Table(table) => table.plain_text(),
            Block::Diagram { steps } => steps
                .iter()
                .filter(|s| !s.is_connector)
                .map(|s| s.label.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// One node or connector of a flow diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramStep {
    /// Label text with box-drawing glyphs removed (empty for connectors)
    pub label: String,

    /// Inferred role, used for styling
    pub role: StepRole,

    /// Whether this is an arrow between two labeled steps
    pub is_connector: bool,
}

impl DiagramStep {
    /// Create a labeled step.
    pub fn labeled(label: impl Into<String>, role: StepRole) -> Self {
        Self {
            label: label.into(),
            role,
            is_connector: false,
        }
    }

    /// Create a connector step.
    pub fn connector() -> Self {
        Self {
            label: String::new(),
            role: StepRole::Generic,
            is_connector: true,
        }
    }
}

/// Role of a diagram step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepRole {
    User,
    Orchestrator,
    Planner,
    Executor,
    Tool,
    Llm,
    Result,
    Index,
    #[default]
    Generic,
}

impl StepRole {
    /// CSS class name used by the HTML renderers.
    pub fn class_name(&self) -> &'static str {
        match self {
            StepRole::User => "user",
            StepRole::Orchestrator => "orchestrator",
            StepRole::Planner => "planner",
            StepRole::Executor => "executor",
            StepRole::Tool => "tool",
            StepRole::Llm => "llm",
            StepRole::Result => "result",
            StepRole::Index => "index",
            StepRole::Generic => "generic",
        }
    }

    /// Fill colour (RGB, 0-255) used when drawing the step box.
    pub fn fill_rgb(&self) -> (u8, u8, u8) {
        match self {
            StepRole::User => (227, 242, 253),
            StepRole::Orchestrator => (243, 229, 245),
            StepRole::Planner => (232, 245, 233),
            StepRole::Executor => (255, 243, 224),
            StepRole::Tool => (252, 228, 236),
            StepRole::Llm => (224, 242, 241),
            StepRole::Result => (241, 248, 233),
            StepRole::Index => (255, 248, 225),
            StepRole::Generic => (245, 245, 245),
        }
    }
}
