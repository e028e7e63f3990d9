//! Core data structures for the Intermediate Representation (IR).

use serde::{Deserialize, Serialize};

/// The block sequence behind a single editable field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// A top-level structural unit.
///
/// Text fields hold inline Markdown (`**bold**`, `*italic*`, `` `code` ``);
/// they are only expanded to HTML tags inside the live editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    TaskItem { checked: bool, text: String },
    BulletItem { text: String },
    NumberedItem { text: String },
    Image { alt: String, url: String },
}

impl Block {
    /// The list run this block belongs to, if any.
    pub fn list_kind(&self) -> Option<ListKind> {
        match self {
            Block::BulletItem { .. } => Some(ListKind::Bullet),
            Block::NumberedItem { .. } => Some(ListKind::Numbered),
            _ => None,
        }
    }

    /// Short label used by the inspect output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Heading { .. } => "Heading",
            Block::Paragraph { .. } => "Paragraph",
            Block::TaskItem { .. } => "TaskItem",
            Block::BulletItem { .. } => "BulletItem",
            Block::NumberedItem { .. } => "NumberedItem",
            Block::Image { .. } => "Image",
        }
    }
}

/// Kind of a contiguous list run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Bullet,
    Numbered,
}

impl ListKind {
    /// HTML container tag for the run.
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "ul",
            ListKind::Numbered => "ol",
        }
    }
}

/// Represents inline content of a text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineContent {
    Text(String),
    Bold(Vec<InlineContent>),
    Italic(Vec<InlineContent>),
    Code(String),
}
