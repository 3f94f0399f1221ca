//! Rich text block content model.

use crate::model::node::{ContentId, NodeId};
use serde::{Deserialize, Serialize};

/// Default font size in points.
pub const DEFAULT_FONT_SIZE: u32 = 14;

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Block-level formatting flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFormatting {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub font_size: u32,
    pub alignment: Alignment,
}

impl Default for TextFormatting {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            underline: false,
            font_size: DEFAULT_FONT_SIZE,
            alignment: Alignment::Left,
        }
    }
}

/// Text block record, 1:1 with its node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub id: ContentId,
    pub node_id: NodeId,
    /// Rich text markup as produced by the editor widget.
    pub content: String,
    pub formatting: TextFormatting,
}

impl TextBlock {
    pub fn new(id: ContentId, node_id: NodeId) -> Self {
        Self {
            id,
            node_id,
            content: String::new(),
            formatting: TextFormatting::default(),
        }
    }
}
