//! Document tree node model.
//!
//! # Responsibility
//! - Define the node shape shared by every tree operation.
//! - Keep kind-specific fields in a sum type so a content node always
//!   carries exactly one content id and an item never does.
//!
//! # Invariants
//! - `id` is stable and never reused inside one document.
//! - `label` and `number` are derived by renumbering; callers edit
//!   `base_label`/`custom_label` only.
//! - Only `NodeBody::Item` owns children.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Fixed id of the document root.
pub const ROOT_ID: &str = "root";

/// Stable opaque node identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Id of the document root.
    pub fn root() -> Self {
        Self(ROOT_ID.to_string())
    }

    /// Generates a fresh id for a node of `kind`.
    pub fn generate(kind: NodeKind) -> Self {
        Self(format!("{}-{}", kind.id_prefix(), Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identifier of a table, text block or violation record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Generates a fresh content id for a content node of `kind`.
    pub fn generate(kind: NodeKind) -> Self {
        Self(format!(
            "{}-data-{}",
            kind.id_prefix(),
            Uuid::new_v4().simple()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ContentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for ContentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Node category. Serialized as the export `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Item,
    Table,
    #[serde(rename = "textblock")]
    TextBlock,
    Violation,
}

impl NodeKind {
    fn id_prefix(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Table => "table",
            Self::TextBlock => "text",
            Self::Violation => "violation",
        }
    }

    /// Display prefix used by kind-scoped numbering. Items use hierarchical numbers.
    pub fn counter_prefix(self) -> Option<&'static str> {
        match self {
            Self::Item => None,
            Self::Table => Some("Таблица"),
            Self::TextBlock => Some("Текстовый блок"),
            Self::Violation => Some("Нарушение"),
        }
    }

    pub fn plural_name(self) -> &'static str {
        match self {
            Self::Item => "items",
            Self::Table => "tables",
            Self::TextBlock => "text blocks",
            Self::Violation => "violations",
        }
    }

    pub fn is_content(self) -> bool {
        self != Self::Item
    }
}

/// Kind-specific node payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    /// Outline item with free text and ordered children.
    Item {
        content: String,
        children: Vec<Node>,
    },
    Table {
        table_id: ContentId,
    },
    TextBlock {
        text_block_id: ContentId,
    },
    Violation {
        violation_id: ContentId,
    },
}

/// One document tree element.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Derived display label: `custom_label` or `"{number} {base_label}"`.
    pub label: String,
    /// Derived positional number, e.g. `1.2` or `Таблица 3`.
    pub number: String,
    /// User-supplied title text without any number prefix.
    pub base_label: String,
    /// Explicit label override. `number` is still computed when set.
    pub custom_label: Option<String>,
    pub protected: bool,
    pub deletable: bool,
    pub body: NodeBody,
}

impl Node {
    /// Creates an unprotected item node with a fresh id.
    pub fn new_item(base_label: impl Into<String>) -> Self {
        Self::item_with_id(NodeId::generate(NodeKind::Item), base_label)
    }

    /// Creates an item node with a caller-provided id.
    pub fn item_with_id(id: NodeId, base_label: impl Into<String>) -> Self {
        Self::with_body(
            id,
            base_label,
            NodeBody::Item {
                content: String::new(),
                children: Vec::new(),
            },
        )
    }

    /// Creates a content node pointing at `content_id`.
    ///
    /// `NodeKind::Item` yields an empty item and drops `content_id`.
    pub fn new_content(
        kind: NodeKind,
        content_id: ContentId,
        base_label: impl Into<String>,
    ) -> Self {
        let body = match kind {
            NodeKind::Item => NodeBody::Item {
                content: String::new(),
                children: Vec::new(),
            },
            NodeKind::Table => NodeBody::Table {
                table_id: content_id,
            },
            NodeKind::TextBlock => NodeBody::TextBlock {
                text_block_id: content_id,
            },
            NodeKind::Violation => NodeBody::Violation {
                violation_id: content_id,
            },
        };
        Self::with_body(NodeId::generate(kind), base_label, body)
    }

    pub(crate) fn with_body(id: NodeId, base_label: impl Into<String>, body: NodeBody) -> Self {
        Self {
            id,
            label: String::new(),
            number: String::new(),
            base_label: base_label.into(),
            custom_label: None,
            protected: false,
            deletable: true,
            body,
        }
    }

    /// Marks node as protected and non-deletable.
    pub fn protect(mut self) -> Self {
        self.protected = true;
        self.deletable = false;
        self
    }

    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Item { .. } => NodeKind::Item,
            NodeBody::Table { .. } => NodeKind::Table,
            NodeBody::TextBlock { .. } => NodeKind::TextBlock,
            NodeBody::Violation { .. } => NodeKind::Violation,
        }
    }

    pub fn is_item(&self) -> bool {
        matches!(self.body, NodeBody::Item { .. })
    }

    /// Content id for table/text block/violation nodes.
    pub fn content_id(&self) -> Option<&ContentId> {
        match &self.body {
            NodeBody::Item { .. } => None,
            NodeBody::Table { table_id } => Some(table_id),
            NodeBody::TextBlock { text_block_id } => Some(text_block_id),
            NodeBody::Violation { violation_id } => Some(violation_id),
        }
    }

    /// Ordered children. Empty for content nodes.
    pub fn children(&self) -> &[Node] {
        match &self.body {
            NodeBody::Item { children, .. } => children,
            _ => &[],
        }
    }

    /// Mutable children vector, only for items.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.body {
            NodeBody::Item { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Free text of an item node.
    pub fn item_content(&self) -> Option<&str> {
        match &self.body {
            NodeBody::Item { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Non-empty custom label, if any.
    pub fn effective_custom_label(&self) -> Option<&str> {
        self.custom_label
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Counts direct children of `kind`.
    pub fn count_children_of(&self, kind: NodeKind) -> usize {
        self.children()
            .iter()
            .filter(|child| child.kind() == kind)
            .count()
    }
}
