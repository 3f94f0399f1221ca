//! UI-facing editing session API.
//!
//! # Responsibility
//! - Expose use-case level operations over one document.
//! - Convert typed results into the `{success, reason?, ...}` envelope the
//!   UI layer consumes.
//! - Record undo history for every applied mutation.
//!
//! # Invariants
//! - Session calls never panic; failures come back as `success = false`.
//! - A failed call records no history entry.

use crate::config::EditorConfig;
use crate::content::factory::{DEFAULT_TABLE_COLS, DEFAULT_TABLE_ROWS};
use crate::document::Document;
use crate::error::ActResult;
use crate::export;
use crate::history::History;
use crate::model::node::{ContentId, NodeId};
use crate::model::table::CellRef;
use crate::tree::validator::DropPosition;
use log::info;
use serde::Serialize;

/// Result envelope for one UI operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub success: bool,
    /// Human-readable rejection reason, set on failure only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Created or affected node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    /// Created or affected content record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<ContentId>,
}

impl ActionResponse {
    fn success(node_id: Option<NodeId>, content_id: Option<ContentId>) -> Self {
        Self {
            success: true,
            reason: None,
            node_id,
            content_id,
        }
    }

    fn failure(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: Some(reason.into()),
            node_id: None,
            content_id: None,
        }
    }
}

/// Which content factory an add request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRequest {
    /// Plain table with explicit shape.
    Table { rows: usize, cols: usize },
    TextBlock,
    Violation,
    RegularRiskTable,
    OperationalRiskTable,
}

impl ContentRequest {
    /// Plain table with the default 3x3 shape.
    pub fn default_table() -> Self {
        Self::Table {
            rows: DEFAULT_TABLE_ROWS,
            cols: DEFAULT_TABLE_COLS,
        }
    }
}

/// One editing session: a document plus its undo history.
#[derive(Debug, Clone)]
pub struct ActSession {
    document: Document,
    history: History,
}

impl Default for ActSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl ActSession {
    /// Starts a session on a fresh document.
    pub fn new(config: EditorConfig) -> Self {
        let config = config.normalized();
        Self {
            document: Document::with_limits(config.limits),
            history: History::new(config.history_capacity),
        }
    }

    /// Starts a session on an existing document.
    pub fn with_document(document: Document, config: EditorConfig) -> Self {
        Self {
            document,
            history: History::new(config.normalized().history_capacity),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn insert(&mut self, reference_id: &NodeId, label: &str, as_child: bool) -> ActionResponse {
        self.apply(|document| {
            let node_id = document.insert(reference_id, label, as_child)?;
            Ok(ActionResponse::success(Some(node_id), None))
        })
    }

    pub fn delete(&mut self, node_id: &NodeId) -> ActionResponse {
        self.apply(|document| {
            document.delete(node_id)?;
            Ok(ActionResponse::success(Some(node_id.clone()), None))
        })
    }

    pub fn move_node(
        &mut self,
        dragged_id: &NodeId,
        target_id: &NodeId,
        position: DropPosition,
    ) -> ActionResponse {
        self.apply(|document| {
            document.move_node(dragged_id, target_id, position)?;
            Ok(ActionResponse::success(Some(dragged_id.clone()), None))
        })
    }

    pub fn rename(&mut self, node_id: &NodeId, custom_label: &str) -> ActionResponse {
        self.apply(|document| {
            document.set_custom_label(node_id, custom_label)?;
            Ok(ActionResponse::success(Some(node_id.clone()), None))
        })
    }

    pub fn update_item_content(&mut self, node_id: &NodeId, text: &str) -> ActionResponse {
        self.apply(|document| {
            document.update_item_content(node_id, text)?;
            Ok(ActionResponse::success(Some(node_id.clone()), None))
        })
    }

    pub fn add_content(&mut self, parent_id: &NodeId, request: ContentRequest) -> ActionResponse {
        self.apply(|document| {
            let added = match request {
                ContentRequest::Table { rows, cols } => document.add_table(parent_id, rows, cols)?,
                ContentRequest::TextBlock => document.add_text_block(parent_id)?,
                ContentRequest::Violation => document.add_violation(parent_id)?,
                ContentRequest::RegularRiskTable => document.add_regular_risk_table(parent_id)?,
                ContentRequest::OperationalRiskTable => {
                    document.add_operational_risk_table(parent_id)?
                }
            };
            Ok(ActionResponse::success(
                Some(added.node_id),
                Some(added.content_id),
            ))
        })
    }

    pub fn remove_table(&mut self, table_id: &ContentId) -> ActionResponse {
        self.apply(|document| {
            document.remove_table(table_id)?;
            Ok(ActionResponse::success(None, Some(table_id.clone())))
        })
    }

    pub fn remove_text_block(&mut self, text_block_id: &ContentId) -> ActionResponse {
        self.apply(|document| {
            document.remove_text_block(text_block_id)?;
            Ok(ActionResponse::success(None, Some(text_block_id.clone())))
        })
    }

    pub fn remove_violation(&mut self, violation_id: &ContentId) -> ActionResponse {
        self.apply(|document| {
            document.remove_violation(violation_id)?;
            Ok(ActionResponse::success(None, Some(violation_id.clone())))
        })
    }

    /// Sets cell text. Editing a covered cell succeeds without changes and
    /// without an undo entry.
    pub fn set_cell(
        &mut self,
        table_id: &ContentId,
        row: usize,
        col: usize,
        content: &str,
    ) -> ActionResponse {
        self.apply(|document| {
            document.set_cell(table_id, row, col, content)?;
            Ok(ActionResponse::success(None, Some(table_id.clone())))
        })
    }

    pub fn merge(&mut self, table_id: &ContentId, selection: &[CellRef]) -> ActionResponse {
        self.apply(|document| {
            document.merge_cells(table_id, selection)?;
            Ok(ActionResponse::success(None, Some(table_id.clone())))
        })
    }

    pub fn unmerge(&mut self, table_id: &ContentId, at: CellRef) -> ActionResponse {
        self.apply(|document| {
            document.unmerge_cell(table_id, at)?;
            Ok(ActionResponse::success(None, Some(table_id.clone())))
        })
    }

    pub fn undo(&mut self) -> ActionResponse {
        if self.history.undo(&mut self.document) {
            info!("event=history_undo module=api status=ok");
            ActionResponse::success(None, None)
        } else {
            ActionResponse::failure("nothing to undo")
        }
    }

    pub fn redo(&mut self) -> ActionResponse {
        if self.history.redo(&mut self.document) {
            info!("event=history_redo module=api status=ok");
            ActionResponse::success(None, None)
        } else {
            ActionResponse::failure("nothing to redo")
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Export snapshot as JSON.
    pub fn export_json(&self) -> ActResult<String> {
        export::to_json(&self.document)
    }

    /// Runs one mutation against a scratch copy and commits it on success.
    fn apply(
        &mut self,
        operation: impl FnOnce(&mut Document) -> ActResult<ActionResponse>,
    ) -> ActionResponse {
        let mut draft = self.document.clone();
        match operation(&mut draft) {
            Ok(response) => {
                // No-op edits such as writes to covered cells leave history alone.
                if draft != self.document {
                    let before = std::mem::replace(&mut self.document, draft);
                    self.history.record(before);
                }
                response
            }
            Err(err) => ActionResponse::failure(err.to_string()),
        }
    }
}
