//! Content factories and content record edits.
//!
//! # Responsibility
//! - Create a content record and its owning node in one call.
//! - Remove content through the cascading node delete.
//! - Edit text block and violation records in place.
//!
//! # Invariants
//! - Every add is checked by the structural validator before anything is
//!   created; the record and its node are inserted together.
//! - Record `node_id` always names the node that references the record.

use crate::content::companion::CompanionChanges;
use crate::content::presets;
use crate::document::Document;
use crate::error::{log_rejection, ActError, ActResult};
use crate::model::node::{ContentId, Node, NodeId, NodeKind};
use crate::model::table::{Table, TableRole};
use crate::model::text_block::{TextBlock, TextFormatting};
use crate::model::violation::{Violation, ViolationSection};
use crate::tree::mutator::DeleteReport;
use log::info;

pub const DEFAULT_TABLE_ROWS: usize = 3;
pub const DEFAULT_TABLE_COLS: usize = 3;
/// Upper bound for either grid dimension.
pub const MAX_TABLE_DIMENSION: usize = 100;

/// Result of a content factory call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentAdded {
    pub node_id: NodeId,
    pub content_id: ContentId,
    /// Companion tables created as a side effect (risk presets only).
    pub companions: CompanionChanges,
}

impl Document {
    /// Appends a plain table with one header row and `rows` data rows.
    ///
    /// # Errors
    /// - Placement errors from `can_add_content`.
    /// - `InvalidTableShape` when `cols` is zero or a dimension is too large.
    pub fn add_table(
        &mut self,
        parent_id: &NodeId,
        rows: usize,
        cols: usize,
    ) -> ActResult<ContentAdded> {
        self.validator()
            .can_add_content(parent_id, NodeKind::Table)
            .map_err(|err| log_rejection("add_table", err))?;
        check_shape(rows, cols).map_err(|err| log_rejection("add_table", err))?;

        let headers = presets::plain_headers(cols);
        self.attach_content(parent_id, NodeKind::Table, "", |content_id, node_id| {
            Record::Table(Table::with_headers(content_id, node_id, &headers, rows))
        })
    }

    pub fn add_text_block(&mut self, parent_id: &NodeId) -> ActResult<ContentAdded> {
        self.validator()
            .can_add_content(parent_id, NodeKind::TextBlock)
            .map_err(|err| log_rejection("add_text_block", err))?;
        self.attach_content(parent_id, NodeKind::TextBlock, "", |content_id, node_id| {
            Record::TextBlock(TextBlock::new(content_id, node_id))
        })
    }

    pub fn add_violation(&mut self, parent_id: &NodeId) -> ActResult<ContentAdded> {
        self.validator()
            .can_add_content(parent_id, NodeKind::Violation)
            .map_err(|err| log_rejection("add_violation", err))?;
        self.attach_content(parent_id, NodeKind::Violation, "", |content_id, node_id| {
            Record::Violation(Violation::new(content_id, node_id))
        })
    }

    /// Adds a regular risk table; metrics companions appear if absent.
    pub fn add_regular_risk_table(&mut self, parent_id: &NodeId) -> ActResult<ContentAdded> {
        self.add_risk_table(parent_id, TableRole::RegularRisk)
    }

    /// Adds an operational risk table; metrics companions appear if absent.
    pub fn add_operational_risk_table(&mut self, parent_id: &NodeId) -> ActResult<ContentAdded> {
        self.add_risk_table(parent_id, TableRole::OperationalRisk)
    }

    fn add_risk_table(&mut self, parent_id: &NodeId, role: TableRole) -> ActResult<ContentAdded> {
        self.validator()
            .can_add_risk_table(parent_id)
            .map_err(|err| log_rejection("add_risk_table", err))?;
        self.attach_content(
            parent_id,
            NodeKind::Table,
            presets::base_label(role),
            |content_id, node_id| Record::Table(presets::build_table(role, content_id, node_id)),
        )
    }

    pub fn remove_table(&mut self, table_id: &ContentId) -> ActResult<DeleteReport> {
        self.remove_content(NodeKind::Table, table_id)
    }

    pub fn remove_text_block(&mut self, text_block_id: &ContentId) -> ActResult<DeleteReport> {
        self.remove_content(NodeKind::TextBlock, text_block_id)
    }

    pub fn remove_violation(&mut self, violation_id: &ContentId) -> ActResult<DeleteReport> {
        self.remove_content(NodeKind::Violation, violation_id)
    }

    /// Replaces text block content and, when given, its formatting.
    pub fn update_text_block(
        &mut self,
        text_block_id: &ContentId,
        content: &str,
        formatting: Option<TextFormatting>,
    ) -> ActResult<()> {
        let block = self.store.text_block_mut(text_block_id).ok_or_else(|| {
            log_rejection(
                "update_text_block",
                ActError::ContentNotFound(text_block_id.clone()),
            )
        })?;
        block.content = content.to_string();
        if let Some(formatting) = formatting {
            block.formatting = formatting;
        }
        Ok(())
    }

    /// Mutable access to a violation record for free-form edits.
    pub fn violation_mut(&mut self, violation_id: &ContentId) -> ActResult<&mut Violation> {
        self.store.violation_mut(violation_id).ok_or_else(|| {
            log_rejection(
                "violation_mut",
                ActError::ContentNotFound(violation_id.clone()),
            )
        })
    }

    /// Sets the two mandatory violation texts.
    pub fn set_violation_text(
        &mut self,
        violation_id: &ContentId,
        violated: &str,
        established: &str,
    ) -> ActResult<()> {
        let violation = self.violation_mut(violation_id)?;
        violation.violated = violated.to_string();
        violation.established = established.to_string();
        Ok(())
    }

    /// Toggles one optional text section and replaces its content.
    pub fn set_violation_section(
        &mut self,
        violation_id: &ContentId,
        section: ViolationSection,
        enabled: bool,
        content: &str,
    ) -> ActResult<()> {
        let target = self.violation_mut(violation_id)?.section_mut(section);
        target.enabled = enabled;
        target.content = content.to_string();
        Ok(())
    }

    /// Toggles the description list and replaces its items.
    pub fn set_violation_description(
        &mut self,
        violation_id: &ContentId,
        enabled: bool,
        items: Vec<String>,
    ) -> ActResult<()> {
        let list = &mut self.violation_mut(violation_id)?.description_list;
        list.enabled = enabled;
        list.items = items;
        Ok(())
    }

    fn attach_content(
        &mut self,
        parent_id: &NodeId,
        kind: NodeKind,
        base_label: &str,
        build: impl FnOnce(ContentId, NodeId) -> Record,
    ) -> ActResult<ContentAdded> {
        let content_id = ContentId::generate(kind);
        let node = Node::new_content(kind, content_id.clone(), base_label);
        let node_id = node.id.clone();
        let record = build(content_id.clone(), node_id.clone());

        self.children_of_mut(parent_id)?.push(node);
        match record {
            Record::Table(table) => {
                self.store.tables.insert(content_id.clone(), table);
            }
            Record::TextBlock(block) => {
                self.store.text_blocks.insert(content_id.clone(), block);
            }
            Record::Violation(violation) => {
                self.store.violations.insert(content_id.clone(), violation);
            }
        }
        let companions = self.refresh();

        info!(
            "event=content_add module=content status=ok kind={:?} node={} parent={} companions_created={}",
            kind,
            node_id,
            parent_id,
            companions.created.len()
        );
        Ok(ContentAdded {
            node_id,
            content_id,
            companions,
        })
    }

    fn remove_content(&mut self, kind: NodeKind, content_id: &ContentId) -> ActResult<DeleteReport> {
        let node_id = self
            .node_for_content(content_id)
            .filter(|node| node.kind() == kind)
            .map(|node| node.id.clone())
            .ok_or_else(|| {
                log_rejection("remove_content", ActError::ContentNotFound(content_id.clone()))
            })?;
        self.delete(&node_id)
    }
}

enum Record {
    Table(Table),
    TextBlock(TextBlock),
    Violation(Violation),
}

fn check_shape(rows: usize, cols: usize) -> ActResult<()> {
    if cols == 0 {
        return Err(ActError::InvalidTableShape(
            "table needs at least one column".to_string(),
        ));
    }
    if rows > MAX_TABLE_DIMENSION || cols > MAX_TABLE_DIMENSION {
        return Err(ActError::InvalidTableShape(format!(
            "{rows}x{cols} exceeds {MAX_TABLE_DIMENSION} rows or columns"
        )));
    }
    Ok(())
}
