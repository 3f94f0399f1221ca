//! Structural tree edits: insert, delete, move, relabel.
//!
//! # Responsibility
//! - Apply item inserts, cascading deletes and subtree moves.
//! - Validate first, mutate second, refresh last.
//!
//! # Invariants
//! - A rejected operation leaves the document untouched.
//! - Delete detaches the subtree before dropping its content records, so a
//!   repeated cleanup pass finds nothing left to remove.
//! - Every applied edit ends with a full refresh (companion sync + renumber).

use crate::content::companion::CompanionChanges;
use crate::document::Document;
use crate::error::{log_rejection, ActError, ActResult};
use crate::model::node::{ContentId, Node, NodeBody, NodeId};
use crate::tree::index;
use crate::tree::validator::DropPosition;
use log::info;

/// Base label used when an insert request carries a blank label.
pub const DEFAULT_ITEM_LABEL: &str = "Новый пункт";

/// Result of a cascading delete.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeleteReport {
    /// Ids of every node removed with the subtree, root of the subtree first.
    pub removed_nodes: Vec<NodeId>,
    /// Content records removed with the subtree.
    pub removed_content: Vec<ContentId>,
    /// Companion tables created or removed by the follow-up sync.
    pub companions: CompanionChanges,
}

impl Document {
    /// Inserts a new item as last child of `reference_id` or right after it.
    ///
    /// # Errors
    /// - Placement errors from [`StructuralValidator::can_add_child`] or
    ///   [`StructuralValidator::can_add_sibling`].
    ///
    /// [`StructuralValidator::can_add_child`]: crate::tree::validator::StructuralValidator::can_add_child
    /// [`StructuralValidator::can_add_sibling`]: crate::tree::validator::StructuralValidator::can_add_sibling
    pub fn insert(
        &mut self,
        reference_id: &NodeId,
        label: &str,
        as_child: bool,
    ) -> ActResult<NodeId> {
        let check = if as_child {
            self.validator().can_add_child(reference_id)
        } else {
            self.validator().can_add_sibling(reference_id)
        };
        check.map_err(|err| log_rejection("insert", err))?;

        let parent_id = if as_child {
            reference_id.clone()
        } else {
            self.parent_id_of(reference_id)?
        };
        let node = Node::new_item(normalize_label(label));
        let node_id = node.id.clone();

        let siblings = self.children_of_mut(&parent_id)?;
        let position = if as_child {
            siblings.len()
        } else {
            siblings
                .iter()
                .position(|child| &child.id == reference_id)
                .map(|index| index + 1)
                .ok_or_else(|| ActError::NodeNotFound(reference_id.clone()))?
        };
        siblings.insert(position, node);
        self.refresh();

        info!(
            "event=node_insert module=tree status=ok node={} parent={} as_child={}",
            node_id, parent_id, as_child
        );
        Ok(node_id)
    }

    /// Deletes `node_id` with its whole subtree and every content record in it.
    ///
    /// # Errors
    /// - `NodeNotFound` for unknown ids, `RootImmutable` for root.
    /// - `ProtectedNode` when the node or its content record is protected.
    pub fn delete(&mut self, node_id: &NodeId) -> ActResult<DeleteReport> {
        self.check_deletable(node_id)
            .map_err(|err| log_rejection("delete", err))?;

        let detached = self.detach(node_id)?;
        let mut report = DeleteReport::default();
        index::walk(&detached, &mut |node| report.removed_nodes.push(node.id.clone()));
        for (kind, content_id) in index::collect_content_ids(&detached) {
            if self.store.remove(kind, &content_id) {
                report.removed_content.push(content_id);
            }
        }
        report.companions = self.refresh();

        info!(
            "event=node_delete module=tree status=ok node={} nodes={} content={} companions_removed={}",
            node_id,
            report.removed_nodes.len(),
            report.removed_content.len(),
            report.companions.removed.len()
        );
        Ok(report)
    }

    /// Moves the subtree of `dragged_id` relative to `target_id`.
    ///
    /// # Errors
    /// - Any rejection from [`StructuralValidator::can_move`].
    ///
    /// [`StructuralValidator::can_move`]: crate::tree::validator::StructuralValidator::can_move
    pub fn move_node(
        &mut self,
        dragged_id: &NodeId,
        target_id: &NodeId,
        position: DropPosition,
    ) -> ActResult<CompanionChanges> {
        let new_parent_id = {
            let validator = self.validator();
            validator
                .can_move(dragged_id, target_id, position)
                .map_err(|err| log_rejection("move", err))?;
            validator.drop_parent(target_id, position)?.id.clone()
        };

        let backup = self.root.clone();
        if let Err(err) = self.relocate(dragged_id, target_id, &new_parent_id, position) {
            self.root = backup;
            return Err(log_rejection("move", err));
        }
        let changes = self.refresh();

        info!(
            "event=node_move module=tree status=ok node={} target={} position={:?}",
            dragged_id, target_id, position
        );
        Ok(changes)
    }

    /// Sets or clears (`""`) the custom label override of a node.
    pub fn set_custom_label(&mut self, node_id: &NodeId, custom_label: &str) -> ActResult<()> {
        let node = index::find_by_id_mut(&mut self.root, node_id).ok_or_else(|| {
            log_rejection("set_custom_label", ActError::NodeNotFound(node_id.clone()))
        })?;
        let trimmed = custom_label.trim();
        node.custom_label = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self.renumber();
        Ok(())
    }

    /// Replaces the base title of a node; the number prefix stays derived.
    pub fn set_base_label(&mut self, node_id: &NodeId, base_label: &str) -> ActResult<()> {
        let node = index::find_by_id_mut(&mut self.root, node_id).ok_or_else(|| {
            log_rejection("set_base_label", ActError::NodeNotFound(node_id.clone()))
        })?;
        node.base_label = base_label.trim().to_string();
        self.renumber();
        Ok(())
    }

    /// Replaces the free text of an item node.
    pub fn update_item_content(&mut self, node_id: &NodeId, text: &str) -> ActResult<()> {
        let node = index::find_by_id_mut(&mut self.root, node_id).ok_or_else(|| {
            log_rejection("update_item_content", ActError::NodeNotFound(node_id.clone()))
        })?;
        match &mut node.body {
            NodeBody::Item { content, .. } => {
                *content = text.to_string();
                Ok(())
            }
            _ => Err(log_rejection(
                "update_item_content",
                ActError::NotAnItem(node_id.clone()),
            )),
        }
    }

    pub(crate) fn check_deletable(&self, node_id: &NodeId) -> ActResult<()> {
        if node_id.is_root() {
            return Err(ActError::RootImmutable);
        }
        let node = self
            .node(node_id)
            .ok_or_else(|| ActError::NodeNotFound(node_id.clone()))?;
        if !node.deletable || self.validator().is_protected(node) {
            return Err(ActError::ProtectedNode(node_id.clone()));
        }
        Ok(())
    }

    /// Removes `node_id` from its parent and returns the detached subtree.
    pub(crate) fn detach(&mut self, node_id: &NodeId) -> ActResult<Node> {
        let parent_id = self.parent_id_of(node_id)?;
        let siblings = self.children_of_mut(&parent_id)?;
        let position = siblings
            .iter()
            .position(|child| &child.id == node_id)
            .ok_or_else(|| ActError::NodeNotFound(node_id.clone()))?;
        Ok(siblings.remove(position))
    }

    pub(crate) fn children_of_mut(&mut self, parent_id: &NodeId) -> ActResult<&mut Vec<Node>> {
        let parent = index::find_by_id_mut(&mut self.root, parent_id)
            .ok_or_else(|| ActError::NodeNotFound(parent_id.clone()))?;
        parent
            .children_mut()
            .ok_or_else(|| ActError::ParentMustBeItem(parent_id.clone()))
    }

    fn parent_id_of(&self, node_id: &NodeId) -> ActResult<NodeId> {
        index::find_parent(&self.root, node_id)
            .map(|parent| parent.id.clone())
            .ok_or_else(|| ActError::NodeNotFound(node_id.clone()))
    }

    fn relocate(
        &mut self,
        dragged_id: &NodeId,
        target_id: &NodeId,
        new_parent_id: &NodeId,
        position: DropPosition,
    ) -> ActResult<()> {
        let dragged = self.detach(dragged_id)?;
        let siblings = self.children_of_mut(new_parent_id)?;
        let insert_at = match position {
            DropPosition::Child => siblings.len(),
            DropPosition::Before | DropPosition::After => {
                let target_index = siblings
                    .iter()
                    .position(|child| &child.id == target_id)
                    .ok_or_else(|| ActError::NodeNotFound(target_id.clone()))?;
                if position == DropPosition::After {
                    target_index + 1
                } else {
                    target_index
                }
            }
        };
        siblings.insert(insert_at, dragged);
        Ok(())
    }
}

fn normalize_label(label: &str) -> String {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        DEFAULT_ITEM_LABEL.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_label, DEFAULT_ITEM_LABEL};

    #[test]
    fn blank_labels_fall_back_to_default() {
        assert_eq!(normalize_label("   "), DEFAULT_ITEM_LABEL);
        assert_eq!(normalize_label(" Итоги "), "Итоги");
    }
}
