//! Placement rules for structural edits.
//!
//! # Responsibility
//! - Decide whether an insert, content add or move is allowed, before any
//!   mutation happens.
//!
//! # Invariants
//! - Checks are pure: they read the tree and never change it.
//! - Item depth never exceeds `max_item_depth`; content nodes do not count.
//! - Root holds at most `max_top_level_items` items and the extra item is
//!   always the last one.
//! - Content nodes only live under non-root items, bounded per kind.
//! - Risk tables only live inside a risk group (an item under the results
//!   section, or deeper).
//! - An item carrying risk tables in its subtree only moves within the
//!   results section.

use crate::config::DocumentLimits;
use crate::content::store::ContentStore;
use crate::document::RESULTS_SECTION_ID;
use crate::error::{ActError, ActResult};
use crate::model::node::{Node, NodeId, NodeKind};
use crate::tree::index;

/// Where a dragged node lands relative to the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Before,
    After,
    /// Appended as the last child of the target.
    Child,
}

/// Read-only validator bound to one tree snapshot.
pub struct StructuralValidator<'a> {
    root: &'a Node,
    store: &'a ContentStore,
    limits: &'a DocumentLimits,
}

impl<'a> StructuralValidator<'a> {
    pub fn new(root: &'a Node, store: &'a ContentStore, limits: &'a DocumentLimits) -> Self {
        Self {
            root,
            store,
            limits,
        }
    }

    /// Checks that a new item may be appended under `parent_id`.
    pub fn can_add_child(&self, parent_id: &NodeId) -> ActResult<()> {
        let parent = self.require(parent_id)?;
        if !parent.is_item() {
            return Err(ActError::ParentMustBeItem(parent_id.clone()));
        }
        let parent_depth = self.depth(parent_id)?;
        if parent_depth >= self.limits.max_item_depth {
            return Err(ActError::DepthExceeded {
                depth: parent_depth + 1,
                max: self.limits.max_item_depth,
            });
        }
        if parent.id.is_root() {
            self.check_top_level_capacity()?;
        }
        Ok(())
    }

    /// Checks that a new item may be inserted right after `node_id`.
    pub fn can_add_sibling(&self, node_id: &NodeId) -> ActResult<()> {
        self.require(node_id)?;
        if node_id.is_root() {
            return Err(ActError::RootImmutable);
        }
        let parent = self.parent(node_id)?;
        let parent_depth = self.depth(&parent.id)?;
        if parent_depth >= self.limits.max_item_depth {
            return Err(ActError::DepthExceeded {
                depth: parent_depth + 1,
                max: self.limits.max_item_depth,
            });
        }
        if parent.id.is_root() {
            self.check_top_level_capacity()?;
            let is_last = parent
                .children()
                .last()
                .is_some_and(|last| &last.id == node_id);
            if !is_last {
                return Err(ActError::TopLevelNotAtEnd);
            }
        }
        Ok(())
    }

    /// Checks that a content node of `kind` may be appended under `parent_id`.
    pub fn can_add_content(&self, parent_id: &NodeId, kind: NodeKind) -> ActResult<()> {
        let parent = self.require(parent_id)?;
        if !parent.is_item() {
            return Err(ActError::ParentMustBeItem(parent_id.clone()));
        }
        if parent.id.is_root() {
            return Err(ActError::TopLevelContentForbidden);
        }
        self.check_content_limit(parent, kind)
    }

    /// Checks placement of a regular or operational risk table.
    pub fn can_add_risk_table(&self, parent_id: &NodeId) -> ActResult<()> {
        self.can_add_content(parent_id, NodeKind::Table)?;
        if self.risk_group_of(parent_id).is_none() {
            return Err(ActError::RiskTablePlacement(parent_id.clone()));
        }
        Ok(())
    }

    /// Checks a drag-and-drop move of the whole subtree of `dragged_id`.
    pub fn can_move(
        &self,
        dragged_id: &NodeId,
        target_id: &NodeId,
        position: DropPosition,
    ) -> ActResult<()> {
        if dragged_id == target_id {
            return Err(ActError::SelfMove(dragged_id.clone()));
        }
        let dragged = self.require(dragged_id)?;
        self.require(target_id)?;
        if dragged_id.is_root() {
            return Err(ActError::RootImmutable);
        }
        if self.is_protected(dragged) {
            return Err(ActError::ProtectedNode(dragged_id.clone()));
        }
        if index::is_descendant(self.root, target_id, dragged_id) {
            return Err(ActError::CycleDetected {
                node: dragged_id.clone(),
                target: target_id.clone(),
            });
        }

        let new_parent = self.drop_parent(target_id, position)?;
        let current_parent = self.parent(dragged_id)?;

        if dragged.is_item() {
            let resulting_depth =
                self.depth(&new_parent.id)? + 1 + index::item_subtree_depth(dragged);
            if resulting_depth > self.limits.max_item_depth {
                return Err(ActError::DepthExceeded {
                    depth: resulting_depth,
                    max: self.limits.max_item_depth,
                });
            }
            let lands_in_results = new_parent.id.as_str() == RESULTS_SECTION_ID
                || self.risk_group_of(&new_parent.id).is_some();
            if !lands_in_results && self.holds_risk_table(dragged) {
                return Err(ActError::RiskTablePlacement(new_parent.id.clone()));
            }
        } else {
            if new_parent.id.is_root() {
                return Err(ActError::TopLevelContentForbidden);
            }
            if new_parent.id != current_parent.id {
                self.check_content_limit(new_parent, dragged.kind())?;
            }
            if self.is_risk_table(dragged) && self.risk_group_of(&new_parent.id).is_none() {
                return Err(ActError::RiskTablePlacement(new_parent.id.clone()));
            }
        }

        if new_parent.id.is_root() {
            if !current_parent.id.is_root() {
                self.check_top_level_capacity()?;
            }
            let remaining: Vec<&NodeId> = new_parent
                .children()
                .iter()
                .map(|child| &child.id)
                .filter(|id| *id != dragged_id)
                .collect();
            let insert_at = match position {
                DropPosition::Child => remaining.len(),
                DropPosition::Before | DropPosition::After => {
                    let target_index = remaining
                        .iter()
                        .position(|id| *id == target_id)
                        .ok_or_else(|| ActError::NodeNotFound(target_id.clone()))?;
                    if position == DropPosition::After {
                        target_index + 1
                    } else {
                        target_index
                    }
                }
            };
            if insert_at != remaining.len() {
                return Err(ActError::TopLevelNotAtEnd);
            }
        }
        Ok(())
    }

    /// Risk group id for `node_id`: its ancestor-or-self at depth 2 under results.
    pub fn risk_group_of(&self, node_id: &NodeId) -> Option<NodeId> {
        let mut path = index::ancestors(self.root, node_id)?;
        path.push(node_id.clone());
        let in_results = path.len() >= 3 && path[1].as_str() == RESULTS_SECTION_ID;
        if in_results {
            Some(path[2].clone())
        } else {
            None
        }
    }

    /// Parent that receives the dragged node for `position` relative to `target_id`.
    pub(crate) fn drop_parent(
        &self,
        target_id: &NodeId,
        position: DropPosition,
    ) -> ActResult<&'a Node> {
        match position {
            DropPosition::Child => {
                let target = self.require(target_id)?;
                if !target.is_item() {
                    return Err(ActError::ParentMustBeItem(target_id.clone()));
                }
                Ok(target)
            }
            DropPosition::Before | DropPosition::After => {
                if target_id.is_root() {
                    return Err(ActError::RootImmutable);
                }
                self.parent(target_id)
            }
        }
    }

    /// Whether the node or its content record is protected.
    pub fn is_protected(&self, node: &Node) -> bool {
        node.protected
            || node
                .content_id()
                .is_some_and(|content_id| self.store.is_protected(node.kind(), content_id))
    }

    fn is_risk_table(&self, node: &Node) -> bool {
        node.kind() == NodeKind::Table
            && node
                .content_id()
                .and_then(|content_id| self.store.table(content_id))
                .is_some_and(|table| table.role.is_risk())
    }

    fn holds_risk_table(&self, node: &Node) -> bool {
        index::collect_content_ids(node)
            .iter()
            .filter(|(kind, _)| *kind == NodeKind::Table)
            .filter_map(|(_, table_id)| self.store.table(table_id))
            .any(|table| table.role.is_risk())
    }

    fn check_top_level_capacity(&self) -> ActResult<()> {
        if self.root.count_children_of(NodeKind::Item) >= self.limits.max_top_level_items {
            return Err(ActError::TopLevelLimitReached);
        }
        Ok(())
    }

    fn check_content_limit(&self, parent: &Node, kind: NodeKind) -> ActResult<()> {
        let Some(limit) = self.limits.content_limit(kind) else {
            return Ok(());
        };
        let existing = match kind {
            NodeKind::Table => parent
                .children()
                .iter()
                .filter(|child| child.kind() == NodeKind::Table)
                .filter(|child| !self.is_companion_table(child))
                .count(),
            _ => parent.count_children_of(kind),
        };
        if existing >= limit {
            return Err(ActError::ContentLimitReached { kind, limit });
        }
        Ok(())
    }

    fn is_companion_table(&self, node: &Node) -> bool {
        node.content_id()
            .and_then(|content_id| self.store.table(content_id))
            .is_some_and(|table| table.role.is_companion())
    }

    fn require(&self, id: &NodeId) -> ActResult<&'a Node> {
        index::find_by_id(self.root, id).ok_or_else(|| ActError::NodeNotFound(id.clone()))
    }

    fn parent(&self, id: &NodeId) -> ActResult<&'a Node> {
        index::find_parent(self.root, id).ok_or_else(|| ActError::NodeNotFound(id.clone()))
    }

    fn depth(&self, id: &NodeId) -> ActResult<usize> {
        index::depth(self.root, id).ok_or_else(|| ActError::NodeNotFound(id.clone()))
    }
}
