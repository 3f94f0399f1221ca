//! Companion table lifecycle.
//!
//! # Responsibility
//! - Keep per-group metrics tables and the main metrics table in step with
//!   the risk tables present in the tree.
//!
//! # Invariants
//! - A risk group (item child of the results section) hosts exactly one
//!   metrics table iff its subtree holds at least one risk table.
//! - The results section hosts exactly one main metrics table iff the whole
//!   tree holds at least one risk table.
//! - Every decision comes from a full rescan; no counters are kept, so the
//!   sync is idempotent and safe after undo, redo or snapshot import.

use crate::content::presets;
use crate::document::{Document, RESULTS_SECTION_ID};
use crate::model::node::{ContentId, Node, NodeId, NodeKind};
use crate::model::table::TableRole;
use crate::tree::index;
use log::info;
use std::collections::HashSet;

/// Companion tables created or removed by one sync pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompanionChanges {
    pub created: Vec<ContentId>,
    pub removed: Vec<ContentId>,
}

impl CompanionChanges {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.removed.is_empty()
    }
}

struct CompanionRef {
    node_id: NodeId,
    parent_id: NodeId,
    table_id: ContentId,
    role: TableRole,
}

impl Document {
    /// Rescans the tree and creates or removes companion tables as needed.
    pub(crate) fn sync_companion_tables(&mut self) -> CompanionChanges {
        let mut changes = CompanionChanges::default();
        let results_id = NodeId::from(RESULTS_SECTION_ID);
        let Some(results) = self.node(&results_id) else {
            return changes;
        };

        let risk_groups: Vec<NodeId> = results
            .children()
            .iter()
            .filter(|group| group.is_item() && self.holds_risk_table(group))
            .map(|group| group.id.clone())
            .collect();
        let any_risk = self.holds_risk_table(&self.root);

        let mut companions = Vec::new();
        self.collect_companions(&self.root, &mut companions);

        let mut kept_hosts: HashSet<NodeId> = HashSet::new();
        let mut stale = Vec::new();
        for companion in companions {
            let wanted = match companion.role {
                TableRole::Metrics => risk_groups.contains(&companion.parent_id),
                TableRole::MainMetrics => any_risk && companion.parent_id == results_id,
                _ => false,
            };
            if wanted && kept_hosts.insert(companion.parent_id.clone()) {
                continue;
            }
            stale.push(companion);
        }

        for companion in stale {
            if self.detach(&companion.node_id).is_ok() {
                self.store.remove(NodeKind::Table, &companion.table_id);
                changes.removed.push(companion.table_id);
            }
        }

        for group_id in risk_groups {
            if !kept_hosts.contains(&group_id) {
                if let Some(table_id) = self.attach_companion(&group_id, TableRole::Metrics) {
                    changes.created.push(table_id);
                }
            }
        }
        if any_risk && !kept_hosts.contains(&results_id) {
            if let Some(table_id) = self.attach_companion(&results_id, TableRole::MainMetrics) {
                changes.created.push(table_id);
            }
        }

        if !changes.is_empty() {
            info!(
                "event=companion_sync module=content status=ok created={} removed={}",
                changes.created.len(),
                changes.removed.len()
            );
        }
        changes
    }

    fn holds_risk_table(&self, node: &Node) -> bool {
        index::collect_content_ids(node)
            .iter()
            .filter(|(kind, _)| *kind == NodeKind::Table)
            .filter_map(|(_, table_id)| self.store.table(table_id))
            .any(|table| table.role.is_risk())
    }

    fn collect_companions(&self, node: &Node, out: &mut Vec<CompanionRef>) {
        for child in node.children() {
            let role = child
                .content_id()
                .filter(|_| child.kind() == NodeKind::Table)
                .and_then(|table_id| self.store.table(table_id))
                .map(|table| table.role);
            match (role, child.content_id()) {
                (Some(role), Some(table_id)) if role.is_companion() => out.push(CompanionRef {
                    node_id: child.id.clone(),
                    parent_id: node.id.clone(),
                    table_id: table_id.clone(),
                    role,
                }),
                _ => self.collect_companions(child, out),
            }
        }
    }

    /// Inserts a protected companion table as first child of `host_id`.
    fn attach_companion(&mut self, host_id: &NodeId, role: TableRole) -> Option<ContentId> {
        let table_id = ContentId::generate(NodeKind::Table);
        let node = Node::new_content(NodeKind::Table, table_id.clone(), presets::base_label(role))
            .protect();
        let table = presets::build_table(role, table_id.clone(), node.id.clone());
        let siblings = self.children_of_mut(host_id).ok()?;
        siblings.insert(0, node);
        self.store.tables.insert(table_id.clone(), table);
        Some(table_id)
    }
}

#[cfg(test)]
mod tests {
    use crate::document::{fixed_section_id, Document};
    use crate::model::table::TableRole;

    fn companion_count(document: &Document, role: TableRole) -> usize {
        document
            .store()
            .tables()
            .filter(|table| table.role == role)
            .count()
    }

    #[test]
    fn fresh_document_has_no_companions() {
        let mut document = Document::new();
        assert!(document.sync_companion_tables().is_empty());
        assert_eq!(document.store().len(), 0);
    }

    #[test]
    fn sync_is_idempotent_once_risk_table_exists() {
        let mut document = Document::new();
        let group = document
            .insert(&fixed_section_id(5), "Риски", true)
            .expect("group");
        document
            .add_regular_risk_table(&group)
            .expect("risk table");
        assert_eq!(companion_count(&document, TableRole::Metrics), 1);
        assert_eq!(companion_count(&document, TableRole::MainMetrics), 1);

        assert!(document.sync_companion_tables().is_empty());
        assert_eq!(document.store().len(), 3);
    }

    #[test]
    fn duplicated_companion_is_collapsed() {
        let mut document = Document::new();
        let group = document
            .insert(&fixed_section_id(5), "Риски", true)
            .expect("group");
        document
            .add_operational_risk_table(&group)
            .expect("risk table");

        let first = document
            .node(&group)
            .and_then(|node| node.children().first())
            .cloned()
            .expect("metrics node");
        let table_id = first.content_id().cloned().expect("table id");
        let mut copy = first.clone();
        copy.id = crate::model::node::NodeId::from("copy-node");
        let mut copy_table = document.table(&table_id).cloned().expect("table");
        let copy_id = crate::model::node::ContentId::from("copy-table");
        copy.body = crate::model::node::NodeBody::Table {
            table_id: copy_id.clone(),
        };
        copy_table.id = copy_id.clone();
        document.store.tables.insert(copy_id.clone(), copy_table);
        if let Ok(children) = document.children_of_mut(&group) {
            children.push(copy);
        }

        let changes = document.sync_companion_tables();
        assert_eq!(changes.removed, vec![copy_id]);
        assert!(changes.created.is_empty());
        assert_eq!(companion_count(&document, TableRole::Metrics), 1);
    }
}
