//! Export snapshot: serialization and import of a whole act.
//!
//! # Responsibility
//! - Produce one deterministic, backend-ready snapshot of tree and stores.
//! - Rebuild a document from a snapshot, rejecting inconsistent input.
//!
//! # Invariants
//! - Export is read-only and never runs implicitly.
//! - Leaf nodes always serialize `children` as an empty array.
//! - Store maps are ordered by id, so equal documents export equal JSON.
//! - Import accepts a snapshot only if node ids are unique and every
//!   content record is referenced by exactly one node of the matching kind.

use crate::config::DocumentLimits;
use crate::content::store::ContentStore;
use crate::document::{fixed_section_id, Document, FIXED_SECTION_TITLES};
use crate::error::{ActError, ActResult};
use crate::model::node::{ContentId, Node, NodeBody, NodeId, NodeKind};
use crate::model::table::Table;
use crate::model::text_block::TextBlock;
use crate::model::violation::Violation;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

static NUMBER_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d+(?:\.\d+)*\.?|Таблица \d+|Текстовый блок \d+|Нарушение \d+)\s*")
        .expect("valid number prefix regex")
});

/// Whole-document snapshot consumed by the save/generate collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub tree: ExportNode,
    #[serde(default)]
    pub tables: BTreeMap<ContentId, Table>,
    #[serde(default)]
    pub text_blocks: BTreeMap<ContentId, TextBlock>,
    #[serde(default)]
    pub violations: BTreeMap<ContentId, Violation>,
}

/// Serialized tree node. Derived runtime flags (`deletable`) are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportNode {
    pub id: NodeId,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub protected: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<ContentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_block_id: Option<ContentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation_id: Option<ContentId>,
    /// Free text, items only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub children: Vec<ExportNode>,
}

impl ExportNode {
    fn from_node(node: &Node) -> Self {
        let mut exported = Self {
            id: node.id.clone(),
            label: node.label.clone(),
            kind: node.kind(),
            protected: node.protected,
            number: node.number.clone(),
            custom_label: node.effective_custom_label().map(str::to_string),
            base_label: Some(node.base_label.clone()).filter(|base| !base.is_empty()),
            table_id: None,
            text_block_id: None,
            violation_id: None,
            content: None,
            children: node.children().iter().map(Self::from_node).collect(),
        };
        match &node.body {
            NodeBody::Item { content, .. } => exported.content = Some(content.clone()),
            NodeBody::Table { table_id } => exported.table_id = Some(table_id.clone()),
            NodeBody::TextBlock { text_block_id } => {
                exported.text_block_id = Some(text_block_id.clone())
            }
            NodeBody::Violation { violation_id } => {
                exported.violation_id = Some(violation_id.clone())
            }
        }
        exported
    }
}

impl Document {
    /// Builds the export snapshot of the current state.
    pub fn export(&self) -> ExportSnapshot {
        ExportSnapshot {
            tree: ExportNode::from_node(&self.root),
            tables: self.store.tables.clone(),
            text_blocks: self.store.text_blocks.clone(),
            violations: self.store.violations.clone(),
        }
    }

    /// Rebuilds a document from a snapshot and refreshes derived state.
    ///
    /// Snapshots without `baseLabel` recover it by stripping the number
    /// prefix from `label`.
    ///
    /// # Errors
    /// - `InvalidSnapshot` for duplicate ids, dangling or orphaned content,
    ///   a missing fixed section, or a table failing span validation.
    pub fn from_snapshot(snapshot: ExportSnapshot, limits: DocumentLimits) -> ActResult<Self> {
        import(snapshot, limits).map_err(|err| {
            warn!(
                "event=snapshot_import module=export status=error reason={}",
                err
            );
            err
        })
    }
}

/// Serializes the document snapshot as compact JSON.
pub fn to_json(document: &Document) -> ActResult<String> {
    serde_json::to_string(&document.export())
        .map_err(|err| ActError::InvalidSnapshot(format!("serialize failed: {err}")))
}

/// Serializes the document snapshot as indented JSON.
pub fn to_json_pretty(document: &Document) -> ActResult<String> {
    serde_json::to_string_pretty(&document.export())
        .map_err(|err| ActError::InvalidSnapshot(format!("serialize failed: {err}")))
}

/// Parses a JSON snapshot and rebuilds the document.
pub fn from_json(json: &str, limits: DocumentLimits) -> ActResult<Document> {
    let snapshot: ExportSnapshot = serde_json::from_str(json)
        .map_err(|err| ActError::InvalidSnapshot(format!("parse failed: {err}")))?;
    Document::from_snapshot(snapshot, limits)
}

/// Recovers the title text of a legacy label such as `1.2 Итоги`.
pub fn strip_number_prefix(label: &str) -> &str {
    match NUMBER_PREFIX_RE.find(label) {
        Some(prefix) => &label[prefix.end()..],
        None => label,
    }
}

#[derive(Default)]
struct References {
    node_ids: HashSet<NodeId>,
    content: HashMap<ContentId, (NodeKind, NodeId)>,
}

fn import(snapshot: ExportSnapshot, limits: DocumentLimits) -> ActResult<Document> {
    if !snapshot.tree.id.is_root() || snapshot.tree.kind != NodeKind::Item {
        return Err(invalid("tree must start at the root item"));
    }
    let mut refs = References::default();
    let mut root = import_node(snapshot.tree, &mut refs)?;
    root.protected = true;
    root.deletable = false;

    for (number, title) in FIXED_SECTION_TITLES.iter().enumerate() {
        let section_id = fixed_section_id(number + 1);
        let section = root
            .children_mut()
            .and_then(|children| children.iter_mut().find(|child| child.id == section_id))
            .filter(|section| section.is_item())
            .ok_or_else(|| invalid(&format!("missing fixed section {section_id} ({title})")))?;
        section.protected = true;
        section.deletable = false;
    }

    let store = ContentStore {
        tables: snapshot.tables,
        text_blocks: snapshot.text_blocks,
        violations: snapshot.violations,
    };
    check_records(&store, &refs)?;

    let mut document = Document::from_parts(root, store, limits);
    let companions = document.refresh();
    info!(
        "event=snapshot_import module=export status=ok nodes={} records={} companions_created={} companions_removed={}",
        refs.node_ids.len(),
        document.store.len(),
        companions.created.len(),
        companions.removed.len()
    );
    Ok(document)
}

fn import_node(exported: ExportNode, refs: &mut References) -> ActResult<Node> {
    if !refs.node_ids.insert(exported.id.clone()) {
        return Err(invalid(&format!("duplicate node id {}", exported.id)));
    }
    let custom_label = exported
        .custom_label
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty());
    let base_label = match exported.base_label {
        Some(base) => base,
        None if custom_label.is_some() => String::new(),
        None => strip_number_prefix(&exported.label).trim().to_string(),
    };

    let content_ids = [
        (NodeKind::Table, exported.table_id),
        (NodeKind::TextBlock, exported.text_block_id),
        (NodeKind::Violation, exported.violation_id),
    ];
    let mut content_id = None;
    for (kind, id) in content_ids {
        let Some(id) = id else { continue };
        if kind != exported.kind {
            return Err(invalid(&format!(
                "node {} of type {:?} carries a {:?} reference",
                exported.id, exported.kind, kind
            )));
        }
        if refs
            .content
            .insert(id.clone(), (kind, exported.id.clone()))
            .is_some()
        {
            return Err(invalid(&format!("content {id} is referenced twice")));
        }
        content_id = Some(id);
    }

    let body = match (exported.kind, content_id) {
        (NodeKind::Item, _) => NodeBody::Item {
            content: exported.content.unwrap_or_default(),
            children: exported
                .children
                .into_iter()
                .map(|child| import_node(child, refs))
                .collect::<ActResult<Vec<_>>>()?,
        },
        (kind, Some(_)) if !exported.children.is_empty() => {
            return Err(invalid(&format!(
                "{:?} node {} cannot have children",
                kind, exported.id
            )))
        }
        (NodeKind::Table, Some(table_id)) => NodeBody::Table { table_id },
        (NodeKind::TextBlock, Some(text_block_id)) => NodeBody::TextBlock { text_block_id },
        (NodeKind::Violation, Some(violation_id)) => NodeBody::Violation { violation_id },
        (kind, None) => {
            return Err(invalid(&format!(
                "{:?} node {} has no content reference",
                kind, exported.id
            )))
        }
    };

    let mut node = Node::with_body(exported.id, base_label, body);
    node.custom_label = custom_label;
    node.protected = exported.protected;
    node.deletable = !exported.protected;
    Ok(node)
}

fn check_records(store: &ContentStore, refs: &References) -> ActResult<()> {
    let records = store
        .tables
        .iter()
        .map(|(key, table)| (NodeKind::Table, key, &table.id, &table.node_id))
        .chain(
            store
                .text_blocks
                .iter()
                .map(|(key, block)| (NodeKind::TextBlock, key, &block.id, &block.node_id)),
        )
        .chain(
            store
                .violations
                .iter()
                .map(|(key, violation)| {
                    (NodeKind::Violation, key, &violation.id, &violation.node_id)
                }),
        );
    for (kind, key, id, node_id) in records {
        if key != id {
            return Err(invalid(&format!("record key {key} does not match id {id}")));
        }
        match refs.content.get(id) {
            Some((ref_kind, ref_node)) if *ref_kind == kind && ref_node == node_id => {}
            Some(_) => {
                return Err(invalid(&format!(
                    "{} record {id} does not match its referencing node",
                    kind.plural_name()
                )))
            }
            None => return Err(invalid(&format!("orphaned record {id}"))),
        }
    }
    if let Some((id, (kind, node_id))) = refs
        .content
        .iter()
        .find(|(id, (kind, _))| !store.contains(*kind, id))
    {
        return Err(invalid(&format!(
            "node {node_id} references missing {} record {id}",
            kind.plural_name()
        )));
    }
    for table in store.tables.values() {
        table
            .validate()
            .map_err(|reason| invalid(&format!("table {}: {reason}", table.id)))?;
    }
    Ok(())
}

fn invalid(message: &str) -> ActError {
    ActError::InvalidSnapshot(message.to_string())
}
