//! Keyed stores for table, text block and violation records.
//!
//! # Responsibility
//! - Own content records by id and give typed access to them.
//!
//! # Invariants
//! - Iteration order is by content id, so exports are deterministic.
//! - Removal is idempotent: removing a missing id is not an error.

use crate::model::node::{ContentId, NodeKind};
use crate::model::table::Table;
use crate::model::text_block::TextBlock;
use crate::model::violation::Violation;
use std::collections::BTreeMap;

/// Content records of one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentStore {
    pub(crate) tables: BTreeMap<ContentId, Table>,
    pub(crate) text_blocks: BTreeMap<ContentId, TextBlock>,
    pub(crate) violations: BTreeMap<ContentId, Violation>,
}

impl ContentStore {
    pub fn table(&self, id: &ContentId) -> Option<&Table> {
        self.tables.get(id)
    }

    pub fn text_block(&self, id: &ContentId) -> Option<&TextBlock> {
        self.text_blocks.get(id)
    }

    pub fn violation(&self, id: &ContentId) -> Option<&Violation> {
        self.violations.get(id)
    }

    pub(crate) fn table_mut(&mut self, id: &ContentId) -> Option<&mut Table> {
        self.tables.get_mut(id)
    }

    pub(crate) fn text_block_mut(&mut self, id: &ContentId) -> Option<&mut TextBlock> {
        self.text_blocks.get_mut(id)
    }

    pub(crate) fn violation_mut(&mut self, id: &ContentId) -> Option<&mut Violation> {
        self.violations.get_mut(id)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn text_blocks(&self) -> impl Iterator<Item = &TextBlock> {
        self.text_blocks.values()
    }

    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations.values()
    }

    /// Whether a record of `kind` with `id` exists.
    pub fn contains(&self, kind: NodeKind, id: &ContentId) -> bool {
        match kind {
            NodeKind::Item => false,
            NodeKind::Table => self.tables.contains_key(id),
            NodeKind::TextBlock => self.text_blocks.contains_key(id),
            NodeKind::Violation => self.violations.contains_key(id),
        }
    }

    /// Whether the record is marked protected. Only tables carry the flag.
    pub fn is_protected(&self, kind: NodeKind, id: &ContentId) -> bool {
        kind == NodeKind::Table && self.tables.get(id).is_some_and(|table| table.protected)
    }

    /// Removes one record. Returns whether something was removed.
    pub(crate) fn remove(&mut self, kind: NodeKind, id: &ContentId) -> bool {
        match kind {
            NodeKind::Item => false,
            NodeKind::Table => self.tables.remove(id).is_some(),
            NodeKind::TextBlock => self.text_blocks.remove(id).is_some(),
            NodeKind::Violation => self.violations.remove(id).is_some(),
        }
    }

    /// Total number of records across all stores.
    pub fn len(&self) -> usize {
        self.tables.len() + self.text_blocks.len() + self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
