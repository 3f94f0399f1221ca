//! Act document: one editing session's tree plus content stores.
//!
//! # Responsibility
//! - Own the node tree and the content stores of one act.
//! - Build the fixed five-section skeleton for new documents.
//! - Run the post-mutation refresh (companion sync, then renumbering).
//!
//! # Invariants
//! - Root id is `root`; it always exists and is never deleted.
//! - Sections `section-1`..`section-5` are protected and non-deletable.
//! - Every public mutation either fully applies and refreshes, or returns an
//!   error before touching the tree.

use crate::config::DocumentLimits;
use crate::content::companion::CompanionChanges;
use crate::content::store::ContentStore;
use crate::model::node::{ContentId, Node, NodeId};
use crate::model::table::Table;
use crate::model::text_block::TextBlock;
use crate::model::violation::Violation;
use crate::tree::index;
use crate::tree::numbering::renumber;
use crate::tree::validator::StructuralValidator;

/// Base label of the root node.
pub const ROOT_TITLE: &str = "Акт проверки";

/// Titles of the fixed top-level sections, in order.
pub const FIXED_SECTION_TITLES: [&str; 5] = [
    "Общие сведения о проверке",
    "Объект проверки",
    "Оценка процессов и процедур",
    "Выявленные нарушения",
    "Результаты проверки",
];

/// Id of the results section hosting risk groups and the main metrics table.
pub const RESULTS_SECTION_ID: &str = "section-5";

/// Returns the stable id of fixed section `number` (1-based).
pub fn fixed_section_id(number: usize) -> NodeId {
    NodeId::from(format!("section-{number}"))
}

/// One act being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub(crate) root: Node,
    pub(crate) store: ContentStore,
    pub(crate) limits: DocumentLimits,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document with the fixed sections and default limits.
    pub fn new() -> Self {
        Self::with_limits(DocumentLimits::default())
    }

    /// Creates a document with the fixed sections and custom limits.
    pub fn with_limits(limits: DocumentLimits) -> Self {
        let mut root = Node::item_with_id(NodeId::root(), ROOT_TITLE).protect();
        if let Some(children) = root.children_mut() {
            for (index, title) in FIXED_SECTION_TITLES.iter().enumerate() {
                children.push(Node::item_with_id(fixed_section_id(index + 1), *title).protect());
            }
        }
        let mut document = Self {
            root,
            store: ContentStore::default(),
            limits,
        };
        document.refresh();
        document
    }

    pub(crate) fn from_parts(root: Node, store: ContentStore, limits: DocumentLimits) -> Self {
        Self {
            root,
            store,
            limits,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn limits(&self) -> &DocumentLimits {
        &self.limits
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Validator bound to the current tree.
    pub fn validator(&self) -> StructuralValidator<'_> {
        StructuralValidator::new(&self.root, &self.store, &self.limits)
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        index::find_by_id(&self.root, id)
    }

    pub fn parent_of(&self, id: &NodeId) -> Option<&Node> {
        index::find_parent(&self.root, id)
    }

    pub fn depth_of(&self, id: &NodeId) -> Option<usize> {
        index::depth(&self.root, id)
    }

    /// Node that owns `content_id`.
    pub fn node_for_content(&self, content_id: &ContentId) -> Option<&Node> {
        index::find_by_content(&self.root, content_id)
    }

    pub fn table(&self, id: &ContentId) -> Option<&Table> {
        self.store.table(id)
    }

    pub fn text_block(&self, id: &ContentId) -> Option<&TextBlock> {
        self.store.text_block(id)
    }

    pub fn violation(&self, id: &ContentId) -> Option<&Violation> {
        self.store.violation(id)
    }

    /// Full post-mutation rescan: companion tables first, numbering last.
    pub(crate) fn refresh(&mut self) -> CompanionChanges {
        let changes = self.sync_companion_tables();
        renumber(&mut self.root);
        changes
    }

    /// Recomputes all numbers and labels. Idempotent.
    pub fn renumber(&mut self) {
        renumber(&mut self.root);
    }
}
