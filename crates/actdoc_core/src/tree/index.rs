//! Read-only tree queries.
//!
//! # Responsibility
//! - Locate nodes, parents and ancestors by recursive depth-first search.
//! - Answer depth and descendant questions for validation.
//!
//! # Invariants
//! - No caching: every query walks the current tree, so results are always
//!   consistent with the last mutation.
//! - Root depth is 0; fixed sections sit at depth 1.

use crate::model::node::{ContentId, Node, NodeId, NodeKind};

/// Finds node by id.
pub fn find_by_id<'a>(root: &'a Node, id: &NodeId) -> Option<&'a Node> {
    if &root.id == id {
        return Some(root);
    }
    root.children()
        .iter()
        .find_map(|child| find_by_id(child, id))
}

/// Mutable variant of [`find_by_id`].
pub fn find_by_id_mut<'a>(root: &'a mut Node, id: &NodeId) -> Option<&'a mut Node> {
    if &root.id == id {
        return Some(root);
    }
    root.children_mut()?
        .iter_mut()
        .find_map(|child| find_by_id_mut(child, id))
}

/// Finds the parent of `id`. Returns `None` for root and unknown ids.
pub fn find_parent<'a>(root: &'a Node, id: &NodeId) -> Option<&'a Node> {
    if root.children().iter().any(|child| &child.id == id) {
        return Some(root);
    }
    root.children()
        .iter()
        .find_map(|child| find_parent(child, id))
}

/// Finds the node that references `content_id`.
pub fn find_by_content<'a>(root: &'a Node, content_id: &ContentId) -> Option<&'a Node> {
    if root.content_id() == Some(content_id) {
        return Some(root);
    }
    root.children()
        .iter()
        .find_map(|child| find_by_content(child, content_id))
}

/// Distance from root. Root is 0.
pub fn depth(root: &Node, id: &NodeId) -> Option<usize> {
    ancestors(root, id).map(|path| path.len())
}

/// Ancestor ids of `id`, ordered from root down to the direct parent.
pub fn ancestors(root: &Node, id: &NodeId) -> Option<Vec<NodeId>> {
    let mut path = Vec::new();
    if collect_path(root, id, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn collect_path(node: &Node, id: &NodeId, path: &mut Vec<NodeId>) -> bool {
    if &node.id == id {
        return true;
    }
    path.push(node.id.clone());
    for child in node.children() {
        if collect_path(child, id, path) {
            return true;
        }
    }
    path.pop();
    false
}

/// Whether `candidate` lies strictly inside the subtree of `of_node`.
pub fn is_descendant(root: &Node, candidate: &NodeId, of_node: &NodeId) -> bool {
    match find_by_id(root, of_node) {
        Some(ancestor) => ancestor
            .children()
            .iter()
            .any(|child| find_by_id(child, candidate).is_some()),
        None => false,
    }
}

/// Number of item levels below `node`; content nodes do not count.
pub fn item_subtree_depth(node: &Node) -> usize {
    node.children()
        .iter()
        .filter(|child| child.is_item())
        .map(|child| 1 + item_subtree_depth(child))
        .max()
        .unwrap_or(0)
}

/// Content ids referenced by `node` and all of its descendants, in pre-order.
pub fn collect_content_ids(node: &Node) -> Vec<(NodeKind, ContentId)> {
    let mut out = Vec::new();
    walk(node, &mut |current| {
        if let Some(content_id) = current.content_id() {
            out.push((current.kind(), content_id.clone()));
        }
    });
    out
}

/// Visits `node` and every descendant in pre-order.
pub fn walk<'a>(node: &'a Node, visit: &mut impl FnMut(&'a Node)) {
    visit(node);
    for child in node.children() {
        walk(child, visit);
    }
}
