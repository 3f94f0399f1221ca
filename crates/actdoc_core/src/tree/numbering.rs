//! Positional numbering and label derivation.
//!
//! # Responsibility
//! - Derive `number` and `label` for every node from its tree position.
//!
//! # Invariants
//! - Items get hierarchical numbers among item siblings only: `1`, `1.2`, `1.2.3`.
//! - Tables, text blocks and violations get independent per-parent counters:
//!   `Таблица 1`, `Текстовый блок 2`, `Нарушение 3`.
//! - `label` is the custom label when one is set, else `"{number} {base_label}"`.
//! - Renumbering is idempotent and is the only place numbers are computed.

use crate::model::node::{Node, NodeKind};

/// Recomputes numbers and labels for the whole tree under `root`.
pub fn renumber(root: &mut Node) {
    root.number.clear();
    root.label = compose_label(root);
    number_children(root, "");
}

fn number_children(parent: &mut Node, parent_number: &str) {
    let Some(children) = parent.children_mut() else {
        return;
    };

    let mut items = 0usize;
    let mut tables = 0usize;
    let mut text_blocks = 0usize;
    let mut violations = 0usize;

    for child in children.iter_mut() {
        let kind = child.kind();
        child.number = match kind {
            NodeKind::Item => {
                items += 1;
                if parent_number.is_empty() {
                    items.to_string()
                } else {
                    format!("{parent_number}.{items}")
                }
            }
            NodeKind::Table => {
                tables += 1;
                counter_number(kind, tables)
            }
            NodeKind::TextBlock => {
                text_blocks += 1;
                counter_number(kind, text_blocks)
            }
            NodeKind::Violation => {
                violations += 1;
                counter_number(kind, violations)
            }
        };
        child.label = compose_label(child);

        if kind == NodeKind::Item {
            let number = child.number.clone();
            number_children(child, &number);
        }
    }
}

fn counter_number(kind: NodeKind, index: usize) -> String {
    match kind.counter_prefix() {
        Some(prefix) => format!("{prefix} {index}"),
        None => index.to_string(),
    }
}

/// Builds the display label from the current number and label fields.
pub fn compose_label(node: &Node) -> String {
    if let Some(custom) = node.effective_custom_label() {
        return custom.to_string();
    }
    let base = node.base_label.trim();
    match (node.number.is_empty(), base.is_empty()) {
        (true, _) => base.to_string(),
        (false, true) => node.number.clone(),
        (false, false) => format!("{} {base}", node.number),
    }
}
