//! Editor configuration.
//!
//! # Responsibility
//! - Hold the placement limits the structural validator enforces.
//! - Load overrides from JSON supplied by the embedding application.
//!
//! # Invariants
//! - Every limit is at least 1 after normalization; zero falls back to default.

use crate::error::{ActError, ActResult};
use crate::model::node::NodeKind;
use serde::{Deserialize, Serialize};

/// Default maximum nesting depth of item nodes (root = 0).
pub const DEFAULT_MAX_ITEM_DEPTH: usize = 4;
/// Default per-parent limit for each content kind.
pub const DEFAULT_CONTENT_LIMIT: usize = 10;
/// Five fixed sections plus one extra top-level item.
pub const DEFAULT_MAX_TOP_LEVEL_ITEMS: usize = 6;
/// Default number of undo steps kept per session.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Placement limits for structural edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentLimits {
    pub max_item_depth: usize,
    pub max_tables_per_parent: usize,
    pub max_text_blocks_per_parent: usize,
    pub max_violations_per_parent: usize,
    pub max_top_level_items: usize,
}

impl Default for DocumentLimits {
    fn default() -> Self {
        Self {
            max_item_depth: DEFAULT_MAX_ITEM_DEPTH,
            max_tables_per_parent: DEFAULT_CONTENT_LIMIT,
            max_text_blocks_per_parent: DEFAULT_CONTENT_LIMIT,
            max_violations_per_parent: DEFAULT_CONTENT_LIMIT,
            max_top_level_items: DEFAULT_MAX_TOP_LEVEL_ITEMS,
        }
    }
}

impl DocumentLimits {
    /// Per-parent limit for one content kind. Items are bounded by depth only.
    pub fn content_limit(&self, kind: NodeKind) -> Option<usize> {
        match kind {
            NodeKind::Item => None,
            NodeKind::Table => Some(self.max_tables_per_parent),
            NodeKind::TextBlock => Some(self.max_text_blocks_per_parent),
            NodeKind::Violation => Some(self.max_violations_per_parent),
        }
    }

    fn normalized(self) -> Self {
        let defaults = Self::default();
        Self {
            max_item_depth: non_zero_or(self.max_item_depth, defaults.max_item_depth),
            max_tables_per_parent: non_zero_or(
                self.max_tables_per_parent,
                defaults.max_tables_per_parent,
            ),
            max_text_blocks_per_parent: non_zero_or(
                self.max_text_blocks_per_parent,
                defaults.max_text_blocks_per_parent,
            ),
            max_violations_per_parent: non_zero_or(
                self.max_violations_per_parent,
                defaults.max_violations_per_parent,
            ),
            max_top_level_items: non_zero_or(
                self.max_top_level_items,
                defaults.max_top_level_items,
            ),
        }
    }
}

/// Session-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub limits: DocumentLimits,
    pub history_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            limits: DocumentLimits::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl EditorConfig {
    /// Parses config JSON; missing keys take defaults, zeros are normalized.
    ///
    /// # Errors
    /// - Returns `ActError::InvalidSnapshot` when the JSON is malformed.
    pub fn from_json_str(raw: &str) -> ActResult<Self> {
        let parsed: EditorConfig = serde_json::from_str(raw)
            .map_err(|err| ActError::InvalidSnapshot(format!("editor config: {err}")))?;
        Ok(parsed.normalized())
    }

    /// Returns a copy with zero values replaced by defaults.
    pub fn normalized(self) -> Self {
        Self {
            limits: self.limits.normalized(),
            history_capacity: non_zero_or(self.history_capacity, DEFAULT_HISTORY_CAPACITY),
        }
    }
}

fn non_zero_or(value: usize, fallback: usize) -> usize {
    if value == 0 {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentLimits, EditorConfig, DEFAULT_HISTORY_CAPACITY};
    use crate::model::node::NodeKind;

    #[test]
    fn defaults_match_act_rules() {
        let limits = DocumentLimits::default();
        assert_eq!(limits.max_item_depth, 4);
        assert_eq!(limits.max_top_level_items, 6);
        assert_eq!(limits.content_limit(NodeKind::Table), Some(10));
        assert_eq!(limits.content_limit(NodeKind::Item), None);
    }

    #[test]
    fn partial_json_keeps_defaults_and_normalizes_zeros() {
        let config =
            EditorConfig::from_json_str(r#"{"limits":{"maxTablesPerParent":3,"maxItemDepth":0}}"#)
                .expect("config should parse");
        assert_eq!(config.limits.max_tables_per_parent, 3);
        assert_eq!(config.limits.max_item_depth, 4);
        assert_eq!(config.history_capacity, DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = EditorConfig::from_json_str("{not json").expect_err("must fail");
        assert!(err.to_string().contains("editor config"));
    }
}
