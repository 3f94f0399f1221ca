//! Domain error model for act document operations.
//!
//! # Responsibility
//! - Give every rejected operation one typed, human-readable reason.
//! - Classify rejections so callers can decide how loudly to surface them.
//!
//! # Invariants
//! - Returning an error means the document was not mutated.
//! - `Display` output is the user-facing `reason` string of the API envelope.

use crate::model::node::{ContentId, NodeId, NodeKind};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by document operations.
pub type ActResult<T> = Result<T, ActError>;

/// Coarse rejection category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Depth, per-kind limit, wrong parent kind, top-level rule.
    Placement,
    /// Stale id or coordinate supplied by the caller.
    NotFound,
    /// Attempt to delete or move a protected node.
    Protection,
    /// Merge/unmerge selection or grid shape problems.
    Integrity,
    /// Snapshot import or serialization failures.
    Snapshot,
}

/// Errors from tree, content and grid operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ActError {
    /// Node id does not exist in the tree.
    NodeNotFound(NodeId),
    /// Content id does not exist in its store.
    ContentNotFound(ContentId),
    /// Cell coordinate is outside the table grid.
    CellOutOfRange {
        table_id: ContentId,
        row: usize,
        col: usize,
    },
    /// Insert or move would nest items deeper than allowed.
    DepthExceeded { depth: usize, max: usize },
    /// Parent already holds the maximum number of nodes of `kind`.
    ContentLimitReached { kind: NodeKind, limit: usize },
    /// Children may only be attached to item nodes.
    ParentMustBeItem(NodeId),
    /// Operation only applies to item nodes.
    NotAnItem(NodeId),
    /// A second extra top-level item was requested.
    TopLevelLimitReached,
    /// Extra top-level item must be appended after every other section.
    TopLevelNotAtEnd,
    /// Tables, text blocks and violations cannot sit directly under root.
    TopLevelContentForbidden,
    /// Risk tables must live inside a subsection of the results section.
    RiskTablePlacement(NodeId),
    /// Node (or its content) is protected against delete/move.
    ProtectedNode(NodeId),
    /// Root node cannot be deleted, moved or used as a sibling anchor.
    RootImmutable,
    /// Node cannot be moved onto itself.
    SelfMove(NodeId),
    /// Move would place a node inside its own subtree.
    CycleDetected { node: NodeId, target: NodeId },
    /// Table shape arguments are unusable.
    InvalidTableShape(String),
    /// Merge selection is not a single rectangular region of whole cells.
    InvalidSelection(String),
    /// Unmerge requested on a cell that owns no span.
    NotSpanOwner {
        table_id: ContentId,
        row: usize,
        col: usize,
    },
    /// Snapshot could not be imported or serialized.
    InvalidSnapshot(String),
}

impl ActError {
    /// Returns the rejection category for logging and UI decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NodeNotFound(_) | Self::ContentNotFound(_) | Self::CellOutOfRange { .. } => {
                ErrorCategory::NotFound
            }
            Self::DepthExceeded { .. }
            | Self::ContentLimitReached { .. }
            | Self::ParentMustBeItem(_)
            | Self::TopLevelLimitReached
            | Self::TopLevelNotAtEnd
            | Self::TopLevelContentForbidden
            | Self::RiskTablePlacement(_)
            | Self::SelfMove(_)
            | Self::CycleDetected { .. } => ErrorCategory::Placement,
            Self::ProtectedNode(_) | Self::RootImmutable => ErrorCategory::Protection,
            Self::NotAnItem(_)
            | Self::InvalidTableShape(_)
            | Self::InvalidSelection(_)
            | Self::NotSpanOwner { .. } => ErrorCategory::Integrity,
            Self::InvalidSnapshot(_) => ErrorCategory::Snapshot,
        }
    }

    /// Whether this error points at a caller bug (stale id) rather than a user action.
    pub fn is_unexpected(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }
}

impl Display for ActError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::ContentNotFound(id) => write!(f, "content not found: {id}"),
            Self::CellOutOfRange { table_id, row, col } => {
                write!(f, "cell ({row}, {col}) is outside table {table_id}")
            }
            Self::DepthExceeded { depth, max } => write!(
                f,
                "maximum nesting depth exceeded: resulting depth {depth}, allowed {max}"
            ),
            Self::ContentLimitReached { kind, limit } => write!(
                f,
                "limit of {limit} {} per item reached",
                kind.plural_name()
            ),
            Self::ParentMustBeItem(id) => {
                write!(f, "content cannot be nested inside non-item node: {id}")
            }
            Self::NotAnItem(id) => write!(f, "node is not an item: {id}"),
            Self::TopLevelLimitReached => write!(f, "only one additional top-level item allowed"),
            Self::TopLevelNotAtEnd => write!(
                f,
                "additional top-level item can only be placed after the last section"
            ),
            Self::TopLevelContentForbidden => {
                write!(f, "content cannot be placed at the top level")
            }
            Self::RiskTablePlacement(id) => write!(
                f,
                "risk tables must be placed inside a subsection of the results section: {id}"
            ),
            Self::ProtectedNode(id) => write!(f, "node is protected: {id}"),
            Self::RootImmutable => write!(f, "root node cannot be modified structurally"),
            Self::SelfMove(id) => write!(f, "node cannot be moved onto itself: {id}"),
            Self::CycleDetected { node, target } => write!(
                f,
                "move would create cycle: node {node} into its descendant {target}"
            ),
            Self::InvalidTableShape(message) => write!(f, "invalid table shape: {message}"),
            Self::InvalidSelection(message) => write!(f, "invalid merge selection: {message}"),
            Self::NotSpanOwner { table_id, row, col } => write!(
                f,
                "cell ({row}, {col}) in table {table_id} is not a merged region owner"
            ),
            Self::InvalidSnapshot(message) => write!(f, "invalid snapshot: {message}"),
        }
    }
}

impl Error for ActError {}

/// Logs a rejected operation and hands the error back.
///
/// Stale ids are caller bugs and log at `warn`; expected user-facing
/// rejections log at `debug`.
pub(crate) fn log_rejection(operation: &'static str, err: ActError) -> ActError {
    if err.is_unexpected() {
        warn!(
            "event=operation_rejected module=core status=unexpected op={} reason={}",
            operation, err
        );
    } else {
        debug!(
            "event=operation_rejected module=core status=rejected op={} category={:?} reason={}",
            operation,
            err.category(),
            err
        );
    }
    err
}
