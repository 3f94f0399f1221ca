//! Core engine of the audit act editor.
//! Owns the document tree, its content records and the table grid model,
//! and is the single source of truth for their invariants.

pub mod api;
pub mod config;
pub mod content;
pub mod document;
pub mod error;
pub mod export;
pub mod grid;
pub mod history;
pub mod logging;
pub mod model;
pub mod tree;

pub use api::{ActSession, ActionResponse, ContentRequest};
pub use config::{DocumentLimits, EditorConfig};
pub use content::companion::CompanionChanges;
pub use content::factory::ContentAdded;
pub use document::{fixed_section_id, Document, RESULTS_SECTION_ID};
pub use error::{ActError, ActResult, ErrorCategory};
pub use export::{ExportNode, ExportSnapshot};
pub use history::History;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::node::{ContentId, Node, NodeBody, NodeId, NodeKind};
pub use model::table::{Cell, CellRef, Table, TableRole};
pub use model::text_block::{Alignment, TextBlock, TextFormatting};
pub use model::violation::{ListSection, TextSection, Violation, ViolationSection};
pub use tree::mutator::DeleteReport;
pub use tree::validator::{DropPosition, StructuralValidator};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
