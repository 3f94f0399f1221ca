//! Act document domain model.
//!
//! # Responsibility
//! - Define the tree node shape and the three content record kinds.
//!
//! # Invariants
//! - Every content record is owned by exactly one node; content never
//!   outlives its node.

pub mod node;
pub mod table;
pub mod text_block;
pub mod violation;
