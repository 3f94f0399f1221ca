//! Content records and their lifecycle.
//!
//! # Responsibility
//! - Store tables, text blocks and violations by id.
//! - Build content together with its owning node.
//! - Maintain the auto-managed metrics tables.

pub mod companion;
pub mod factory;
pub mod presets;
pub mod store;
