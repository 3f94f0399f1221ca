//! Document tree queries, numbering, placement rules and structural edits.

pub mod index;
pub mod mutator;
pub mod numbering;
pub mod validator;
