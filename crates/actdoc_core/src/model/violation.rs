//! Violation record content model.
//!
//! # Invariants
//! - All optional sections are always present; `enabled` decides whether the
//!   document generator renders them.

use crate::model::node::{ContentId, NodeId};
use serde::{Deserialize, Serialize};

/// Optional free-text section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSection {
    pub enabled: bool,
    pub content: String,
}

/// Optional list section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSection {
    pub enabled: bool,
    pub items: Vec<String>,
}

/// Names of the toggleable text sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationSection {
    AdditionalContent,
    Reasons,
    Consequences,
    Responsible,
    Recommendations,
}

/// Violation record, 1:1 with its node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: ContentId,
    pub node_id: NodeId,
    /// What requirement was violated.
    pub violated: String,
    /// What the audit established.
    pub established: String,
    pub description_list: ListSection,
    pub additional_content: TextSection,
    pub reasons: TextSection,
    pub consequences: TextSection,
    pub responsible: TextSection,
    pub recommendations: TextSection,
}

impl Violation {
    pub fn new(id: ContentId, node_id: NodeId) -> Self {
        Self {
            id,
            node_id,
            violated: String::new(),
            established: String::new(),
            description_list: ListSection::default(),
            additional_content: TextSection::default(),
            reasons: TextSection::default(),
            consequences: TextSection::default(),
            responsible: TextSection::default(),
            recommendations: TextSection::default(),
        }
    }

    pub fn section(&self, section: ViolationSection) -> &TextSection {
        match section {
            ViolationSection::AdditionalContent => &self.additional_content,
            ViolationSection::Reasons => &self.reasons,
            ViolationSection::Consequences => &self.consequences,
            ViolationSection::Responsible => &self.responsible,
            ViolationSection::Recommendations => &self.recommendations,
        }
    }

    pub fn section_mut(&mut self, section: ViolationSection) -> &mut TextSection {
        match section {
            ViolationSection::AdditionalContent => &mut self.additional_content,
            ViolationSection::Reasons => &mut self.reasons,
            ViolationSection::Consequences => &mut self.consequences,
            ViolationSection::Responsible => &mut self.responsible,
            ViolationSection::Recommendations => &mut self.recommendations,
        }
    }
}
