//! Read-only lookups over a loaded lattice.

use crate::types::{ConceptId, ConceptLattice, ConceptNode, ConceptRole, LatticeStats};
use serde::Serialize;
use std::fmt;

/// Number of items shown in a preview before truncating.
pub const PREVIEW_LIMIT: usize = 5;

/// The first few items of a list, for compact display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub items: Vec<String>,
    pub total: usize,
    pub truncated: bool,
}

impl Preview {
    pub fn of(items: &[String], limit: usize) -> Self {
        Preview {
            items: items.iter().take(limit).cloned().collect(),
            total: items.len(),
            truncated: items.len() > limit,
        }
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.items.join(", "))?;
        if self.truncated {
            write!(f, "...")?;
        }
        Ok(())
    }
}

/// Everything shown for a selected concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConceptDetails {
    pub id: ConceptId,
    pub label: String,
    pub role: ConceptRole,
    pub extent: Vec<String>,
    pub intent: Vec<String>,
    pub extent_size: usize,
    pub intent_size: usize,
    pub extent_preview: Preview,
    pub intent_preview: Preview,
}

/// One row of the concept list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConceptSummary {
    pub id: ConceptId,
    pub label: String,
    pub role: ConceptRole,
    pub extent_size: usize,
    pub intent_size: usize,
    pub objects: Preview,
    pub attributes: Preview,
}

impl From<&ConceptNode> for ConceptSummary {
    fn from(node: &ConceptNode) -> Self {
        ConceptSummary {
            id: node.id,
            label: node.label.clone(),
            role: node.role(),
            extent_size: node.extent_size,
            intent_size: node.intent_size,
            objects: Preview::of(&node.extent, PREVIEW_LIMIT),
            attributes: Preview::of(&node.intent, PREVIEW_LIMIT),
        }
    }
}

impl From<&ConceptNode> for ConceptDetails {
    fn from(node: &ConceptNode) -> Self {
        ConceptDetails {
            id: node.id,
            label: node.label.clone(),
            role: node.role(),
            extent: node.extent.clone(),
            intent: node.intent.clone(),
            extent_size: node.extent_size,
            intent_size: node.intent_size,
            extent_preview: Preview::of(&node.extent, PREVIEW_LIMIT),
            intent_preview: Preview::of(&node.intent, PREVIEW_LIMIT),
        }
    }
}

pub fn find_concept(lattice: &ConceptLattice, id: ConceptId) -> Option<&ConceptNode> {
    lattice.find(id)
}

/// Details for one concept, or `None` if the id is unknown.
pub fn concept_details(lattice: &ConceptLattice, id: ConceptId) -> Option<ConceptDetails> {
    lattice.find(id).map(ConceptDetails::from)
}

pub fn concept_summaries(lattice: &ConceptLattice) -> Vec<ConceptSummary> {
    lattice.nodes.iter().map(ConceptSummary::from).collect()
}

/// The cached stats block, as delivered.
pub fn lattice_stats(lattice: &ConceptLattice) -> &LatticeStats {
    &lattice.stats
}

/// Explanation shown for the top and bottom concepts.
pub fn role_description(role: ConceptRole) -> Option<&'static str> {
    match role {
        ConceptRole::Top => Some(
            "This is the TOP concept - the most general concept, covering every object with the smallest shared intent.",
        ),
        ConceptRole::Bottom => Some(
            "This is the BOTTOM concept - the most specific concept, holding the largest intent and the most restrictive extent.",
        ),
        ConceptRole::Regular => None,
    }
}
