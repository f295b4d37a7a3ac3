//! Core types for concept lattices: concepts, covering edges and stats.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier of a concept within one lattice.
pub type ConceptId = i64;

/// Edge kind used by the lattice service for the covering relation.
pub const COVERS: &str = "covers";

fn default_edge_kind() -> String {
    COVERS.to_string()
}

/// Position of a concept in the lattice order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConceptRole {
    Top,
    Bottom,
    Regular,
}

/// One formal concept: a maximal (extent, intent) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptNode {
    pub id: ConceptId,
    #[serde(default)]
    pub extent: Vec<String>,
    #[serde(default)]
    pub intent: Vec<String>,
    #[serde(default)]
    pub extent_size: usize,
    #[serde(default)]
    pub intent_size: usize,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub is_top: bool,
    #[serde(default)]
    pub is_bottom: bool,
}

impl ConceptNode {
    /// Build a concept with cached sizes and an `(|extent|,|intent|)` label.
    pub fn new(id: ConceptId, extent: Vec<String>, intent: Vec<String>) -> Self {
        let label = format!("({},{})", extent.len(), intent.len());
        ConceptNode {
            id,
            extent_size: extent.len(),
            intent_size: intent.len(),
            extent,
            intent,
            label,
            is_top: false,
            is_bottom: false,
        }
    }

    /// Top wins when both flags are set (single-concept lattices).
    pub fn role(&self) -> ConceptRole {
        if self.is_top {
            ConceptRole::Top
        } else if self.is_bottom {
            ConceptRole::Bottom
        } else {
            ConceptRole::Regular
        }
    }

    /// Whether the cached cardinalities agree with the actual sets.
    pub fn sizes_consistent(&self) -> bool {
        self.extent_size == self.extent.len() && self.intent_size == self.intent.len()
    }
}

/// A covering edge: `source` is the more general concept, `target` the
/// strictly more specific one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConceptEdge {
    pub source: ConceptId,
    pub target: ConceptId,
    #[serde(rename = "type", default = "default_edge_kind")]
    pub kind: String,
}

impl ConceptEdge {
    pub fn covers(source: ConceptId, target: ConceptId) -> Self {
        ConceptEdge {
            source,
            target,
            kind: default_edge_kind(),
        }
    }
}

/// Aggregate counts cached alongside the lattice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeStats {
    pub total_concepts: usize,
    pub total_objects: usize,
    pub total_attributes: usize,
    pub top_concept: Option<ConceptId>,
    pub bottom_concept: Option<ConceptId>,
}

/// A concept lattice as produced by the lattice service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptLattice {
    #[serde(default)]
    pub nodes: Vec<ConceptNode>,
    #[serde(default)]
    pub edges: Vec<ConceptEdge>,
    #[serde(default)]
    pub stats: LatticeStats,
}

impl ConceptLattice {
    /// Build a lattice and derive its stats block from the nodes.
    pub fn new(nodes: Vec<ConceptNode>, edges: Vec<ConceptEdge>) -> Self {
        let mut lattice = ConceptLattice {
            nodes,
            edges,
            stats: LatticeStats::default(),
        };
        lattice.stats = lattice.derive_stats();
        lattice
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a concept by id. First occurrence wins if ids repeat.
    pub fn find(&self, id: ConceptId) -> Option<&ConceptNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: ConceptId) -> bool {
        self.find(id).is_some()
    }

    pub fn top(&self) -> Option<&ConceptNode> {
        self.nodes.iter().find(|n| n.is_top)
    }

    pub fn bottom(&self) -> Option<&ConceptNode> {
        self.nodes.iter().find(|n| n.is_bottom)
    }

    /// Recompute the stats block from `nodes`.
    pub fn derive_stats(&self) -> LatticeStats {
        let objects: BTreeSet<&str> = self
            .nodes
            .iter()
            .flat_map(|n| n.extent.iter().map(String::as_str))
            .collect();
        let attributes: BTreeSet<&str> = self
            .nodes
            .iter()
            .flat_map(|n| n.intent.iter().map(String::as_str))
            .collect();

        LatticeStats {
            total_concepts: self.nodes.len(),
            total_objects: objects.len(),
            total_attributes: attributes.len(),
            top_concept: self.top().map(|n| n.id),
            bottom_concept: self.bottom().map(|n| n.id),
        }
    }
}

/// Response envelope returned by the lattice service endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatticeResponse {
    pub lattice: ConceptLattice,
    #[serde(default)]
    pub processing_time: f64,
    #[serde(default)]
    pub transaction_count: usize,
    #[serde(default)]
    pub message: String,
    /// Whether the document was read as an envelope rather than a bare lattice.
    #[serde(skip)]
    pub envelope: bool,
}
