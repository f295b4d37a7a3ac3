//! Level assignment for concept lattices.
//!
//! Every concept gets the length of the longest directed path from the root
//! (the top concept) to it, so each concept sits below all of its ancestors.

use crate::types::{ConceptEdge, ConceptId, ConceptNode};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// Adjacency lists keyed by concept id, in edge input order.
pub type Adjacency = HashMap<ConceptId, Vec<ConceptId>>;

/// Id-indexed view of the covering relation.
#[derive(Debug, Clone, Default)]
pub struct LatticeGraph {
    pub children: Adjacency,
    pub parents: Adjacency,
    /// Edges with at least one endpoint missing from the node list.
    pub dangling: Vec<ConceptEdge>,
}

impl LatticeGraph {
    pub fn children_of(&self, id: ConceptId) -> &[ConceptId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn parents_of(&self, id: ConceptId) -> &[ConceptId] {
        self.parents.get(&id).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Result of level assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LevelAssignment {
    pub root: Option<ConceptId>,
    pub levels: BTreeMap<ConceptId, usize>,
    /// Concepts not reachable from the root, in input order. Placed at level 0.
    pub orphans: Vec<ConceptId>,
    /// Reachable concepts that sit on or below a cycle, in input order.
    pub cyclic: Vec<ConceptId>,
    pub dangling_edges: Vec<ConceptEdge>,
}

impl LevelAssignment {
    pub fn level(&self, id: ConceptId) -> Option<usize> {
        self.levels.get(&id).copied()
    }

    pub fn max_level(&self) -> usize {
        self.levels.values().copied().max().unwrap_or(0)
    }

    pub fn has_cycle(&self) -> bool {
        !self.cyclic.is_empty()
    }
}

/// Build parent/child adjacency from the edges, skipping dangling ones.
pub fn build_adjacency(nodes: &[ConceptNode], edges: &[ConceptEdge]) -> LatticeGraph {
    let mut graph = LatticeGraph::default();
    for node in nodes {
        graph.children.entry(node.id).or_default();
        graph.parents.entry(node.id).or_default();
    }

    for edge in edges {
        if !graph.children.contains_key(&edge.source) || !graph.parents.contains_key(&edge.target) {
            debug!(?edge, "skipping edge with unknown endpoint");
            graph.dangling.push(edge.clone());
            continue;
        }
        graph
            .children
            .entry(edge.source)
            .or_default()
            .push(edge.target);
        graph
            .parents
            .entry(edge.target)
            .or_default()
            .push(edge.source);
    }

    graph
}

/// Pick the root: the first top-flagged concept, else the first concept
/// without parents, else the first concept.
pub fn select_root(nodes: &[ConceptNode], graph: &LatticeGraph) -> Option<ConceptId> {
    if let Some(top) = nodes.iter().find(|n| n.is_top) {
        return Some(top.id);
    }

    let root = nodes
        .iter()
        .find(|n| graph.parents_of(n.id).is_empty())
        .or_else(|| nodes.first())
        .map(|n| n.id);
    debug!(?root, "no top-flagged concept, falling back");
    root
}

/// Collect every concept reachable from `root` along child edges.
pub fn reachable_from(root: ConceptId, graph: &LatticeGraph) -> HashSet<ConceptId> {
    let mut visited = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);

    while let Some(id) = queue.pop_front() {
        for &child in graph.children_of(id) {
            if visited.insert(child) {
                queue.push_back(child);
            }
        }
    }

    visited
}

/// Assign a longest-path level to every concept.
///
/// Runs Kahn's algorithm over the subgraph reachable from the root, relaxing
/// each child to `max(level(parent) + 1)` as its parents are released. Never
/// fails: orphans land on level 0, dangling edges are ignored, and concepts
/// trapped by a cycle keep the best level their released parents gave them.
pub fn assign_levels(nodes: &[ConceptNode], edges: &[ConceptEdge]) -> LevelAssignment {
    let graph = build_adjacency(nodes, edges);
    let Some(root) = select_root(nodes, &graph) else {
        return LevelAssignment {
            dangling_edges: graph.dangling,
            ..LevelAssignment::default()
        };
    };

    let reachable = reachable_from(root, &graph);
    let mut in_degree: HashMap<ConceptId, usize> = reachable
        .iter()
        .map(|&id| {
            let degree = graph
                .parents_of(id)
                .iter()
                .filter(|p| reachable.contains(p))
                .count();
            (id, degree)
        })
        .collect();
    in_degree.insert(root, 0);

    let mut levels: BTreeMap<ConceptId, usize> = BTreeMap::from([(root, 0)]);
    let mut released = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);

    while let Some(id) = queue.pop_front() {
        let level = levels.get(&id).copied().unwrap_or(0);
        for &child in graph.children_of(id) {
            if released.contains(&child) {
                // Only an edge back into an already released concept can get here.
                continue;
            }
            let entry = levels.entry(child).or_insert(0);
            *entry = (*entry).max(level + 1);

            if let Some(degree) = in_degree.get_mut(&child) {
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    released.insert(child);
                    queue.push_back(child);
                }
            }
        }
    }

    let mut seen = HashSet::new();
    let mut orphans = Vec::new();
    let mut cyclic = Vec::new();
    for node in nodes {
        if !seen.insert(node.id) {
            continue;
        }
        if !reachable.contains(&node.id) {
            orphans.push(node.id);
            levels.insert(node.id, 0);
        } else if !released.contains(&node.id) {
            cyclic.push(node.id);
            levels.entry(node.id).or_insert(0);
        }
    }

    if !orphans.is_empty() {
        warn!(root, ?orphans, "concepts unreachable from root placed on level 0");
    }
    if !cyclic.is_empty() {
        warn!(root, ?cyclic, "cycle detected in covering relation");
    }

    LevelAssignment {
        root: Some(root),
        levels,
        orphans,
        cyclic,
        dangling_edges: graph.dangling,
    }
}
