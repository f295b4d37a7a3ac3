//! Coordinate layouts for the Hesse diagram and network views.

use crate::graph::{LevelAssignment, assign_levels};
use crate::types::{ConceptEdge, ConceptId, ConceptLattice, ConceptNode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::f64::consts::PI;
use std::fmt;

/// Which layout to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Layered diagram, one row per level.
    #[default]
    Hesse,
    /// Nodes on a circle, no ordering semantics.
    Network,
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hesse" | "hasse" => Ok(ViewMode::Hesse),
            "network" => Ok(ViewMode::Network),
            _ => Err(format!("Invalid view mode: {}. Must be hesse or network", s)),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Hesse => write!(f, "hesse"),
            ViewMode::Network => write!(f, "network"),
        }
    }
}

/// Drawing area for the Hesse diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Canvas {
            width: 800.0,
            height: 600.0,
            margin: 80.0,
        }
    }
}

/// Circle used by the network view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            center_x: 400.0,
            center_y: 300.0,
            radius: 200.0,
        }
    }
}

/// Layout settings, loadable from YAML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub canvas: Canvas,
    pub network: NetworkConfig,
}

/// Coordinates of one concept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub level: usize,
}

pub type Positions = BTreeMap<ConceptId, Position>;

/// A drawable edge, both endpoints resolved to coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeSegment {
    pub source: ConceptId,
    pub target: ConceptId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Gutter label for one Hesse level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelLabel {
    pub level: usize,
    pub y: f64,
}

/// Everything a renderer needs for one view of a lattice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatticeLayout {
    pub mode: ViewMode,
    pub positions: Positions,
    pub segments: Vec<EdgeSegment>,
    pub skipped_edges: Vec<ConceptEdge>,
    pub level_labels: Vec<LevelLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<LevelAssignment>,
}

/// Group concept ids by level, keeping input order within a level.
pub fn group_by_level(
    nodes: &[ConceptNode],
    levels: &LevelAssignment,
) -> BTreeMap<usize, Vec<ConceptId>> {
    let mut seen = HashSet::new();
    let mut groups: BTreeMap<usize, Vec<ConceptId>> = BTreeMap::new();
    for node in nodes {
        if !seen.insert(node.id) {
            continue;
        }
        let level = levels.level(node.id).unwrap_or(0);
        groups.entry(level).or_default().push(node.id);
    }
    groups
}

/// Place concepts row by row: y from the level, x spread evenly across the
/// row in input order.
pub fn hesse_layout(nodes: &[ConceptNode], levels: &LevelAssignment, canvas: &Canvas) -> Positions {
    let groups = group_by_level(nodes, levels);
    let max_level = groups.keys().next_back().copied().unwrap_or(0);

    let level_height = if max_level > 0 {
        (canvas.height - 2.0 * canvas.margin) / max_level as f64
    } else {
        0.0
    };
    let total_width = canvas.width - 2.0 * canvas.margin;

    let mut positions = Positions::new();
    for (level, ids) in groups {
        let y = canvas.margin + level as f64 * level_height;
        let count = ids.len();
        let spacing = if count > 1 {
            total_width / (count - 1) as f64
        } else {
            0.0
        };

        for (index, id) in ids.into_iter().enumerate() {
            let x = if count == 1 {
                canvas.width / 2.0
            } else {
                canvas.margin + index as f64 * spacing
            };
            positions.insert(id, Position { x, y, level });
        }
    }

    positions
}

/// Place concepts evenly on a circle, node `i` at angle `2πi/n`.
pub fn network_layout(nodes: &[ConceptNode], network: &NetworkConfig) -> Positions {
    let mut seen = HashSet::new();
    let ids: Vec<ConceptId> = nodes
        .iter()
        .map(|n| n.id)
        .filter(|id| seen.insert(*id))
        .collect();
    let count = ids.len();
    let mut positions = Positions::new();

    for (index, id) in ids.into_iter().enumerate() {
        let angle = 2.0 * PI * index as f64 / count as f64;
        positions.insert(
            id,
            Position {
                x: network.center_x + network.radius * angle.cos(),
                y: network.center_y + network.radius * angle.sin(),
                level: 0,
            },
        );
    }

    positions
}

/// Resolve edges to line segments, dropping any whose endpoint has no
/// position.
pub fn edge_segments(edges: &[ConceptEdge], positions: &Positions) -> Vec<EdgeSegment> {
    edges
        .iter()
        .filter_map(|edge| {
            let from = positions.get(&edge.source)?;
            let to = positions.get(&edge.target)?;
            Some(EdgeSegment {
                source: edge.source,
                target: edge.target,
                x1: from.x,
                y1: from.y,
                x2: to.x,
                y2: to.y,
            })
        })
        .collect()
}

/// One label per occupied level, at that level's y.
pub fn level_labels(positions: &Positions) -> Vec<LevelLabel> {
    let mut rows: BTreeMap<usize, f64> = BTreeMap::new();
    for position in positions.values() {
        rows.entry(position.level).or_insert(position.y);
    }
    rows.into_iter()
        .map(|(level, y)| LevelLabel { level, y })
        .collect()
}

/// Compute the full layout of a lattice for the given view.
pub fn compute_layout(lattice: &ConceptLattice, mode: ViewMode, config: &LayoutConfig) -> LatticeLayout {
    let (positions, levels) = match mode {
        ViewMode::Hesse => {
            let levels = assign_levels(&lattice.nodes, &lattice.edges);
            let positions = hesse_layout(&lattice.nodes, &levels, &config.canvas);
            (positions, Some(levels))
        }
        ViewMode::Network => (network_layout(&lattice.nodes, &config.network), None),
    };

    let segments = edge_segments(&lattice.edges, &positions);
    let skipped_edges = lattice
        .edges
        .iter()
        .filter(|e| !positions.contains_key(&e.source) || !positions.contains_key(&e.target))
        .cloned()
        .collect();
    let level_labels = match mode {
        ViewMode::Hesse => level_labels(&positions),
        ViewMode::Network => Vec::new(),
    };

    LatticeLayout {
        mode,
        positions,
        segments,
        skipped_edges,
        level_labels,
        levels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn node(id: ConceptId) -> ConceptNode {
        ConceptNode::new(id, vec![], vec![])
    }

    fn diamond() -> ConceptLattice {
        let mut nodes: Vec<_> = (0..4).map(node).collect();
        nodes[0].is_top = true;
        nodes[3].is_bottom = true;
        let edges = [(0, 1), (0, 2), (1, 3), (2, 3)]
            .iter()
            .map(|&(s, t)| ConceptEdge::covers(s, t))
            .collect();
        ConceptLattice::new(nodes, edges)
    }

    #[test]
    fn test_view_mode_parse() {
        assert_eq!("hesse".parse::<ViewMode>(), Ok(ViewMode::Hesse));
        assert_eq!("Network".parse::<ViewMode>(), Ok(ViewMode::Network));
        assert!("radial".parse::<ViewMode>().is_err());
    }

    #[test]
    fn test_hesse_diamond_coordinates() {
        let lattice = diamond();
        let layout = compute_layout(&lattice, ViewMode::Hesse, &LayoutConfig::default());
        let p = &layout.positions;

        assert_eq!(p[&0], Position { x: 400.0, y: 80.0, level: 0 });
        assert_eq!(p[&1], Position { x: 80.0, y: 300.0, level: 1 });
        assert_eq!(p[&2], Position { x: 720.0, y: 300.0, level: 1 });
        assert_eq!(p[&3], Position { x: 400.0, y: 520.0, level: 2 });
        assert_eq!(layout.segments.len(), 4);
        assert_eq!(
            layout.level_labels,
            vec![
                LevelLabel { level: 0, y: 80.0 },
                LevelLabel { level: 1, y: 300.0 },
                LevelLabel { level: 2, y: 520.0 },
            ]
        );
    }

    #[test]
    fn test_hesse_single_node_centered() {
        let mut only = node(0);
        only.is_top = true;
        only.is_bottom = true;
        let lattice = ConceptLattice::new(vec![only], vec![]);
        let layout = compute_layout(&lattice, ViewMode::Hesse, &LayoutConfig::default());
        assert_eq!(layout.positions[&0], Position { x: 400.0, y: 80.0, level: 0 });
    }

    #[test]
    fn test_hesse_row_spacing_is_constant() {
        let mut nodes: Vec<_> = (0..6).map(node).collect();
        nodes[0].is_top = true;
        let edges: Vec<_> = (1..6).map(|t| ConceptEdge::covers(0, t)).collect();
        let canvas = Canvas::default();
        let levels = assign_levels(&nodes, &edges);
        let positions = hesse_layout(&nodes, &levels, &canvas);

        let expected = (canvas.width - 2.0 * canvas.margin) / 4.0;
        let xs: Vec<f64> = (1..6).map(|id| positions[&id].x).collect();
        for pair in xs.windows(2) {
            assert!((pair[1] - pair[0] - expected).abs() < EPSILON);
        }
        assert_eq!(xs[0], canvas.margin);
    }

    #[test]
    fn test_hesse_row_order_follows_input_order() {
        let mut nodes = vec![node(0), node(9), node(4)];
        nodes[0].is_top = true;
        let edges = vec![ConceptEdge::covers(0, 4), ConceptEdge::covers(0, 9)];
        let levels = assign_levels(&nodes, &edges);
        let positions = hesse_layout(&nodes, &levels, &Canvas::default());
        assert!(positions[&9].x < positions[&4].x);
    }

    #[test]
    fn test_network_positions_on_circle() {
        let nodes: Vec<_> = (0..7).map(node).collect();
        let network = NetworkConfig::default();
        let positions = network_layout(&nodes, &network);

        let step = 2.0 * PI / 7.0;
        let mut previous: Option<f64> = None;
        for id in 0..7 {
            let p = positions[&id];
            let dx = p.x - network.center_x;
            let dy = p.y - network.center_y;
            assert!(((dx * dx + dy * dy).sqrt() - network.radius).abs() < EPSILON);
            assert_eq!(p.level, 0);

            let angle = dy.atan2(dx).rem_euclid(2.0 * PI);
            if let Some(prev) = previous {
                let delta = (angle - prev).rem_euclid(2.0 * PI);
                assert!((delta - step).abs() < EPSILON);
            }
            previous = Some(angle);
        }
    }

    #[test]
    fn test_network_duplicate_ids_leave_no_gap() {
        let nodes = vec![node(0), node(1), node(1), node(2), node(3)];
        let positions = network_layout(&nodes, &NetworkConfig::default());

        assert_eq!(positions.len(), 4);
        // Four distinct concepts sit a quarter turn apart.
        assert!((positions[&1].x - 400.0).abs() < EPSILON);
        assert!((positions[&1].y - 500.0).abs() < EPSILON);
        assert!((positions[&2].x - 200.0).abs() < EPSILON);
        assert!((positions[&3].y - 100.0).abs() < EPSILON);
    }

    #[test]
    fn test_network_single_node() {
        let positions = network_layout(&[node(0)], &NetworkConfig::default());
        assert_eq!(positions[&0], Position { x: 600.0, y: 300.0, level: 0 });
    }

    #[test]
    fn test_empty_lattice_layouts() {
        let lattice = ConceptLattice::default();
        for mode in [ViewMode::Hesse, ViewMode::Network] {
            let layout = compute_layout(&lattice, mode, &LayoutConfig::default());
            assert!(layout.positions.is_empty());
            assert!(layout.segments.is_empty());
        }
    }

    #[test]
    fn test_dangling_edge_is_skipped_but_nodes_positioned() {
        let mut lattice = diamond();
        lattice.edges.push(ConceptEdge::covers(3, 99));
        for mode in [ViewMode::Hesse, ViewMode::Network] {
            let layout = compute_layout(&lattice, mode, &LayoutConfig::default());
            assert_eq!(layout.positions.len(), 4);
            assert_eq!(layout.segments.len(), 4);
            assert_eq!(layout.skipped_edges, vec![ConceptEdge::covers(3, 99)]);
        }
    }

    #[test]
    fn test_layouts_are_idempotent() {
        let lattice = diamond();
        let config = LayoutConfig::default();
        for mode in [ViewMode::Hesse, ViewMode::Network] {
            let first = compute_layout(&lattice, mode, &config);
            let second = compute_layout(&lattice, mode, &config);
            for (id, p) in &first.positions {
                let q = second.positions[id];
                assert_eq!(p.x.to_bits(), q.x.to_bits());
                assert_eq!(p.y.to_bits(), q.y.to_bits());
            }
        }
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: LayoutConfig = serde_yaml::from_str("canvas:\n  width: 1000\n").unwrap();
        assert_eq!(config.canvas.width, 1000.0);
        assert_eq!(config.canvas.margin, 80.0);
        assert_eq!(config.network, NetworkConfig::default());
    }
}
