//! fca-lattice - layout engine for Formal Concept Analysis lattices.
//!
//! This library consumes a concept lattice (concepts plus their covering
//! edges), assigns every concept a longest-path level below the top concept,
//! and produces coordinates for a layered Hesse diagram or a circular network
//! view. It also answers read-only queries about individual concepts.

pub mod graph;
pub mod html_export;
pub mod layout;
pub mod lint;
pub mod query;
pub mod storage;
pub mod types;

pub use graph::{LatticeGraph, LevelAssignment, assign_levels, build_adjacency, select_root};
pub use html_export::{ExportError, HtmlExportOptions, export_html, render_html};
pub use layout::{
    Canvas, EdgeSegment, LatticeLayout, LayoutConfig, LevelLabel, NetworkConfig, Position,
    Positions, ViewMode, compute_layout, edge_segments, group_by_level, hesse_layout,
    network_layout,
};
pub use lint::{IssueKind, LintIssue, LintReport, LintSeverity, fix_issues, lint_lattice};
pub use query::{
    ConceptDetails, ConceptSummary, Preview, concept_details, concept_summaries, find_concept,
    lattice_stats, role_description,
};
pub use storage::{
    CONFIG_FILE, StorageError, discover_config, load_config, load_document, load_lattice,
    parse_document, save_document, save_lattice,
};
pub use types::{
    ConceptEdge, ConceptId, ConceptLattice, ConceptNode, ConceptRole, LatticeResponse,
    LatticeStats,
};
