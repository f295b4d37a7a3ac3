//! Lint and repair for lattice documents.
//!
//! Checks the data-model invariants a producer is expected to uphold. The
//! covering relation itself is not verified.

use crate::graph::assign_levels;
use crate::types::{ConceptId, ConceptLattice};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Severity of a lint issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    Error,
    Warning,
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintSeverity::Error => write!(f, "error"),
            LintSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// What a lint issue is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    EmptyLattice,
    DuplicateId,
    UnknownEndpoint,
    SelfLoop,
    MultipleTop,
    MultipleBottom,
    MissingTop,
    SizeMismatch,
    StatsMismatch,
    Cycle,
    Orphan,
}

impl IssueKind {
    pub fn fixable(self) -> bool {
        matches!(self, IssueKind::SizeMismatch | IssueKind::StatsMismatch)
    }
}

/// A single lint issue.
#[derive(Debug, Clone, Serialize)]
pub struct LintIssue {
    pub kind: IssueKind,
    pub node_id: Option<ConceptId>,
    pub severity: LintSeverity,
    pub message: String,
}

impl LintIssue {
    fn error(kind: IssueKind, node_id: Option<ConceptId>, message: String) -> Self {
        LintIssue {
            kind,
            node_id,
            severity: LintSeverity::Error,
            message,
        }
    }

    fn warning(kind: IssueKind, node_id: Option<ConceptId>, message: String) -> Self {
        LintIssue {
            kind,
            node_id,
            severity: LintSeverity::Warning,
            message,
        }
    }

    pub fn fixable(&self) -> bool {
        self.kind.fixable()
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node_part = self
            .node_id
            .map(|id| format!(" (concept {})", id))
            .unwrap_or_default();
        write!(f, "{}{}: {}", self.severity, node_part, self.message)
    }
}

/// Result of linting a lattice.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    pub issues: Vec<LintIssue>,
}

impl LintReport {
    pub fn errors(&self) -> Vec<&LintIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == LintSeverity::Error)
            .collect()
    }

    pub fn warnings(&self) -> Vec<&LintIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == LintSeverity::Warning)
            .collect()
    }

    pub fn fixable(&self) -> Vec<&LintIssue> {
        self.issues.iter().filter(|i| i.fixable()).collect()
    }

    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == LintSeverity::Error)
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Lint a lattice against its data-model invariants.
pub fn lint_lattice(lattice: &ConceptLattice) -> LintReport {
    let mut issues = Vec::new();

    if lattice.is_empty() {
        issues.push(LintIssue::warning(
            IssueKind::EmptyLattice,
            None,
            "Lattice has no concepts".to_string(),
        ));
    }

    check_nodes(lattice, &mut issues);
    check_edges(lattice, &mut issues);
    check_stats(lattice, &mut issues);
    check_structure(lattice, &mut issues);

    LintReport { issues }
}

fn check_nodes(lattice: &ConceptLattice, issues: &mut Vec<LintIssue>) {
    let mut seen = HashSet::new();
    for node in &lattice.nodes {
        if !seen.insert(node.id) {
            issues.push(LintIssue::error(
                IssueKind::DuplicateId,
                Some(node.id),
                format!("Duplicate concept id {}", node.id),
            ));
        }

        if node.extent_size != node.extent.len() {
            issues.push(LintIssue::warning(
                IssueKind::SizeMismatch,
                Some(node.id),
                format!(
                    "extent_size is {} but extent has {} objects",
                    node.extent_size,
                    node.extent.len()
                ),
            ));
        }
        if node.intent_size != node.intent.len() {
            issues.push(LintIssue::warning(
                IssueKind::SizeMismatch,
                Some(node.id),
                format!(
                    "intent_size is {} but intent has {} attributes",
                    node.intent_size,
                    node.intent.len()
                ),
            ));
        }
    }

    let tops: Vec<ConceptId> = lattice.nodes.iter().filter(|n| n.is_top).map(|n| n.id).collect();
    let bottoms: Vec<ConceptId> = lattice
        .nodes
        .iter()
        .filter(|n| n.is_bottom)
        .map(|n| n.id)
        .collect();

    if tops.len() > 1 {
        issues.push(LintIssue::error(
            IssueKind::MultipleTop,
            None,
            format!("Multiple top concepts: {:?}", tops),
        ));
    }
    if bottoms.len() > 1 {
        issues.push(LintIssue::error(
            IssueKind::MultipleBottom,
            None,
            format!("Multiple bottom concepts: {:?}", bottoms),
        ));
    }
    if tops.is_empty() && !lattice.is_empty() {
        issues.push(LintIssue::warning(
            IssueKind::MissingTop,
            None,
            "No concept is flagged as top; layout falls back to a root guess".to_string(),
        ));
    }
}

fn check_edges(lattice: &ConceptLattice, issues: &mut Vec<LintIssue>) {
    let ids: HashSet<ConceptId> = lattice.nodes.iter().map(|n| n.id).collect();

    for edge in &lattice.edges {
        for endpoint in [edge.source, edge.target] {
            if !ids.contains(&endpoint) {
                issues.push(LintIssue::error(
                    IssueKind::UnknownEndpoint,
                    None,
                    format!(
                        "Edge {} -> {} references non-existent concept {}",
                        edge.source, edge.target, endpoint
                    ),
                ));
            }
        }
        if edge.source == edge.target {
            issues.push(LintIssue::warning(
                IssueKind::SelfLoop,
                Some(edge.source),
                format!("Edge {} -> {} is a self-loop", edge.source, edge.target),
            ));
        }
    }
}

fn check_stats(lattice: &ConceptLattice, issues: &mut Vec<LintIssue>) {
    let derived = lattice.derive_stats();
    let stats = &lattice.stats;

    let mut mismatch = |field: &str, actual: String, expected: String| {
        issues.push(LintIssue::warning(
            IssueKind::StatsMismatch,
            None,
            format!("stats.{} is {} but the nodes give {}", field, actual, expected),
        ));
    };

    if stats.total_concepts != derived.total_concepts {
        mismatch(
            "total_concepts",
            stats.total_concepts.to_string(),
            derived.total_concepts.to_string(),
        );
    }
    if stats.total_objects != derived.total_objects {
        mismatch(
            "total_objects",
            stats.total_objects.to_string(),
            derived.total_objects.to_string(),
        );
    }
    if stats.total_attributes != derived.total_attributes {
        mismatch(
            "total_attributes",
            stats.total_attributes.to_string(),
            derived.total_attributes.to_string(),
        );
    }
    if stats.top_concept != derived.top_concept {
        mismatch(
            "top_concept",
            format!("{:?}", stats.top_concept),
            format!("{:?}", derived.top_concept),
        );
    }
    if stats.bottom_concept != derived.bottom_concept {
        mismatch(
            "bottom_concept",
            format!("{:?}", stats.bottom_concept),
            format!("{:?}", derived.bottom_concept),
        );
    }
}

fn check_structure(lattice: &ConceptLattice, issues: &mut Vec<LintIssue>) {
    let levels = assign_levels(&lattice.nodes, &lattice.edges);

    if levels.has_cycle() {
        issues.push(LintIssue::warning(
            IssueKind::Cycle,
            None,
            format!("Cycle detected involving concepts {:?}", levels.cyclic),
        ));
    }
    for id in &levels.orphans {
        issues.push(LintIssue::warning(
            IssueKind::Orphan,
            Some(*id),
            format!("Concept {} is unreachable from the root", id),
        ));
    }
}

/// Apply auto-fixes for fixable issues. Returns the repaired lattice and a
/// description of each fix.
pub fn fix_issues(lattice: &ConceptLattice, report: &LintReport) -> (ConceptLattice, Vec<String>) {
    let mut fixed_lattice = lattice.clone();
    let mut fixed = Vec::new();

    let size_ids: HashSet<ConceptId> = report
        .fixable()
        .iter()
        .filter(|i| i.kind == IssueKind::SizeMismatch)
        .filter_map(|i| i.node_id)
        .collect();

    for node in fixed_lattice
        .nodes
        .iter_mut()
        .filter(|n| size_ids.contains(&n.id) && !n.sizes_consistent())
    {
        node.extent_size = node.extent.len();
        node.intent_size = node.intent.len();
        fixed.push(format!("Recomputed sizes of concept {}", node.id));
    }

    let stats_stale = report
        .fixable()
        .iter()
        .any(|i| i.kind == IssueKind::StatsMismatch);
    if stats_stale {
        fixed_lattice.stats = fixed_lattice.derive_stats();
        fixed.push("Recomputed stats block".to_string());
    }

    (fixed_lattice, fixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConceptEdge, ConceptNode};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn valid_lattice() -> ConceptLattice {
        let mut top = ConceptNode::new(0, strings(&["T1", "T2"]), vec![]);
        top.is_top = true;
        let middle = ConceptNode::new(1, strings(&["T1", "T2"]), strings(&["milk"]));
        let mut bottom = ConceptNode::new(2, strings(&["T2"]), strings(&["milk", "eggs"]));
        bottom.is_bottom = true;
        ConceptLattice::new(
            vec![top, middle, bottom],
            vec![ConceptEdge::covers(0, 1), ConceptEdge::covers(1, 2)],
        )
    }

    #[test]
    fn test_lint_valid_lattice() {
        let report = lint_lattice(&valid_lattice());
        assert!(report.is_clean(), "unexpected issues: {:?}", report.issues);
    }

    #[test]
    fn test_lint_empty_lattice() {
        let report = lint_lattice(&ConceptLattice::default());
        assert!(!report.has_errors());
        assert_eq!(report.warnings()[0].kind, IssueKind::EmptyLattice);
    }

    #[test]
    fn test_lint_duplicate_ids() {
        let mut lattice = valid_lattice();
        lattice.nodes.push(ConceptNode::new(1, vec![], vec![]));
        let report = lint_lattice(&lattice);
        assert!(report.errors().iter().any(|e| e.kind == IssueKind::DuplicateId));
    }

    #[test]
    fn test_lint_dangling_edge() {
        let mut lattice = valid_lattice();
        lattice.edges.push(ConceptEdge::covers(2, 99));
        let report = lint_lattice(&lattice);
        let errors = report.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("non-existent concept 99"));
    }

    #[test]
    fn test_lint_multiple_tops() {
        let mut lattice = valid_lattice();
        lattice.nodes[1].is_top = true;
        let report = lint_lattice(&lattice);
        assert!(report.errors().iter().any(|e| e.kind == IssueKind::MultipleTop));
    }

    #[test]
    fn test_lint_missing_top() {
        let mut lattice = valid_lattice();
        lattice.nodes[0].is_top = false;
        let report = lint_lattice(&lattice);
        assert!(report.warnings().iter().any(|w| w.kind == IssueKind::MissingTop));
    }

    #[test]
    fn test_lint_cycle_and_self_loop() {
        let mut lattice = valid_lattice();
        lattice.edges.push(ConceptEdge::covers(2, 2));
        let report = lint_lattice(&lattice);
        let kinds: Vec<_> = report.warnings().iter().map(|w| w.kind).collect();
        assert!(kinds.contains(&IssueKind::SelfLoop));
        assert!(kinds.contains(&IssueKind::Cycle));
    }

    #[test]
    fn test_lint_orphan() {
        let mut lattice = valid_lattice();
        lattice.edges.remove(1);
        let report = lint_lattice(&lattice);
        let orphan = report
            .warnings()
            .into_iter()
            .find(|w| w.kind == IssueKind::Orphan)
            .cloned()
            .unwrap();
        assert_eq!(orphan.node_id, Some(2));
    }

    #[test]
    fn test_fix_recomputes_sizes_and_stats() {
        let mut lattice = valid_lattice();
        lattice.nodes[2].extent_size = 7;
        lattice.stats.total_objects = 40;

        let report = lint_lattice(&lattice);
        assert_eq!(report.fixable().len(), 2);

        let (fixed_lattice, fixed) = fix_issues(&lattice, &report);
        assert_eq!(fixed.len(), 2);
        assert_eq!(fixed_lattice.nodes[2].extent_size, 1);
        assert_eq!(fixed_lattice.stats.total_objects, 2);
        assert!(lint_lattice(&fixed_lattice).is_clean());
    }

    #[test]
    fn test_fix_leaves_unfixable_issues() {
        let mut lattice = valid_lattice();
        lattice.edges.push(ConceptEdge::covers(0, 42));
        let report = lint_lattice(&lattice);
        let (fixed_lattice, fixed) = fix_issues(&lattice, &report);
        assert!(fixed.is_empty());
        assert_eq!(fixed_lattice, lattice);
    }

    #[test]
    fn test_lint_issue_display() {
        let issue = LintIssue::error(IssueKind::DuplicateId, Some(3), "test error".to_string());
        let display = format!("{}", issue);
        assert!(display.contains("error"));
        assert!(display.contains("concept 3"));
    }
}
