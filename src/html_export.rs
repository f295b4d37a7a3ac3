//! HTML export for concept lattices.
//!
//! Renders a computed layout as a standalone page with an inline SVG diagram
//! and the concept list.

use crate::layout::{EdgeSegment, LatticeLayout, LayoutConfig, LevelLabel, ViewMode};
use crate::query::{ConceptSummary, concept_summaries};
use crate::types::{ConceptId, ConceptLattice, ConceptRole};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tera::{Context, Tera};
use thiserror::Error;

const BASE_TEMPLATE: &str = include_str!("templates/base.html");
const LATTICE_TEMPLATE: &str = include_str!("templates/lattice.html");

/// Options for HTML export.
pub struct HtmlExportOptions {
    pub output_dir: PathBuf,
    pub title: String,
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

/// Node as seen by the template: summary plus coordinates.
#[derive(Debug, Serialize)]
struct TemplateNode {
    id: ConceptId,
    label: String,
    role: ConceptRole,
    x: f64,
    y: f64,
    level: usize,
    extent_size: usize,
    intent_size: usize,
    objects: String,
    attributes: String,
}

impl TemplateNode {
    fn new(summary: ConceptSummary, layout: &LatticeLayout) -> Option<Self> {
        let position = layout.positions.get(&summary.id)?;
        Some(TemplateNode {
            id: summary.id,
            label: summary.label,
            role: summary.role,
            x: position.x,
            y: position.y,
            level: position.level,
            extent_size: summary.extent_size,
            intent_size: summary.intent_size,
            objects: summary.objects.to_string(),
            attributes: summary.attributes.to_string(),
        })
    }
}

/// Canvas size that fits the layout for the chosen view.
fn canvas_size(mode: ViewMode, config: &LayoutConfig) -> (f64, f64) {
    match mode {
        ViewMode::Hesse => (config.canvas.width, config.canvas.height),
        ViewMode::Network => {
            let network = &config.network;
            let padding = 40.0;
            (
                (network.center_x + network.radius + padding).max(config.canvas.width),
                (network.center_y + network.radius + padding).max(config.canvas.height),
            )
        }
    }
}

/// Build the Tera context from a lattice and its layout.
fn build_context(
    lattice: &ConceptLattice,
    layout: &LatticeLayout,
    config: &LayoutConfig,
    options: &HtmlExportOptions,
) -> Context {
    let mut context = Context::new();
    context.insert("title", &options.title);
    context.insert(
        "generated_at",
        &chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
    );
    context.insert("mode", &layout.mode.to_string());
    context.insert("stats", &lattice.stats);

    let max_level = layout.positions.values().map(|p| p.level).max().unwrap_or(0);
    context.insert("max_level", &max_level);

    let (width, height) = canvas_size(layout.mode, config);
    context.insert("width", &width);
    context.insert("height", &height);

    let nodes: Vec<TemplateNode> = concept_summaries(lattice)
        .into_iter()
        .filter_map(|summary| TemplateNode::new(summary, layout))
        .collect();
    context.insert("nodes", &nodes);

    let segments: &[EdgeSegment] = &layout.segments;
    context.insert("segments", segments);
    let level_labels: &[LevelLabel] = &layout.level_labels;
    context.insert("level_labels", level_labels);

    context
}

/// Render the lattice page to a string.
pub fn render_html(
    lattice: &ConceptLattice,
    layout: &LatticeLayout,
    config: &LayoutConfig,
    options: &HtmlExportOptions,
) -> Result<String, ExportError> {
    let mut tera = Tera::default();
    tera.add_raw_template("base.html", BASE_TEMPLATE)?;
    tera.add_raw_template("lattice.html", LATTICE_TEMPLATE)?;

    let context = build_context(lattice, layout, config, options);
    Ok(tera.render("lattice.html", &context)?)
}

/// Export the lattice to HTML.
///
/// Returns the path to the generated index.html file.
pub fn export_html(
    lattice: &ConceptLattice,
    layout: &LatticeLayout,
    config: &LayoutConfig,
    options: &HtmlExportOptions,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(&options.output_dir)?;
    let html = render_html(lattice, layout, config, options)?;

    let output_path = options.output_dir.join("index.html");
    fs::write(&output_path, html)?;

    Ok(output_path)
}
