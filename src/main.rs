//! fca-lattice CLI - lay out and inspect Formal Concept Analysis lattices.

use clap::{Parser, Subcommand};
use colored::Colorize;
use fca_lattice::{
    ConceptId, ConceptLattice, HtmlExportOptions, LatticeLayout, LatticeResponse, LayoutConfig,
    LintSeverity, ViewMode, assign_levels, compute_layout, concept_details, concept_summaries,
    discover_config, export_html, fix_issues, group_by_level, lint_lattice, load_config,
    load_document, role_description, save_document,
};
use serde::Serialize;
use serde_json::json;
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "fca-lattice")]
#[command(about = "Layout engine and inspector for Formal Concept Analysis lattices")]
#[command(version)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Layout config file (YAML); defaults to ./fca-lattice.yaml if present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the hierarchical level of every concept
    Levels {
        /// Lattice JSON file (bare lattice or service response)
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Compute node coordinates for a view
    Layout {
        /// Lattice JSON file
        file: PathBuf,

        /// View mode (hesse, network)
        #[arg(short, long, default_value = "hesse")]
        mode: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show the extent and intent of one concept
    Inspect {
        /// Lattice JSON file
        file: PathBuf,

        /// Concept ID
        id: ConceptId,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List all concepts
    List {
        /// Lattice JSON file
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show lattice statistics
    Stats {
        /// Lattice JSON file
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Lint a lattice file for invariant violations
    Lint {
        /// Lattice JSON file
        file: PathBuf,

        /// Rewrite FILE with recomputed sizes and stats
        #[arg(long)]
        fix: bool,

        /// Exit with non-zero status on any issue (for CI)
        #[arg(long)]
        strict: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Export the lattice with its layout
    Export {
        /// Lattice JSON file
        file: PathBuf,

        /// Export format (html, json)
        #[arg(short, long, default_value = "html")]
        format: String,

        /// View mode (hesse, network)
        #[arg(short, long, default_value = "hesse")]
        mode: String,

        /// Output directory for HTML export
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Page title
        #[arg(short, long, default_value = "Concept Lattice")]
        title: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fca_lattice=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fca_lattice=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn is_json(format: &str) -> bool {
    format == "json"
}

fn emit_error(format: &str, code: &str, detail: &str) -> ! {
    if is_json(format) {
        eprintln!("{}", json!({"error": code, "detail": detail}));
    } else {
        eprintln!("{}", format!("Error: {}", detail).red());
    }
    process::exit(1);
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => emit_error("json", "serialize_error", &e.to_string()),
    }
}

fn load_or_exit(file: &Path, format: &str) -> LatticeResponse {
    match load_document(file) {
        Ok(doc) => doc,
        Err(e) => emit_error(
            format,
            "load_error",
            &format!("Failed to load {}: {}", file.display(), e),
        ),
    }
}

fn resolve_config(path: Option<&Path>, format: &str) -> LayoutConfig {
    match path {
        Some(p) => match load_config(p) {
            Ok(config) => config,
            Err(e) => emit_error(
                format,
                "config_error",
                &format!("Failed to load config {}: {}", p.display(), e),
            ),
        },
        None => env::current_dir()
            .map(|cwd| discover_config(&cwd))
            .unwrap_or_default(),
    }
}

fn parse_mode(mode: &str, format: &str) -> ViewMode {
    match mode.parse() {
        Ok(m) => m,
        Err(e) => emit_error(format, "invalid_mode", &e),
    }
}

fn role_badge(lattice: &ConceptLattice, id: ConceptId) -> String {
    match lattice.find(id) {
        Some(n) if n.is_top => " (TOP)".red().bold().to_string(),
        Some(n) if n.is_bottom => " (BOTTOM)".green().bold().to_string(),
        _ => String::new(),
    }
}

fn print_layout(lattice: &ConceptLattice, layout: &LatticeLayout) {
    println!("{}", format!("{} LAYOUT", layout.mode).to_uppercase().bold());
    println!();
    for node in &lattice.nodes {
        if let Some(p) = layout.positions.get(&node.id) {
            println!(
                "  {:>4}  L{:<3} ({:>7.1}, {:>7.1})  {}{}",
                node.id,
                p.level,
                p.x,
                p.y,
                node.label,
                role_badge(lattice, node.id)
            );
        }
    }
    println!();
    println!(
        "{}",
        format!(
            "{} nodes, {} edges drawn",
            layout.positions.len(),
            layout.segments.len()
        )
        .dimmed()
    );
    for edge in &layout.skipped_edges {
        println!(
            "{}",
            format!(
                "Skipped edge {} -> {}: endpoint has no position",
                edge.source, edge.target
            )
            .yellow()
        );
    }
}

fn print_items(heading: &str, items: &[String], size: usize, empty: &str) {
    println!("{}", heading.bold());
    if items.is_empty() {
        println!("  {}", empty.italic().dimmed());
    } else {
        println!("  {}", items.join(", "));
    }
    println!("{}", format!("  Size: {}", size).dimmed());
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Levels { file, format } => {
            let doc = load_or_exit(&file, &format);
            let lattice = &doc.lattice;
            let assignment = assign_levels(&lattice.nodes, &lattice.edges);

            if is_json(&format) {
                print_json(&assignment);
                return;
            }

            if lattice.is_empty() {
                println!("{}", "Lattice has no concepts".yellow());
                return;
            }

            println!("{}", "CONCEPT LEVELS".bold());
            if let Some(root) = assignment.root {
                println!(
                    "{}",
                    format!("Root: concept {}{}", root, role_badge(lattice, root)).dimmed()
                );
            }
            println!();

            for (level, ids) in group_by_level(&lattice.nodes, &assignment) {
                let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                println!("  {}  {}", format!("L{}", level).cyan(), ids.join(", "));
            }

            if !assignment.orphans.is_empty() {
                println!();
                println!(
                    "{}",
                    format!(
                        "Unreachable from root (placed on L0): {:?}",
                        assignment.orphans
                    )
                    .yellow()
                );
            }
            if assignment.has_cycle() {
                println!(
                    "{}",
                    format!("Cycle detected involving: {:?}", assignment.cyclic).red()
                );
            }
            for edge in &assignment.dangling_edges {
                println!(
                    "{}",
                    format!(
                        "Ignored edge {} -> {}: unknown concept",
                        edge.source, edge.target
                    )
                    .yellow()
                );
            }
        }

        Commands::Layout { file, mode, format } => {
            let mode = parse_mode(&mode, &format);
            let config = resolve_config(config_path, &format);
            let doc = load_or_exit(&file, &format);
            let layout = compute_layout(&doc.lattice, mode, &config);

            if is_json(&format) {
                print_json(&layout);
            } else {
                print_layout(&doc.lattice, &layout);
            }
        }

        Commands::Inspect { file, id, format } => {
            let doc = load_or_exit(&file, &format);

            let Some(details) = concept_details(&doc.lattice, id) else {
                emit_error(
                    &format,
                    "concept_not_found",
                    &format!("Concept not found: {}", id),
                );
            };

            if is_json(&format) {
                print_json(&details);
                return;
            }

            println!(
                "{}",
                format!("Concept {} {}", details.id, details.label)
                    .cyan()
                    .bold()
            );
            if let Some(description) = role_description(details.role) {
                println!("{}", description.yellow());
            }
            println!();
            print_items(
                "Extent (Objects):",
                &details.extent,
                details.extent_size,
                "Empty extent",
            );
            println!();
            print_items(
                "Intent (Attributes):",
                &details.intent,
                details.intent_size,
                "Empty intent",
            );
        }

        Commands::List { file, format } => {
            let doc = load_or_exit(&file, &format);
            let summaries = concept_summaries(&doc.lattice);

            if is_json(&format) {
                print_json(&json!({
                    "count": summaries.len(),
                    "concepts": summaries,
                }));
                return;
            }

            if summaries.is_empty() {
                println!("{}", "Lattice has no concepts".yellow());
                return;
            }

            for summary in &summaries {
                println!(
                    "{}{}  {}",
                    format!("Concept {} {}", summary.id, summary.label).bold(),
                    role_badge(&doc.lattice, summary.id),
                    format!(
                        "{} objects, {} attributes",
                        summary.extent_size, summary.intent_size
                    )
                    .dimmed()
                );
                println!("  Objects: {}", summary.objects);
                println!("  Attributes: {}", summary.attributes);
            }
        }

        Commands::Stats { file, format } => {
            let doc = load_or_exit(&file, &format);
            let stats = &doc.lattice.stats;

            if is_json(&format) {
                print_json(&json!({
                    "stats": stats,
                    "processing_time": doc.processing_time,
                    "transaction_count": doc.transaction_count,
                    "message": doc.message,
                }));
                return;
            }

            println!("{}", "LATTICE STATISTICS".bold());
            println!();
            println!("  Total concepts:   {}", stats.total_concepts);
            println!("  Objects:          {}", stats.total_objects);
            println!("  Attributes:       {}", stats.total_attributes);
            let show_id = |id: Option<ConceptId>| {
                id.map(|i| i.to_string())
                    .unwrap_or_else(|| "-".to_string())
            };
            println!("  Top concept:      {}", show_id(stats.top_concept));
            println!("  Bottom concept:   {}", show_id(stats.bottom_concept));
            if doc.transaction_count > 0 {
                println!("  Transactions:     {}", doc.transaction_count);
                println!("  Processing time:  {:.2}s", doc.processing_time);
            }
        }

        Commands::Lint {
            file,
            fix,
            strict,
            format,
        } => {
            let mut doc = load_or_exit(&file, &format);
            let report = lint_lattice(&doc.lattice);

            let mut fixed_msgs = Vec::new();
            if fix && !report.fixable().is_empty() {
                let (fixed_lattice, msgs) = fix_issues(&doc.lattice, &report);
                doc.lattice = fixed_lattice;
                if let Err(e) = save_document(&file, &doc) {
                    emit_error(&format, "save_error", &e.to_string());
                }
                fixed_msgs = msgs;
            }

            if is_json(&format) {
                print_json(&json!({
                    "errors": report.errors().len(),
                    "warnings": report.warnings().len(),
                    "fixable": report.fixable().len(),
                    "issues": report.issues,
                    "fixed": fixed_msgs,
                }));

                if report.has_errors() {
                    process::exit(1);
                } else if strict && !report.is_clean() {
                    process::exit(2);
                }
                return;
            }

            if report.is_clean() {
                println!("{}", "No issues found".green());
                return;
            }

            for issue in &report.issues {
                let colored_msg = match issue.severity {
                    LintSeverity::Error => format!("{}", issue).red().to_string(),
                    LintSeverity::Warning => format!("{}", issue).yellow().to_string(),
                };
                println!("{}", colored_msg);
            }
            println!();

            println!(
                "{}",
                format!(
                    "{} error(s), {} warning(s), {} fixable",
                    report.errors().len(),
                    report.warnings().len(),
                    report.fixable().len()
                )
                .bold()
            );

            if !fixed_msgs.is_empty() {
                println!();
                for msg in &fixed_msgs {
                    println!("{}", format!("Fixed: {}", msg).green());
                }
                println!(
                    "{}",
                    format!("{} issue(s) fixed", fixed_msgs.len())
                        .green()
                        .bold()
                );
            }

            if strict || report.has_errors() {
                process::exit(1);
            }
        }

        Commands::Export {
            file,
            format,
            mode,
            output,
            title,
        } => {
            let view = parse_mode(&mode, "text");
            let config = resolve_config(config_path, "text");
            let doc = load_or_exit(&file, "text");
            let layout = compute_layout(&doc.lattice, view, &config);

            match format.as_str() {
                "json" => print_json(&json!({
                    "lattice": doc.lattice,
                    "layout": layout,
                })),
                "html" => {
                    let options = HtmlExportOptions {
                        output_dir: output.unwrap_or_else(|| PathBuf::from("_site")),
                        title,
                    };
                    match export_html(&doc.lattice, &layout, &config, &options) {
                        Ok(path) => {
                            println!("{}", format!("HTML exported to {}", path.display()).green());
                        }
                        Err(e) => emit_error("text", "export_error", &e.to_string()),
                    }
                }
                other => emit_error("text", "invalid_format", &format!("Unknown format: {}", other)),
            }
        }
    }
}
