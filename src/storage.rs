//! File-based storage for lattices and layout configuration.

use crate::layout::LayoutConfig;
use crate::types::{ConceptLattice, LatticeResponse};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file picked up from the working directory when no `--config` is given.
pub const CONFIG_FILE: &str = "fca-lattice.yaml";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid lattice document: {0}")]
    InvalidDocument(String),
}

/// Parse a lattice document: either a service response envelope
/// (`{"lattice": ..., "processing_time": ...}`) or a bare lattice.
pub fn parse_document(content: &str) -> Result<LatticeResponse, StorageError> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    if !value.is_object() {
        return Err(StorageError::InvalidDocument(
            "expected a JSON object".to_string(),
        ));
    }

    if value.get("lattice").is_some() {
        let mut doc: LatticeResponse = serde_json::from_value(value)?;
        doc.envelope = true;
        return Ok(doc);
    }

    let lattice: ConceptLattice = serde_json::from_value(value)?;
    Ok(LatticeResponse {
        lattice,
        processing_time: 0.0,
        transaction_count: 0,
        message: String::new(),
        envelope: false,
    })
}

/// Load a lattice document from a JSON file.
pub fn load_document(path: &Path) -> Result<LatticeResponse, StorageError> {
    let content = fs::read_to_string(path)?;
    parse_document(&content)
}

/// Load just the lattice from a JSON file.
pub fn load_lattice(path: &Path) -> Result<ConceptLattice, StorageError> {
    Ok(load_document(path)?.lattice)
}

/// Save a lattice as pretty-printed JSON.
pub fn save_lattice(path: &Path, lattice: &ConceptLattice) -> Result<(), StorageError> {
    let content = serde_json::to_string_pretty(lattice)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Save a document in the shape it was read: the full envelope, or just the
/// lattice.
pub fn save_document(path: &Path, doc: &LatticeResponse) -> Result<(), StorageError> {
    if !doc.envelope {
        return save_lattice(path, &doc.lattice);
    }
    let content = serde_json::to_string_pretty(doc)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Read a layout config from a YAML file. Missing keys keep their defaults.
pub fn load_config(path: &Path) -> Result<LayoutConfig, StorageError> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(LayoutConfig::default());
    }
    Ok(serde_yaml::from_str(&content)?)
}

/// Read `fca-lattice.yaml` from `dir` if present and valid, else defaults.
pub fn discover_config(dir: &Path) -> LayoutConfig {
    let config_path = dir.join(CONFIG_FILE);
    fs::read_to_string(&config_path)
        .ok()
        .and_then(|content| serde_yaml::from_str(&content).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConceptEdge, ConceptNode};
    use tempfile::TempDir;

    const BARE: &str = r#"{
        "nodes": [{"id": 0, "extent": ["T1"], "intent": [], "extent_size": 1,
                   "intent_size": 0, "label": "(1,0)", "is_top": true, "is_bottom": true}],
        "edges": [],
        "stats": {"total_concepts": 1, "total_objects": 1, "total_attributes": 0,
                  "top_concept": 0, "bottom_concept": 0}
    }"#;

    #[test]
    fn test_parse_bare_lattice() {
        let doc = parse_document(BARE).unwrap();
        assert_eq!(doc.lattice.nodes.len(), 1);
        assert_eq!(doc.processing_time, 0.0);
    }

    #[test]
    fn test_parse_response_envelope() {
        let content = format!(
            r#"{{"lattice": {}, "processing_time": 0.25, "transaction_count": 5,
                "message": "Sample concept lattice generated successfully"}}"#,
            BARE
        );
        let doc = parse_document(&content).unwrap();
        assert_eq!(doc.transaction_count, 5);
        assert_eq!(doc.processing_time, 0.25);
        assert_eq!(doc.lattice.stats.top_concept, Some(0));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(matches!(
            parse_document("[1, 2, 3]"),
            Err(StorageError::InvalidDocument(_))
        ));
        assert!(matches!(parse_document("{"), Err(StorageError::Json(_))));
    }

    #[test]
    fn test_save_and_load_lattice() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("lattice.json");
        let lattice = ConceptLattice::new(
            vec![ConceptNode::new(0, vec![], vec![]), ConceptNode::new(1, vec![], vec![])],
            vec![ConceptEdge::covers(0, 1)],
        );

        save_lattice(&path, &lattice).unwrap();
        assert_eq!(load_lattice(&path).unwrap(), lattice);
    }

    #[test]
    fn test_save_document_keeps_envelope() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("response.json");
        let content = format!(
            r#"{{"lattice": {}, "processing_time": 0.5, "transaction_count": 4,
                "message": "ok"}}"#,
            BARE
        );
        let mut doc = parse_document(&content).unwrap();
        assert!(doc.envelope);
        doc.lattice.stats.total_objects = 1;

        save_document(&path, &doc).unwrap();
        let reloaded = load_document(&path).unwrap();
        assert!(reloaded.envelope);
        assert_eq!(reloaded.transaction_count, 4);
        assert_eq!(reloaded.message, "ok");
        assert_eq!(reloaded.lattice, doc.lattice);
    }

    #[test]
    fn test_save_document_keeps_bare_lattice() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lattice.json");
        let doc = parse_document(BARE).unwrap();
        assert!(!doc.envelope);

        save_document(&path, &doc).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value.get("lattice").is_none());
        assert!(value.get("nodes").is_some());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_lattice(&temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[test]
    fn test_load_config_merges_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("layout.yaml");
        fs::write(&path, "network:\n  radius: 150\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.network.radius, 150.0);
        assert_eq!(config.network.center_x, 400.0);
        assert_eq!(config.canvas.width, 800.0);
    }

    #[test]
    fn test_load_config_rejects_bad_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("layout.yaml");
        fs::write(&path, "canvas: [not, a, map]\n").unwrap();
        assert!(matches!(load_config(&path), Err(StorageError::Yaml(_))));
    }

    #[test]
    fn test_discover_config_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(discover_config(temp_dir.path()), LayoutConfig::default());

        fs::write(temp_dir.path().join(CONFIG_FILE), "canvas:\n  margin: 40\n").unwrap();
        assert_eq!(discover_config(temp_dir.path()).canvas.margin, 40.0);
    }
}
