//! Org chart document loading.
//!
//! Any failure here (missing file, malformed JSON, invalid hierarchy) is
//! returned before a simulation is constructed.

use crate::error::Result;
use crate::graph::types::{OrgChartDocument, OrgGraph};
use crate::settings::LayoutSettings;
use std::path::Path;
use std::time::Instant;

/// Parse a document from JSON text.
pub fn parse_document(json: &str) -> Result<OrgChartDocument> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a document from disk.
pub fn load_document(path: &Path) -> Result<OrgChartDocument> {
    let start = Instant::now();
    let contents = std::fs::read_to_string(path)?;
    let doc = parse_document(&contents)?;
    tracing::info!(
        "Loaded {:?}: {} nodes, {} links in {}ms",
        path,
        doc.nodes.len(),
        doc.links.len(),
        start.elapsed().as_millis()
    );
    Ok(doc)
}

/// Load a document and build the validated entity model.
pub fn load_graph(path: &Path, settings: &LayoutSettings) -> Result<OrgGraph> {
    let doc = load_document(path)?;
    OrgGraph::from_document(&doc, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrgChartError;
    use crate::graph::types::Level;

    const SAMPLE: &str = r#"{
        "nodes": [
            {"id": "Engineering", "level": "1", "group": "Engineering", "tooltip": "Builds things"},
            {"id": "Platform", "level": "2", "parent": "Engineering", "group": "Engineering"},
            {"id": "Ada", "level": "3", "parent": "Platform", "group": "Engineering"},
            {"id": "Sales", "level": "1", "group": "Sales"}
        ],
        "links": [
            {"source": "Engineering", "target": "Platform"},
            {"source": "Platform", "target": "Ada"},
            {"source": "Engineering", "target": "Sales", "relationship": "Supports"}
        ]
    }"#;

    #[test]
    fn test_parse_document() {
        let doc = parse_document(SAMPLE).unwrap();
        assert_eq!(doc.nodes.len(), 4);
        assert_eq!(doc.nodes[0].tooltip.as_deref(), Some("Builds things"));
        assert_eq!(doc.links[2].relationship.as_deref(), Some("Supports"));
    }

    #[test]
    fn test_load_graph_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("org.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let graph = load_graph(&path, &LayoutSettings::default()).unwrap();
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.get_node("Ada").map(|n| n.level), Some(Level::Individual));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_document(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, OrgChartError::Io(_)));
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        assert!(matches!(
            parse_document("{\"nodes\": [ {\"id\": 1 } ]"),
            Err(OrgChartError::Json(_))
        ));
    }
}
