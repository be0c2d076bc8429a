//! Transformation checks against incoming field edges.

use indexmap::{IndexMap, IndexSet};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

use crate::model::Graph;
use crate::reference::references;

/// A mismatch between a field's transformation text and its incoming edges.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Discrepancy {
    #[error("Field {0} referenced in transformation but no edge connects it.")]
    MissingEdge(String),
    #[error("Field {0} has an edge but is not used in the transformation.")]
    UnusedEdge(String),
}

impl Serialize for Discrepancy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Field id -> discrepancies, in node order. Clean fields are absent.
pub type ValidationReport = IndexMap<String, Vec<Discrepancy>>;

pub fn validate(graph: &Graph) -> ValidationReport {
    let mut incoming: HashMap<&str, IndexSet<&str>> = HashMap::new();
    for edge in graph.field_edges() {
        incoming
            .entry(edge.target.as_str())
            .or_default()
            .insert(edge.source.as_str());
    }

    let no_sources = IndexSet::new();
    let mut report = ValidationReport::new();

    for field in graph.fields() {
        let Some(transformation) = field.transformation.as_deref() else {
            continue;
        };
        if transformation.is_empty() || report.contains_key(&field.id) {
            continue;
        }

        let referenced = references(transformation);
        let sources = incoming.get(field.id.as_str()).unwrap_or(&no_sources);

        let mut errors: Vec<Discrepancy> = referenced
            .iter()
            .filter(|r| !sources.contains(*r))
            .map(|r| Discrepancy::MissingEdge(r.to_string()))
            .collect();
        errors.extend(
            sources
                .iter()
                .filter(|s| !referenced.contains(*s))
                .map(|s| Discrepancy::UnusedEdge(s.to_string())),
        );

        if !errors.is_empty() {
            report.insert(field.id.clone(), errors);
        }
    }

    tracing::debug!(fields_with_errors = report.len(), "validated transformations");
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lineage_graph() -> Graph {
        Graph::from_json(
            r#"{
                "nodes": [
                    {"type": "table", "id": "A"},
                    {"type": "table", "id": "B"},
                    {"type": "table", "id": "C"},
                    {"type": "table", "id": "D"},
                    {"type": "field", "id": "A:A1"},
                    {"type": "field", "id": "A:A7"},
                    {"type": "field", "id": "B:B1"},
                    {"type": "field", "id": "C:C1"},
                    {"type": "field", "id": "D:D1", "transformation": "A:A7 * C:C1 + A:A1"},
                    {"type": "field", "id": "D:D2", "transformation": "coalesce(A:A1, C:C1)"},
                    {"type": "field", "id": "D:D3", "transformation": "   "}
                ],
                "edges": [
                    {"source": "A:A1", "target": "D:D1"},
                    {"source": "B:B1", "target": "D:D1"},
                    {"source": "C:C1", "target": "D:D1"},
                    {"source": "A:A7", "target": "D:D1"},
                    {"source": "A:A1", "target": "D:D2"},
                    {"source": "B:B1", "target": "D:D3"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_unused_edge() {
        let report = validate(&lineage_graph());
        assert_eq!(
            report["D:D1"],
            vec![Discrepancy::UnusedEdge("B:B1".into())]
        );
    }

    #[test]
    fn test_missing_edge() {
        let report = validate(&lineage_graph());
        assert_eq!(
            report["D:D2"],
            vec![Discrepancy::MissingEdge("C:C1".into())]
        );
    }

    #[test]
    fn test_whitespace_transformation_is_checked() {
        let report = validate(&lineage_graph());
        assert_eq!(
            report["D:D3"],
            vec![Discrepancy::UnusedEdge("B:B1".into())]
        );
    }

    #[test]
    fn test_clean_fields_absent() {
        let report = validate(&lineage_graph());
        assert_eq!(report.len(), 3);
        assert!(!report.contains_key("A:A1"));
        assert!(!report.contains_key("C:C1"));
    }

    #[test]
    fn test_empty_transformation_skipped() {
        let graph = Graph::from_json(
            r#"{
                "nodes": [
                    {"type": "field", "id": "T:out", "transformation": ""},
                    {"type": "field", "id": "S:a"}
                ],
                "edges": [{"source": "S:a", "target": "T:out"}]
            }"#,
        )
        .unwrap();
        assert!(validate(&graph).is_empty());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Discrepancy::MissingEdge("C:C1".into()).to_string(),
            "Field C:C1 referenced in transformation but no edge connects it."
        );
        assert_eq!(
            Discrepancy::UnusedEdge("B:B1".into()).to_string(),
            "Field B:B1 has an edge but is not used in the transformation."
        );

        let json = serde_json::to_string(&validate(&lineage_graph())).unwrap();
        assert!(json.contains(r#""D:D1":["Field B:B1 has an edge"#));
    }

    #[test]
    fn test_missing_before_unused() {
        let graph = Graph::from_json(
            r#"{
                "nodes": [
                    {"type": "field", "id": "T:out", "transformation": "S:b"},
                    {"type": "field", "id": "S:a"},
                    {"type": "field", "id": "S:b"}
                ],
                "edges": [{"source": "S:a", "target": "T:out"}]
            }"#,
        )
        .unwrap();
        let report = validate(&graph);
        assert_eq!(
            report["T:out"],
            vec![
                Discrepancy::MissingEdge("S:b".into()),
                Discrepancy::UnusedEdge("S:a".into()),
            ]
        );
    }

    #[test]
    fn test_deterministic() {
        let graph = lineage_graph();
        assert_eq!(validate(&graph), validate(&graph));
    }
}
