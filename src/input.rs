//! Normalization of caller-supplied graph JSON into a [`Graph`].

use serde::Deserialize;
use std::collections::HashSet;

use crate::model::{Edge, EdgeKind, FieldNode, Graph, Node, TableNode};

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Invalid graph JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),
    #[error("Field {0} has no tableId and no table prefix in its id")]
    UnownedField(String),
}

#[derive(Debug, Deserialize)]
pub struct RawGraph {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawNode {
    Table {
        id: String,
        name: Option<String>,
        note: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Field {
        id: String,
        name: Option<String>,
        table_id: Option<String>,
        transformation: Option<String>,
        note: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub struct RawEdge {
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub kind: RawEdgeKind,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawEdgeKind {
    #[default]
    Field,
    Table,
}

impl TryFrom<RawGraph> for Graph {
    type Error = GraphError;

    fn try_from(raw: RawGraph) -> Result<Self, Self::Error> {
        let mut seen = HashSet::new();
        let mut nodes = Vec::with_capacity(raw.nodes.len());

        for raw_node in raw.nodes {
            let node = normalize_node(raw_node)?;
            if !seen.insert(node.id().to_string()) {
                return Err(GraphError::DuplicateNode(node.id().to_string()));
            }
            nodes.push(node);
        }

        let edges = raw
            .edges
            .into_iter()
            .map(|e| Edge {
                id: e.id.unwrap_or_else(|| format!("{}->{}", e.source, e.target)),
                source: e.source,
                target: e.target,
                kind: match e.kind {
                    RawEdgeKind::Field => EdgeKind::Field,
                    RawEdgeKind::Table => EdgeKind::Table,
                },
            })
            .collect();

        Ok(Graph::new(nodes, edges))
    }
}

impl Graph {
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let raw: RawGraph = serde_json::from_str(json)?;
        Graph::try_from(raw)
    }
}

fn normalize_node(raw: RawNode) -> Result<Node, GraphError> {
    match raw {
        RawNode::Table { id, name, note } => Ok(Node::Table(TableNode {
            name: name.unwrap_or_else(|| id.clone()),
            id,
            note,
        })),
        RawNode::Field {
            id,
            name,
            table_id,
            transformation,
            note,
        } => {
            let table_id = match table_id {
                Some(t) => t,
                None => table_prefix(&id)
                    .map(str::to_string)
                    .ok_or_else(|| GraphError::UnownedField(id.clone()))?,
            };
            Ok(Node::Field(FieldNode {
                name: name.unwrap_or_else(|| id.clone()),
                id,
                table_id,
                transformation,
                note,
            }))
        }
    }
}

/// `"orders:id"` -> `"orders"`.
fn table_prefix(id: &str) -> Option<&str> {
    id.split_once(':')
        .map(|(prefix, _)| prefix)
        .filter(|prefix| !prefix.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let json = r#"{
            "nodes": [
                {"type": "table", "id": "A", "name": "Orders"},
                {"type": "field", "id": "A:A1", "name": "id", "tableId": "A"},
                {"type": "field", "id": "A:A2", "transformation": "A:A1 + 1"}
            ],
            "edges": [
                {"id": "e1", "source": "A:A1", "target": "A:A2"},
                {"source": "A", "target": "B", "kind": "table"}
            ]
        }"#;
        let graph = Graph::from_json(json).unwrap();

        assert_eq!(graph.nodes().len(), 3);
        assert_eq!(graph.table("A").unwrap().name, "Orders");

        let a2 = graph.field("A:A2").unwrap();
        assert_eq!(a2.table_id, "A");
        assert_eq!(a2.name, "A:A2");
        assert_eq!(a2.transformation.as_deref(), Some("A:A1 + 1"));

        assert_eq!(graph.edges()[0].kind, EdgeKind::Field);
        assert_eq!(graph.edges()[1].id, "A->B");
        assert_eq!(graph.edges()[1].kind, EdgeKind::Table);
    }

    #[test]
    fn test_duplicate_node() {
        let json = r#"{"nodes": [
            {"type": "table", "id": "A"},
            {"type": "table", "id": "A"}
        ]}"#;
        let err = Graph::from_json(json).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNode(id) if id == "A"));
    }

    #[test]
    fn test_unowned_field() {
        let json = r#"{"nodes": [{"type": "field", "id": "orphan"}]}"#;
        let err = Graph::from_json(json).unwrap_err();
        assert!(matches!(err, GraphError::UnownedField(_)));

        let json = r#"{"nodes": [{"type": "field", "id": ":x"}]}"#;
        assert!(Graph::from_json(json).is_err());
    }

    #[test]
    fn test_invalid_json() {
        let err = Graph::from_json("{nodes").unwrap_err();
        assert!(err.to_string().starts_with("Invalid graph JSON"));
    }

    #[test]
    fn test_empty_object() {
        let graph = Graph::from_json("{}").unwrap();
        assert!(graph.nodes().is_empty());
        assert!(graph.edges().is_empty());
    }
}
