//! Lineage graph data model: tables, fields and the edges between them.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableNode {
    pub id: String,
    pub name: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNode {
    pub id: String,
    pub name: String,
    /// Id of the owning table. Ownership is by back-reference only.
    pub table_id: String,
    pub transformation: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Table(TableNode),
    Field(FieldNode),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Table(t) => &t.id,
            Node::Field(f) => &f.id,
        }
    }

    pub fn as_table(&self) -> Option<&TableNode> {
        match self {
            Node::Table(t) => Some(t),
            Node::Field(_) => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldNode> {
        match self {
            Node::Field(f) => Some(f),
            Node::Table(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Explicit, user-supplied field-to-field lineage.
    Field,
    /// Table-to-table relationship synthesized by inference.
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn field(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind: EdgeKind::Field,
        }
    }

    pub fn table(source: &str, target: &str) -> Self {
        Self {
            id: format!("{source}->{target}"),
            source: source.to_string(),
            target: target.to_string(),
            kind: EdgeKind::Table,
        }
    }
}

/// Level assigned to a table, with the tables it feeds into directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableLevel {
    pub table_id: String,
    pub level: u32,
    pub feeds_into: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An immutable snapshot of a lineage graph.
///
/// Node order is preserved and drives every ordering decision downstream.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<String, usize>,
}

impl Graph {
    /// Build a graph. When ids collide, lookups resolve to the first node.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            index.entry(node.id().to_string()).or_insert(i);
        }
        Self { nodes, edges, index }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn table(&self, id: &str) -> Option<&TableNode> {
        self.node(id).and_then(Node::as_table)
    }

    pub fn field(&self, id: &str) -> Option<&FieldNode> {
        self.node(id).and_then(Node::as_field)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableNode> {
        self.nodes.iter().filter_map(Node::as_table)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldNode> {
        self.nodes.iter().filter_map(Node::as_field)
    }

    /// Owning table of a field, if both the field and its table exist.
    pub fn owning_table(&self, field_id: &str) -> Option<&TableNode> {
        self.field(field_id).and_then(|f| self.table(&f.table_id))
    }

    pub fn field_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| e.kind == EdgeKind::Field)
    }
}

impl TableNode {
    pub fn sql_block(&self) -> Option<&str> {
        self.note.as_deref().and_then(fenced_block)
    }
}

impl FieldNode {
    pub fn sql_block(&self) -> Option<&str> {
        self.note.as_deref().and_then(fenced_block)
    }
}

/// Body of the first fenced block in a note, without the fence lines.
fn fenced_block(note: &str) -> Option<&str> {
    let open = note.find("```")?;
    let after_fence = &note[open + 3..];
    // Skip the info string (e.g. "sql") up to the end of the fence line.
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim_end_matches(['\n', '\r']))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(id: &str) -> Node {
        Node::Table(TableNode {
            id: id.into(),
            name: id.into(),
            note: None,
        })
    }

    fn field(id: &str, table_id: &str) -> Node {
        Node::Field(FieldNode {
            id: id.into(),
            name: id.into(),
            table_id: table_id.into(),
            transformation: None,
            note: None,
        })
    }

    #[test]
    fn test_lookup_helpers() {
        let graph = Graph::new(
            vec![table("A"), field("A:A1", "A"), field("A:A2", "A"), table("B"), field("B:B1", "B")],
            vec![Edge::field("e1", "A:A1", "B:B1")],
        );

        assert_eq!(graph.tables().count(), 2);
        assert_eq!(graph.fields().count(), 3);
        assert_eq!(graph.owning_table("B:B1").map(|t| t.id.as_str()), Some("B"));
        assert!(graph.field("A").is_none());
        assert!(graph.table("A").is_some());
        assert_eq!(graph.field_edges().count(), 1);
    }

    #[test]
    fn test_first_duplicate_wins() {
        let graph = Graph::new(vec![table("A"), field("A", "X")], vec![]);
        assert!(graph.table("A").is_some());
        assert!(graph.field("A").is_none());
    }

    #[test]
    fn test_owning_table_unresolved() {
        let graph = Graph::new(vec![field("Z:Z1", "Z")], vec![]);
        assert!(graph.owning_table("Z:Z1").is_none());
        assert!(graph.owning_table("missing").is_none());
    }

    #[test]
    fn test_sql_block() {
        let t = TableNode {
            id: "A".into(),
            name: "A".into(),
            note: Some("Loaded nightly.\n```sql\nSELECT id\nFROM orders\n```\ntrailing".into()),
        };
        assert_eq!(t.sql_block(), Some("SELECT id\nFROM orders"));

        let plain = TableNode {
            note: Some("no code here".into()),
            ..t
        };
        assert_eq!(plain.sql_block(), None);
    }
}
