//! Graph builders shared by unit tests.

use crate::model::{Edge, FieldNode, Graph, Node, TableNode};

/// Tables by id, fields as `(id, table_id)`, field edges as `(source, target)`.
pub(crate) fn graph(tables: &[&str], fields: &[(&str, &str)], edges: &[(&str, &str)]) -> Graph {
    let mut nodes: Vec<Node> = tables
        .iter()
        .map(|t| {
            Node::Table(TableNode {
                id: t.to_string(),
                name: t.to_string(),
                note: None,
            })
        })
        .collect();
    nodes.extend(fields.iter().map(|(id, table)| {
        Node::Field(FieldNode {
            id: id.to_string(),
            name: id.to_string(),
            table_id: table.to_string(),
            transformation: None,
            note: None,
        })
    }));
    let edges = edges
        .iter()
        .enumerate()
        .map(|(i, (s, t))| Edge::field(format!("e{i}"), *s, *t))
        .collect();
    Graph::new(nodes, edges)
}

/// One field `X:X1` per table `X`, with edges between those fields.
pub(crate) fn chain(tables: &[&str], table_edges: &[(&str, &str)]) -> Graph {
    let field_ids: Vec<String> = tables.iter().map(|t| format!("{t}:{t}1")).collect();
    let fields: Vec<(&str, &str)> = field_ids
        .iter()
        .zip(tables)
        .map(|(f, t)| (f.as_str(), *t))
        .collect();
    let edge_ids: Vec<(String, String)> = table_edges
        .iter()
        .map(|(s, t)| (format!("{s}:{s}1"), format!("{t}:{t}1")))
        .collect();
    let edges: Vec<(&str, &str)> = edge_ids
        .iter()
        .map(|(s, t)| (s.as_str(), t.as_str()))
        .collect();
    graph(tables, &fields, &edges)
}
