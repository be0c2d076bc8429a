//! Table-to-table relationships derived from field lineage.

use std::collections::HashSet;

use crate::model::{Edge, EdgeKind, Graph};

/// Infer deduplicated table edges from field edges crossing table boundaries.
///
/// Table edges supplied with the graph are merged in as they are met. Pairs
/// are emitted once, in order of first occurrence. Edges whose endpoints do
/// not resolve to an existing table (directly, or as a field's owner) are
/// skipped.
pub fn infer_table_edges(graph: &Graph) -> Vec<Edge> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut inferred = Vec::new();

    for edge in graph.edges() {
        let endpoints = match edge.kind {
            EdgeKind::Field => (graph.owning_table(&edge.source), graph.owning_table(&edge.target)),
            EdgeKind::Table => (graph.table(&edge.source), graph.table(&edge.target)),
        };
        let (Some(source), Some(target)) = endpoints else {
            tracing::trace!(edge = %edge.id, "skipping edge with unresolved endpoint");
            continue;
        };

        if source.id == target.id {
            continue;
        }

        if seen.insert((source.id.as_str(), target.id.as_str())) {
            inferred.push(Edge::table(&source.id, &target.id));
        }
    }

    inferred
}
