//! Horizontal level assignment for tables.
//!
//! Tables with no relationships form level 0. Connected tables are peeled off in
//! rounds, sinks first: a table is settled once every table it feeds into is
//! settled. A round that settles nothing means a cycle, and every remaining
//! table is forced into that round. Rounds are then reversed so origin tables
//! sit left of the tables they feed.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::infer::infer_table_edges;
use crate::model::{Edge, Graph, TableLevel};

/// Assign a level to every table of `graph`, ordered by ascending level.
pub fn assign_levels(graph: &Graph) -> Vec<TableLevel> {
    let inferred = infer_table_edges(graph);
    assign_levels_with(graph, &inferred)
}

/// Same as [`assign_levels`], over already inferred table edges.
///
/// Edges naming tables that are not in `graph` are ignored. Within a level,
/// tables keep their node order.
pub fn assign_levels_with(graph: &Graph, inferred: &[Edge]) -> Vec<TableLevel> {
    let mut feeds_into: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    let mut connected: HashSet<&str> = HashSet::new();

    for edge in inferred {
        if graph.table(&edge.source).is_none() || graph.table(&edge.target).is_none() {
            continue;
        }
        feeds_into
            .entry(edge.source.as_str())
            .or_default()
            .insert(edge.target.as_str());
        connected.insert(edge.source.as_str());
        connected.insert(edge.target.as_str());
    }

    let mut seen = HashSet::new();
    let table_ids: Vec<&str> = graph
        .tables()
        .map(|t| t.id.as_str())
        .filter(|id| seen.insert(*id))
        .collect();

    let mut pending: Vec<&str> = table_ids
        .iter()
        .copied()
        .filter(|id| connected.contains(id))
        .collect();
    let mut round_of: HashMap<&str, u32> = HashMap::new();
    let mut round = 0;

    while !pending.is_empty() {
        round += 1;

        let (ready, blocked): (Vec<&str>, Vec<&str>) = pending.into_iter().partition(|id| {
            feeds_into
                .get(id)
                .is_none_or(|targets| targets.iter().all(|t| round_of.contains_key(t)))
        });

        if ready.is_empty() {
            tracing::debug!(
                round,
                forced = blocked.len(),
                "dependency cycle, forcing remaining tables into one round"
            );
            for id in blocked {
                round_of.insert(id, round);
            }
            break;
        }

        for id in ready {
            round_of.insert(id, round);
        }
        pending = blocked;
    }

    let max_round = round;
    let mut levels: Vec<TableLevel> = table_ids
        .iter()
        .map(|&id| TableLevel {
            table_id: id.to_string(),
            level: round_of.get(id).map_or(0, |r| max_round - r + 1),
            feeds_into: feeds_into
                .get(id)
                .map(|targets| targets.iter().map(|t| t.to_string()).collect())
                .unwrap_or_default(),
        })
        .collect();

    levels.sort_by_key(|l| l.level);
    levels
}
