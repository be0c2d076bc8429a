use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::model::Graph;

/// `start` plus every node reachable by walking edges from target to source.
///
/// Follows every edge in the graph regardless of kind; ids that name no node
/// are still collected so callers can highlight dangling lineage.
pub fn related_upstream(graph: &Graph, start: &str) -> BTreeSet<String> {
    let mut sources_of: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in graph.edges() {
        sources_of
            .entry(edge.target.as_str())
            .or_default()
            .push(edge.source.as_str());
    }

    let mut visited: BTreeSet<String> = BTreeSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    visited.insert(start.to_string());
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let Some(sources) = sources_of.get(current) else {
            continue;
        };
        for &source in sources {
            if visited.insert(source.to_string()) {
                queue.push_back(source);
            }
        }
    }

    visited
}
