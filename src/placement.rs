//! Table and field placement.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::config::LayoutConfig;
use crate::model::{FieldNode, Graph, Position, TableLevel};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

/// Height of a table box, including its field rows when expanded.
pub fn effective_height(config: &LayoutConfig, field_count: usize, expanded: bool) -> f64 {
    if expanded {
        config.table_height + field_count as f64 * config.field_stride()
    } else {
        config.table_height
    }
}

/// Tables grouped by level with their effective heights.
struct LevelPlan<'a> {
    groups: BTreeMap<u32, Vec<&'a str>>,
    heights: HashMap<&'a str, f64>,
    fields_by_table: HashMap<&'a str, Vec<&'a FieldNode>>,
    max_extent: f64,
}

impl<'a> LevelPlan<'a> {
    fn new(
        graph: &'a Graph,
        levels: &'a [TableLevel],
        expanded: &BTreeSet<String>,
        config: &LayoutConfig,
    ) -> Self {
        let mut fields_by_table: HashMap<&str, Vec<&FieldNode>> = HashMap::new();
        for field in graph.fields() {
            fields_by_table
                .entry(field.table_id.as_str())
                .or_default()
                .push(field);
        }

        let mut groups: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
        let mut heights: HashMap<&str, f64> = HashMap::new();
        for record in levels {
            let id = record.table_id.as_str();
            if graph.table(id).is_none() || heights.contains_key(id) {
                continue;
            }
            let field_count = fields_by_table.get(id).map_or(0, Vec::len);
            heights.insert(id, effective_height(config, field_count, expanded.contains(id)));
            groups.entry(record.level).or_default().push(id);
        }

        let max_extent = groups
            .values()
            .map(|tables| level_extent(tables, &heights, config))
            .fold(0.0, f64::max);

        Self {
            groups,
            heights,
            fields_by_table,
            max_extent,
        }
    }
}

fn level_extent(tables: &[&str], heights: &HashMap<&str, f64>, config: &LayoutConfig) -> f64 {
    tables
        .iter()
        .map(|t| heights[t] + config.vertical_padding)
        .sum()
}

/// Compute a position for every node of `graph`.
///
/// Levels are laid out left to right and centered vertically against the
/// tallest level. The first table of a level is pulled toward its already
/// placed upstream fields; the rest stack below it. Nodes that are never
/// placed (tables missing from `levels`, fields without a known table) stay
/// at the origin.
pub fn compute_positions(
    graph: &Graph,
    levels: &[TableLevel],
    expanded: &BTreeSet<String>,
    config: &LayoutConfig,
) -> IndexMap<String, Position> {
    let plan = LevelPlan::new(graph, levels, expanded, config);

    // Table id -> source fields of edges landing on its fields, in edge order.
    let mut incoming: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in graph.field_edges() {
        if let Some(target) = graph.field(&edge.target) {
            incoming
                .entry(target.table_id.as_str())
                .or_default()
                .push(edge.source.as_str());
        }
    }

    let mut placed: HashMap<&str, Position> = HashMap::new();

    for (&level, tables) in &plan.groups {
        let x = level as f64 * config.level_stride();
        let mut cursor = (plan.max_extent - level_extent(tables, &plan.heights, config)) / 2.0;

        for (i, &table_id) in tables.iter().enumerate() {
            let y = if i == 0 {
                let sources = incoming.get(table_id).map_or(&[][..], Vec::as_slice);
                anchored_y(graph, sources, &placed).unwrap_or(cursor)
            } else {
                cursor
            };
            placed.insert(table_id, Position::new(x, y));

            let is_expanded = expanded.contains(table_id);
            let fields = plan.fields_by_table.get(table_id).map_or(&[][..], Vec::as_slice);
            for (row, field) in fields.iter().enumerate() {
                let field_y = if is_expanded {
                    y + config.table_height + row as f64 * config.field_stride()
                } else {
                    y
                };
                placed
                    .entry(field.id.as_str())
                    .or_insert(Position::new(x, field_y));
            }

            cursor = y + plan.heights[table_id] + config.vertical_padding;
        }
    }

    graph
        .nodes()
        .iter()
        .map(|node| {
            let id = node.id();
            (id.to_string(), placed.get(id).copied().unwrap_or_default())
        })
        .collect()
}

/// Y that lines a table up with its placed upstream fields.
///
/// A single upstream table anchors at its topmost source; several upstream
/// tables anchor at the mean. `None` when no source field is placed yet.
fn anchored_y(graph: &Graph, sources: &[&str], placed: &HashMap<&str, Position>) -> Option<f64> {
    let sources: IndexSet<&str> = sources
        .iter()
        .copied()
        .filter(|s| placed.contains_key(s))
        .collect();

    let mut upstream_tables = HashSet::new();
    let mut ys = Vec::with_capacity(sources.len());
    for source in &sources {
        let Some(field) = graph.field(source) else {
            continue;
        };
        upstream_tables.insert(field.table_id.as_str());
        ys.push(placed[source].y);
    }

    if ys.is_empty() {
        return None;
    }

    if upstream_tables.len() == 1 {
        Some(ys.iter().copied().fold(f64::INFINITY, f64::min))
    } else {
        Some(ys.iter().sum::<f64>() / ys.len() as f64)
    }
}

/// Overall diagram extent for the given levels and expansion state.
pub fn canvas_size(
    graph: &Graph,
    levels: &[TableLevel],
    expanded: &BTreeSet<String>,
    config: &LayoutConfig,
) -> Canvas {
    let plan = LevelPlan::new(graph, levels, expanded, config);
    let Some(&max_level) = plan.groups.keys().next_back() else {
        return Canvas::default();
    };

    Canvas {
        width: (max_level + 1) as f64 * config.level_stride() - config.level_padding,
        height: plan.max_extent,
    }
}
