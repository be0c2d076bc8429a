//! One lineage view per visualized graph.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::config::LayoutConfig;
use crate::infer::infer_table_edges;
use crate::levels::assign_levels_with;
use crate::lineage::related_upstream;
use crate::model::{Edge, Graph, Position, TableLevel};
use crate::placement::{Canvas, canvas_size, compute_positions};
use crate::validate::{ValidationReport, validate};

/// Everything the painter needs from one full pass over a graph.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPass {
    pub inferred_edges: Vec<Edge>,
    pub levels: Vec<TableLevel>,
    pub positions: IndexMap<String, Position>,
    pub canvas: Canvas,
    pub errors: ValidationReport,
}

impl LayoutPass {
    pub fn compute(graph: &Graph, expanded: &BTreeSet<String>, config: &LayoutConfig) -> Self {
        // Phase 1: Validation
        let errors = validate(graph);

        // Phase 2: Table relationships and levels
        let inferred_edges = infer_table_edges(graph);
        let levels = assign_levels_with(graph, &inferred_edges);

        // Phase 3: Placement
        let positions = compute_positions(graph, &levels, expanded, config);
        let canvas = canvas_size(graph, &levels, expanded, config);

        tracing::debug!(
            nodes = graph.nodes().len(),
            edges = graph.edges().len(),
            inferred = inferred_edges.len(),
            levels = levels.iter().map(|l| l.level).max().map_or(0, |l| l + 1),
            expanded = expanded.len(),
            "layout pass"
        );

        Self {
            inferred_edges,
            levels,
            positions,
            canvas,
            errors,
        }
    }
}

/// Owns a graph together with its expansion and selection state.
///
/// Every state change triggers a full recomputation; nothing is cached across
/// passes except the last result.
#[derive(Debug, Clone)]
pub struct LineageView {
    graph: Graph,
    config: LayoutConfig,
    expanded: BTreeSet<String>,
    selected: Option<String>,
    pass: LayoutPass,
}

impl LineageView {
    pub fn new(graph: Graph, config: LayoutConfig) -> Self {
        let expanded = BTreeSet::new();
        let pass = LayoutPass::compute(&graph, &expanded, &config);
        Self {
            graph,
            config,
            expanded,
            selected: None,
            pass,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn pass(&self) -> &LayoutPass {
        &self.pass
    }

    pub fn expanded(&self) -> &BTreeSet<String> {
        &self.expanded
    }

    pub fn is_expanded(&self, table_id: &str) -> bool {
        self.expanded.contains(table_id)
    }

    /// Flip a table between expanded and collapsed. Unknown ids are ignored
    /// and return `false`.
    pub fn toggle_table(&mut self, table_id: &str) -> bool {
        if self.graph.table(table_id).is_none() {
            return false;
        }
        if !self.expanded.remove(table_id) {
            self.expanded.insert(table_id.to_string());
        }
        self.refresh();
        true
    }

    pub fn expand_all(&mut self) {
        self.expanded = self.graph.tables().map(|t| t.id.clone()).collect();
        self.refresh();
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
        self.refresh();
    }

    /// Replace the graph, keeping expansion for tables that still exist.
    pub fn set_graph(&mut self, graph: Graph) {
        self.expanded.retain(|id| graph.table(id).is_some());
        self.graph = graph;
        self.refresh();
    }

    pub fn set_config(&mut self, config: LayoutConfig) {
        self.config = config;
        self.refresh();
    }

    /// Select a field and return its upstream closure for highlighting.
    pub fn select(&mut self, field_id: &str) -> BTreeSet<String> {
        self.selected = Some(field_id.to_string());
        related_upstream(&self.graph, field_id)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Upstream closure of the current selection, empty when nothing is selected.
    pub fn highlighted(&self) -> BTreeSet<String> {
        self.selected
            .as_deref()
            .map(|id| related_upstream(&self.graph, id))
            .unwrap_or_default()
    }

    fn refresh(&mut self) {
        self.pass = LayoutPass::compute(&self.graph, &self.expanded, &self.config);
    }
}
