pub mod config;
pub mod infer;
pub mod input;
pub mod levels;
pub mod lineage;
pub mod model;
pub mod placement;
pub mod reference;
pub mod validate;
pub mod view;

#[cfg(test)]
mod testutil;

use std::collections::BTreeSet;
use wasm_bindgen::prelude::*;

pub use config::LayoutConfig;
pub use infer::infer_table_edges;
pub use input::GraphError;
pub use levels::{assign_levels, assign_levels_with};
pub use lineage::related_upstream;
pub use model::{Edge, EdgeKind, FieldNode, Graph, Node, Position, TableLevel, TableNode};
pub use placement::{Canvas, canvas_size, compute_positions, effective_height};
pub use validate::{Discrepancy, ValidationReport, validate};
pub use view::{LayoutPass, LineageView};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn parse_config(config: Option<String>) -> Result<LayoutConfig, String> {
    match config.as_deref() {
        Some(json) if !json.trim().is_empty() => {
            LayoutConfig::from_json(json).map_err(|e| e.to_string())
        }
        _ => Ok(LayoutConfig::default()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

/// Run a full pass and return the `LayoutPass` as JSON
#[wasm_bindgen(js_name = "layoutGraph")]
pub fn layout_graph(
    graph: &str,
    expanded: Option<js_sys::Array>,
    config: Option<String>,
) -> Result<String, String> {
    let graph = Graph::from_json(graph).map_err(|e| e.to_string())?;
    let config = parse_config(config)?;
    let expanded: BTreeSet<String> = expanded
        .map(|ids| ids.iter().filter_map(|v| v.as_string()).collect())
        .unwrap_or_default();

    to_json(&LayoutPass::compute(&graph, &expanded, &config))
}

#[wasm_bindgen(js_name = "inferTableEdges")]
pub fn infer_table_edges_json(graph: &str) -> Result<String, String> {
    let graph = Graph::from_json(graph).map_err(|e| e.to_string())?;
    to_json(&infer_table_edges(&graph))
}

#[wasm_bindgen(js_name = "assignLevels")]
pub fn assign_levels_json(graph: &str) -> Result<String, String> {
    let graph = Graph::from_json(graph).map_err(|e| e.to_string())?;
    to_json(&assign_levels(&graph))
}

#[wasm_bindgen(js_name = "validateGraph")]
pub fn validate_graph(graph: &str) -> Result<String, String> {
    let graph = Graph::from_json(graph).map_err(|e| e.to_string())?;
    to_json(&validate(&graph))
}

/// Ids to highlight when `field_id` is hovered or selected
#[wasm_bindgen(js_name = "relatedUpstream")]
pub fn related_upstream_ids(graph: &str, field_id: &str) -> Result<js_sys::Array, String> {
    let graph = Graph::from_json(graph).map_err(|e| e.to_string())?;
    Ok(related_upstream(&graph, field_id)
        .into_iter()
        .map(JsValue::from)
        .collect())
}

/// Replace field references in `text` with display names
#[wasm_bindgen(js_name = "substituteNames")]
pub fn substitute_names(graph: &str, text: &str) -> Result<String, String> {
    let graph = Graph::from_json(graph).map_err(|e| e.to_string())?;
    Ok(reference::substitute_names(&graph, text))
}
