//! Cytoscape element list for an interactive front-end.
//!
//! Each node and edge becomes one `{data, classes, position}` element. The
//! class names drive the stylesheet: `object-node group-{group}`,
//! `station-node`, `event-node station-{station}`, `edge-component-event`
//! and `edge-station-event`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::FlowError;
use crate::graph::{EdgeKind, FlowGraph, NodeKind};
use crate::positions::{Position, Positions};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementData {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Workstation of an event node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u64>,
    /// `yes` for directed edges, `no` for workstation edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrow: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub data: ElementData,
    pub classes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Element {
    pub fn is_edge(&self) -> bool {
        self.data.source.is_some()
    }
}

/// Nodes first, then edges. Nodes get their entry from `positions`, if any.
pub fn to_elements(graph: &FlowGraph, positions: &Positions) -> Vec<Element> {
    let nodes = graph.nodes().iter().map(|node| {
        let (group, classes) = match &node.kind {
            NodeKind::State { group, .. } => {
                (None, format!("object-node group-{}", group.as_str()))
            }
            NodeKind::Station => (None, "station-node".to_string()),
            NodeKind::Event { station } => {
                (Some(station.clone()), format!("event-node station-{station}"))
            }
        };
        Element {
            data: ElementData {
                id: node.id.clone(),
                label: Some(node.label.clone()),
                group,
                ..Default::default()
            },
            classes,
            position: positions.get(&node.id).copied(),
        }
    });
    let edges = graph.edges().iter().map(|edge| {
        let classes = match edge.kind {
            EdgeKind::Input | EdgeKind::Output => "edge-component-event",
            EdgeKind::Station => "edge-station-event",
        };
        Element {
            data: ElementData {
                id: edge.id.clone(),
                source: Some(edge.source.clone()),
                target: Some(edge.target.clone()),
                weight: Some(edge.count),
                arrow: Some(if edge.is_directed() { "yes" } else { "no" }.to_string()),
                ..Default::default()
            },
            classes: classes.to_string(),
            position: None,
        }
    });
    nodes.chain(edges).collect()
}

/// Positions carried by node elements, e.g. after the user dragged them.
pub fn positions_from_elements(elements: &[Element]) -> Positions {
    elements
        .iter()
        .filter_map(|e| e.position.map(|p| (e.data.id.clone(), p)))
        .collect()
}

/// Write `elements` as pretty-printed JSON.
pub fn write_elements(elements: &[Element], path: &Path) -> Result<(), FlowError> {
    let io_err = |source| FlowError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(elements).map_err(|source| FlowError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(io_err)?;
    info!(path = %path.display(), elements = elements.len(), "Flow elements written");
    Ok(())
}
