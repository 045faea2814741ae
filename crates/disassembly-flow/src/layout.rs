//! Automatic layered layout and merging with saved positions.

use std::collections::{HashMap, VecDeque};

use crate::graph::{FlowGraph, NodeKind};
use crate::positions::{Position, Positions};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    /// Horizontal distance between layers.
    pub layer_spacing: f64,
    /// Vertical distance between nodes of one layer.
    pub node_spacing: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            layer_spacing: 160.0,
            node_spacing: 90.0,
        }
    }
}

/// Layer of every non-station node over the directed edges.
///
/// Kahn's algorithm tracking depth: a node's layer is one more than the
/// deepest predecessor. Nodes left on a cycle go to a final catch-all layer.
fn layers(graph: &FlowGraph) -> Vec<Vec<usize>> {
    let index: HashMap<&str, usize> = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();
    let count = graph.node_count();
    let mut in_degree = vec![0usize; count];
    let mut depth = vec![0usize; count];
    let mut outputs: Vec<Vec<usize>> = vec![Vec::new(); count];
    for edge in graph.edges().iter().filter(|e| e.is_directed()) {
        let source = index.get(edge.source.as_str());
        let target = index.get(edge.target.as_str());
        if let (Some(&from), Some(&to)) = (source, target) {
            outputs[from].push(to);
            in_degree[to] += 1;
        }
    }

    let is_station = |i: usize| graph.nodes()[i].kind == NodeKind::Station;
    let mut queue: VecDeque<usize> = (0..count)
        .filter(|&i| in_degree[i] == 0 && !is_station(i))
        .collect();
    let mut placed = vec![false; count];
    let mut max_depth = 0;
    while let Some(node) = queue.pop_front() {
        placed[node] = true;
        max_depth = max_depth.max(depth[node]);
        for &dest in &outputs[node] {
            depth[dest] = depth[dest].max(depth[node] + 1);
            in_degree[dest] -= 1;
            if in_degree[dest] == 0 {
                queue.push_back(dest);
            }
        }
    }

    let mut levels: Vec<Vec<usize>> = vec![Vec::new(); max_depth + 1];
    let mut cyclic = Vec::new();
    for i in (0..count).filter(|&i| !is_station(i)) {
        if placed[i] {
            levels[depth[i]].push(i);
        } else {
            cyclic.push(i);
        }
    }
    if !cyclic.is_empty() {
        levels.push(cyclic);
    }
    levels
}

/// Place every node of `graph`.
///
/// Object states and event types are laid out left to right by layer, top
/// to bottom in node order. A workstation sits above the layer of the first
/// event type it runs, stacked upwards when several share a layer.
pub fn auto_layout(graph: &FlowGraph, options: &LayoutOptions) -> Positions {
    let mut positions = Positions::new();
    let mut layer_of: HashMap<&str, usize> = HashMap::new();

    for (layer, nodes) in layers(graph).iter().enumerate() {
        for (row, &i) in nodes.iter().enumerate() {
            let node = &graph.nodes()[i];
            layer_of.insert(node.id.as_str(), layer);
            positions.insert(
                node.id.clone(),
                Position::new(
                    layer as f64 * options.layer_spacing,
                    row as f64 * options.node_spacing,
                ),
            );
        }
    }

    let mut stacked: HashMap<usize, usize> = HashMap::new();
    for node in graph.nodes().iter().filter(|n| n.kind == NodeKind::Station) {
        let layer = graph
            .nodes()
            .iter()
            .filter(|n| matches!(&n.kind, NodeKind::Event { station } if *station == node.id))
            .filter_map(|n| layer_of.get(n.id.as_str()).copied())
            .min()
            .unwrap_or(0);
        let height = stacked.entry(layer).or_insert(0);
        *height += 1;
        positions.insert(
            node.id.clone(),
            Position::new(
                layer as f64 * options.layer_spacing,
                -(*height as f64) * options.node_spacing,
            ),
        );
    }
    positions
}

/// Positions of every node of `graph`: the saved one if present, otherwise
/// the computed one. Saved entries for nodes not in the graph are dropped.
pub fn merge_positions(graph: &FlowGraph, computed: &Positions, saved: &Positions) -> Positions {
    graph
        .nodes()
        .iter()
        .filter_map(|node| {
            saved
                .get(&node.id)
                .or_else(|| computed.get(&node.id))
                .map(|p| (node.id.clone(), *p))
        })
        .collect()
}
