//! A flow graph together with the positions of its nodes.

use std::path::Path;

use tracing::{debug, info};

use crate::elements::{to_elements, Element};
use crate::error::FlowError;
use crate::export::{export_image, ExportFormat, ExportOptions};
use crate::graph::FlowGraph;
use crate::layout::{auto_layout, merge_positions, LayoutOptions};
use crate::positions::{Position, PositionStore, Positions};

/// An editable view of a [`FlowGraph`].
///
/// Opening a view loads the saved positions, lays out every node the file
/// does not know yet and keeps the rest where the user left them. Moving a
/// node writes the whole position map back to the store.
#[derive(Debug, Clone)]
pub struct FlowView {
    graph: FlowGraph,
    positions: Positions,
    store: PositionStore,
}

impl FlowView {
    pub fn open(graph: FlowGraph, store: PositionStore) -> Result<Self, FlowError> {
        Self::open_with(graph, store, &LayoutOptions::default())
    }

    pub fn open_with(
        graph: FlowGraph,
        store: PositionStore,
        layout: &LayoutOptions,
    ) -> Result<Self, FlowError> {
        let saved = store.load()?;
        let computed = auto_layout(&graph, layout);
        let positions = merge_positions(&graph, &computed, &saved);
        let restored = graph.nodes().iter().filter(|n| saved.contains_key(&n.id)).count();
        info!(
            nodes = graph.node_count(),
            restored,
            laid_out = graph.node_count() - restored,
            "Flow view opened"
        );
        Ok(Self {
            graph,
            positions,
            store,
        })
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn positions(&self) -> &Positions {
        &self.positions
    }

    pub fn position(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }

    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    /// Move a node and persist every position.
    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), FlowError> {
        if !self.graph.contains(id) {
            return Err(FlowError::UnknownNode(id.to_string()));
        }
        self.positions.insert(id.to_string(), position);
        debug!(node = id, x = position.x, y = position.y, "Node moved");
        self.store.save(&self.positions)
    }

    /// Persist the current positions.
    pub fn save(&self) -> Result<(), FlowError> {
        self.store.save(&self.positions)
    }

    pub fn elements(&self) -> Vec<Element> {
        to_elements(&self.graph, &self.positions)
    }

    pub fn export(&self, path: &Path, options: &ExportOptions) -> Result<ExportFormat, FlowError> {
        export_image(&self.graph, &self.positions, path, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{derive_flow_graph, FlowOptions};
    use disassembly_core::test_utils::*;
    use disassembly_ocel::build_ocel;

    fn graph_of(counts: &[(&str, u32)]) -> FlowGraph {
        let out = simulate_standard(counts);
        let log = build_ocel(&out.events, &out.objects, &out.resources).unwrap();
        derive_flow_graph(&log, &FlowOptions::default()).unwrap()
    }

    #[test]
    fn fresh_view_uses_layout() {
        let dir = tempfile::tempdir().unwrap();
        let graph = graph_of(&[("MD", 1)]);
        let expected = auto_layout(&graph, &LayoutOptions::default());
        let view = FlowView::open(graph, PositionStore::new(dir.path().join("pos.json"))).unwrap();
        assert_eq!(view.positions(), &expected);
        assert!(!view.store().path().exists());
    }

    #[test]
    fn saved_nodes_stay_and_new_nodes_are_placed() {
        let dir = tempfile::tempdir().unwrap();
        let store = PositionStore::new(dir.path().join("pos.json"));
        let mut saved = Positions::new();
        saved.insert("car".to_string(), Position::new(5.0, 5.0));
        saved.insert("d1".to_string(), Position::new(50.0, 5.0));
        store.save(&saved).unwrap();

        // MD introduces md, which the saved file does not know.
        let graph = graph_of(&[("MD", 1)]);
        let computed = auto_layout(&graph, &LayoutOptions::default());
        let view = FlowView::open(graph, store).unwrap();
        assert_eq!(view.position("car"), Some(Position::new(5.0, 5.0)));
        assert_eq!(view.position("d1"), Some(Position::new(50.0, 5.0)));
        assert_eq!(view.position("md"), computed.get("md").copied());
    }

    #[test]
    fn moves_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pos.json");
        let mut view = FlowView::open(graph_of(&[("TD", 1)]), PositionStore::new(&path)).unwrap();
        view.move_node("a6", Position::new(-20.0, 300.0)).unwrap();

        let reopened = FlowView::open(graph_of(&[("TD", 1)]), PositionStore::new(&path)).unwrap();
        assert_eq!(reopened.position("a6"), Some(Position::new(-20.0, 300.0)));
        assert_eq!(reopened.positions(), view.positions());
    }

    #[test]
    fn moving_unknown_node_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = PositionStore::new(dir.path().join("p.json"));
        let mut view = FlowView::open(graph_of(&[("DD", 1)]), store).unwrap();
        assert!(matches!(
            view.move_node("nope", Position::new(0.0, 0.0)),
            Err(FlowError::UnknownNode(ref id)) if id == "nope"
        ));
        assert!(!view.store().path().exists());
    }

    #[test]
    fn elements_carry_view_positions() {
        let dir = tempfile::tempdir().unwrap();
        let store = PositionStore::new(dir.path().join("p.json"));
        let view = FlowView::open(graph_of(&[("DD", 1)]), store).unwrap();
        let elements = view.elements();
        let car = elements.iter().find(|e| e.data.id == "car").unwrap();
        assert_eq!(car.position, view.position("car"));
    }
}
