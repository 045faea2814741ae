//! Disassembly Flow -- the material-flow graph of an event log.
//!
//! [`graph::derive_flow_graph`] turns an OCEL document into object-state,
//! event-type and workstation nodes joined by counted edges.
//! [`view::FlowView`] pairs a graph with node positions: saved positions win,
//! new nodes take the automatic layered layout, and every move is persisted.
//! Views render to Cytoscape elements, SVG, PNG and JPG.

pub mod elements;
pub mod error;
pub mod export;
pub mod graph;
pub mod layout;
pub mod positions;
pub mod view;

pub use error::FlowError;
pub use graph::{derive_flow_graph, FlowGraph, FlowOptions};
pub use view::FlowView;
