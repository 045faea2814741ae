//! Derivation of the flow graph from an event log.
//!
//! Nodes come in three kinds: object states (one per component type, or per
//! type and condition), event types (tagged with the workstation they run
//! at) and workstation types. Edges are accumulated per event relationship
//! and carry the number of occurrences. Every list keeps first-seen order,
//! so deriving twice from the same log yields identical graphs.

use std::collections::{HashMap, HashSet};

use disassembly_core::catalog::ROOT_COMPONENT_TYPE;
use disassembly_ocel::builder::ATTR_CONDITION;
use disassembly_ocel::model::*;
use tracing::info;

use crate::error::FlowError;

// ===========================================================================
// Nodes and edges
// ===========================================================================

/// Visual class of an object-state node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateGroup {
    /// The whole car.
    Product,
    /// An assembly still holding parts (type starts with `a`).
    Subassembly,
    /// A single part.
    Component,
}

impl StateGroup {
    pub fn classify(object_type: &str) -> Self {
        if object_type == ROOT_COMPONENT_TYPE {
            StateGroup::Product
        } else if object_type.starts_with('a') {
            StateGroup::Subassembly
        } else {
            StateGroup::Component
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StateGroup::Product => "product",
            StateGroup::Subassembly => "subassembly",
            StateGroup::Component => "component",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    State {
        object_type: String,
        condition: Option<String>,
        group: StateGroup,
    },
    Event {
        /// Workstation type the event type runs at.
        station: String,
    },
    Station,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::State { .. } => "state",
            NodeKind::Event { .. } => "event",
            NodeKind::Station => "station",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
}

impl FlowNode {
    pub fn is_state(&self) -> bool {
        matches!(self.kind, NodeKind::State { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// State consumed by an event (`Input component`).
    Input,
    /// State produced by an event (`Output component`).
    Output,
    /// Workstation running an event (`Station`), undirected.
    Station,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub count: u64,
}

impl FlowEdge {
    pub fn is_directed(&self) -> bool {
        self.kind != EdgeKind::Station
    }
}

/// A state change through one event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: String,
    pub event_type: String,
    pub to: String,
    pub count: u64,
}

/// Derivation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowOptions {
    /// Key object states by `type|condition` instead of `type`.
    pub split_by_condition: bool,
}

// ===========================================================================
// FlowGraph
// ===========================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
    node_index: HashMap<String, usize>,
    edges: Vec<FlowEdge>,
    transitions: Vec<Transition>,
}

impl FlowGraph {
    /// Nodes in order: object states, workstations, event types.
    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    /// Edges in order: input edges, output edges, workstation edges.
    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&FlowEdge> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.target == target)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Add a node unless one with the same id exists. An existing node of a
    /// different kind is an error; the first node of the same kind wins.
    fn add_node(&mut self, id: String, label: String, kind: NodeKind) -> Result<(), FlowError> {
        if let Some(&i) = self.node_index.get(&id) {
            let existing = self.nodes[i].kind.as_str();
            if existing != kind.as_str() {
                return Err(FlowError::DuplicateNode {
                    id,
                    existing,
                    added: kind.as_str(),
                });
            }
            return Ok(());
        }
        self.node_index.insert(id.clone(), self.nodes.len());
        self.nodes.push(FlowNode { id, label, kind });
        Ok(())
    }
}

/// Counts occurrences per key while keeping first-seen order.
#[derive(Default)]
struct Tally<K> {
    index: HashMap<K, usize>,
    counts: Vec<(K, u64)>,
}

impl<K: Clone + Eq + std::hash::Hash> Tally<K> {
    fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(key.clone(), self.counts.len());
                self.counts.push((key, 1));
            }
        }
    }
}

fn state_id(object: &OcelObject, options: &FlowOptions) -> String {
    let condition = object.attribute(ATTR_CONDITION).and_then(AttributeValue::as_str);
    match condition {
        Some(condition) if options.split_by_condition => {
            format!("{}|{condition}", object.object_type)
        }
        _ => object.object_type.clone(),
    }
}

fn state_node(object: &OcelObject, options: &FlowOptions) -> (String, String, NodeKind) {
    let id = state_id(object, options);
    let condition = object
        .attribute(ATTR_CONDITION)
        .and_then(AttributeValue::as_str)
        .filter(|_| options.split_by_condition)
        .map(str::to_string);
    let label = match &condition {
        Some(c) => format!("{} ({c})", object.object_type),
        None => object.object_type.clone(),
    };
    let kind = NodeKind::State {
        object_type: object.object_type.clone(),
        condition,
        group: StateGroup::classify(&object.object_type),
    };
    (id, label, kind)
}

/// Derive the flow graph of `log`.
///
/// Object types that declare no attributes are workstations. Every event
/// must relate to exactly one workstation; an event type is tagged with the
/// workstation of its first occurrence.
pub fn derive_flow_graph(log: &OcelLog, options: &FlowOptions) -> Result<FlowGraph, FlowError> {
    let station_types: HashSet<&str> = log
        .object_types
        .iter()
        .filter(|t| t.attributes.is_empty())
        .map(|t| t.name.as_str())
        .collect();
    let objects: HashMap<&str, &OcelObject> =
        log.objects.iter().map(|o| (o.id.as_str(), o)).collect();
    let mut graph = FlowGraph::default();

    for object in &log.objects {
        if !station_types.contains(object.object_type.as_str()) {
            let (id, label, kind) = state_node(object, options);
            graph.add_node(id, label, kind)?;
        }
    }
    for object_type in &log.object_types {
        if station_types.contains(object_type.name.as_str()) {
            graph.add_node(
                object_type.name.clone(),
                object_type.name.clone(),
                NodeKind::Station,
            )?;
        }
    }

    let mut inputs: Tally<(String, String)> = Tally::default();
    let mut outputs: Tally<(String, String)> = Tally::default();
    let mut stations: Tally<(String, String)> = Tally::default();
    let mut transitions: Tally<(String, String, String)> = Tally::default();

    for event in &log.events {
        let lookup = |id: &str| {
            objects
                .get(id)
                .copied()
                .ok_or_else(|| FlowError::UnknownObject {
                    event: event.id.clone(),
                    object: id.to_string(),
                })
        };
        let station_id = event
            .related(STATION)
            .next()
            .ok_or_else(|| FlowError::MissingStation {
                event: event.id.clone(),
            })?;
        let station = lookup(station_id)?.object_type.clone();
        graph.add_node(
            event.event_type.clone(),
            event.event_type.clone(),
            NodeKind::Event {
                station: station.clone(),
            },
        )?;
        stations.add((station, event.event_type.clone()));

        let mut from_states = Vec::new();
        for id in event.related(INPUT_COMPONENT) {
            let state = state_id(lookup(id)?, options);
            inputs.add((state.clone(), event.event_type.clone()));
            from_states.push(state);
        }
        for id in event.related(OUTPUT_COMPONENT) {
            let state = state_id(lookup(id)?, options);
            outputs.add((event.event_type.clone(), state.clone()));
            for from in &from_states {
                transitions.add((from.clone(), event.event_type.clone(), state.clone()));
            }
        }
    }

    let tallies = [
        (inputs, EdgeKind::Input),
        (outputs, EdgeKind::Output),
        (stations, EdgeKind::Station),
    ];
    for (tally, kind) in tallies {
        graph
            .edges
            .extend(tally.counts.into_iter().map(|((source, target), count)| FlowEdge {
                id: format!("{source}-{target}"),
                source,
                target,
                kind,
                count,
            }));
    }
    graph.transitions = transitions
        .counts
        .into_iter()
        .map(|((from, event_type, to), count)| Transition {
            from,
            event_type,
            to,
            count,
        })
        .collect();

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        transitions = graph.transitions.len(),
        "Flow graph derived"
    );
    Ok(graph)
}
