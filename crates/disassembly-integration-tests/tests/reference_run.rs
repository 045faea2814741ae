//! The 120-car reference run through every stage.
//!
//! 70 target-disassembly, 30 motor-damage and 20 damper-damage cars of model
//! `A`, starting 2023-12-22 07:00 UTC.

use std::collections::HashSet;

use chrono::Duration;
use disassembly_core::simulator::{ScenarioPlan, SimulationOutput, Simulator};
use disassembly_core::test_utils::*;
use disassembly_data::{load_catalog, standard_data_dir};
use disassembly_flow::layout::{auto_layout, LayoutOptions};
use disassembly_flow::positions::{Position, PositionStore};
use disassembly_flow::{derive_flow_graph, FlowOptions, FlowView};
use disassembly_ocel::*;

fn reference_log(out: &SimulationOutput) -> OcelLog {
    build_ocel(&out.events, &out.objects, &out.resources).unwrap()
}

// -----------------------------------------------------------------------
// Simulation
// -----------------------------------------------------------------------

#[test]
fn one_car_root_per_car() {
    let out = simulate_reference();
    let roots: Vec<&str> = out.objects.roots().map(|o| o.id.as_str()).collect();
    assert_eq!(roots.len(), 120);
    assert_eq!(roots.iter().collect::<HashSet<_>>().len(), 120);
    assert!(out.objects.roots().all(|o| o.object_type == "car"));
}

#[test]
fn event_totals() {
    let out = simulate_reference();
    assert_eq!(out.events.len(), 70 * 11 + 30 * 4 + 20 * 4);
    let pairs: HashSet<(u32, &str)> = out
        .events
        .iter()
        .map(|e| (e.lot, e.event_type.as_str()))
        .collect();
    assert_eq!(pairs.len(), out.events.len());
}

#[test]
fn first_target_car_runs_d1_to_d11_back_to_back() {
    let out = simulate_reference();
    let car: Vec<_> = out.events.iter().filter(|e| e.lot == 1).collect();
    let types: Vec<&str> = car.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(
        types,
        ["d1", "d2", "d3", "d4", "d5", "d6", "d7", "d8", "d9", "d10", "d11"]
    );
    assert_eq!(car[0].start_time, reference_start());
    assert_eq!(car[0].end_time - car[0].start_time, Duration::minutes(180));
    assert_eq!(car[6].end_time - car[6].start_time, Duration::minutes(70));
    for pair in car.windows(2) {
        assert_eq!(pair[0].end_time, pair[1].start_time);
    }
    assert_eq!(car[0].input_component, "car_1");
    assert_eq!(car[0].output_components, ["sp_1", "a1_1"]);
    assert_eq!(car[0].resource, "ws1_1");
}

#[test]
fn last_car_is_damper_damaged() {
    let out = simulate_reference();
    let last = out.events.last().unwrap();
    assert_eq!(last.lot, 120);
    assert_eq!(last.event_type, "d5");
    assert_eq!(last.id, format!("e{}", out.events.len()));
    let dd = out.objects.iter().find(|o| o.id == "dd_120").unwrap();
    assert_eq!(dd.parent.as_deref(), Some("a8_120"));
    assert_eq!(dd.condition, "DD");
}

#[test]
fn data_catalog_matches_builtin_catalog() {
    let catalog = load_catalog(&standard_data_dir()).unwrap().build().unwrap();
    let plan =
        ScenarioPlan::from_names(&catalog, "A", &[("TD", 70), ("MD", 30), ("DD", 20)]).unwrap();
    let from_data = Simulator::new(&catalog).simulate(&plan, reference_start()).unwrap();
    assert_eq!(from_data, simulate_reference());
}

// -----------------------------------------------------------------------
// Event log
// -----------------------------------------------------------------------

#[test]
fn log_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ocel.json");
    let out = simulate_reference();
    let log = reference_log(&out);
    write_ocel(&log, &path).unwrap();

    let read = read_ocel(&path).unwrap();
    assert_eq!(read, log);
    let tables = extract_tables(&read).unwrap();
    assert_eq!(tables.events, out.events);
    assert_eq!(tables.objects, out.objects);
    assert_eq!(tables.resources, out.resources);
}

#[test]
fn log_declares_five_workstations() {
    let log = reference_log(&simulate_reference());
    let stations: Vec<&str> = log
        .objects
        .iter()
        .filter(|o| o.object_type.starts_with("ws"))
        .map(|o| o.id.as_str())
        .collect();
    assert_eq!(stations, ["ws1_1", "ws2_1", "ws3_1", "ws4_1", "ws5_1"]);
    let e1 = &log.events[0];
    assert_eq!(e1.time, "2023-12-22T10:00:00Z");
    assert_eq!(e1.related(STATION).collect::<Vec<_>>(), ["ws1_1"]);
}

// -----------------------------------------------------------------------
// Flow graph
// -----------------------------------------------------------------------

#[test]
fn flow_graph_counts_the_reference_run() {
    let log = reference_log(&simulate_reference());
    let graph = derive_flow_graph(&log, &FlowOptions::default()).unwrap();
    assert_eq!(graph.edge("car", "d1").unwrap().count, 120);
    assert_eq!(graph.edge("d7", "bt").unwrap().count, 70);
    assert_eq!(graph.edge("a2", "d8").unwrap().count, 50);
    assert_eq!(graph.edge("d9", "md").unwrap().count, 30);
    assert_eq!(graph.edge("d5", "dd").unwrap().count, 20);
    // d5 runs at ws4 for every condition.
    assert_eq!(graph.edge("ws4", "d5").unwrap().count, 90);

    let again = derive_flow_graph(&log, &FlowOptions::default()).unwrap();
    assert_eq!(again, graph);
}

#[test]
fn saved_positions_are_kept_and_new_nodes_laid_out() {
    let dir = tempfile::tempdir().unwrap();
    let store = PositionStore::new(dir.path().join("node_positions.json"));

    // A first session only saw damper-damaged cars.
    let small = reference_log(&simulate_standard(&[("DD", 3)]));
    let graph = derive_flow_graph(&small, &FlowOptions::default()).unwrap();
    let mut view = FlowView::open(graph, store.clone()).unwrap();
    view.move_node("car", Position::new(-300.0, 40.0)).unwrap();
    view.move_node("dd", Position::new(900.0, 900.0)).unwrap();

    // The full run adds states such as md and bt.
    let full = reference_log(&simulate_reference());
    let graph = derive_flow_graph(&full, &FlowOptions::default()).unwrap();
    let computed = auto_layout(&graph, &LayoutOptions::default());
    let view = FlowView::open(graph, store.clone()).unwrap();
    assert_eq!(view.position("car"), Some(Position::new(-300.0, 40.0)));
    assert_eq!(view.position("dd"), Some(Position::new(900.0, 900.0)));
    assert_eq!(view.position("md"), computed.get("md").copied());
    assert_eq!(view.position("bt"), computed.get("bt").copied());
    assert!(view.position("md").is_some());
    assert_eq!(view.positions().len(), view.graph().node_count());
}
