#![no_main]
use disassembly_flow::export::render_svg;
use disassembly_flow::layout::{auto_layout, LayoutOptions};
use disassembly_flow::{derive_flow_graph, FlowOptions};
use disassembly_ocel::OcelLog;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(log) = serde_json::from_slice::<OcelLog>(data) else {
        return;
    };
    for split_by_condition in [false, true] {
        if let Ok(graph) = derive_flow_graph(&log, &FlowOptions { split_by_condition }) {
            let positions = auto_layout(&graph, &LayoutOptions::default());
            assert_eq!(positions.len(), graph.node_count());
            let _ = render_svg(&graph, &positions);
        }
    }
});
