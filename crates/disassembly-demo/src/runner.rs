//! The end-to-end pipeline run.

use std::path::PathBuf;

use disassembly_core::simulator::Simulator;
use disassembly_data::PipelineConfig;
use disassembly_flow::elements::write_elements;
use disassembly_flow::export::{ExportFormat, ExportOptions};
use disassembly_flow::positions::PositionStore;
use disassembly_flow::{derive_flow_graph, FlowOptions, FlowView};
use disassembly_ocel::{build_ocel, write_ocel};
use tracing::info;

use crate::error::DemoError;

/// What a pipeline run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub cars: u64,
    pub events: usize,
    pub objects: usize,
    pub nodes: usize,
    pub edges: usize,
    pub ocel_path: PathBuf,
    pub positions_path: PathBuf,
    pub elements_path: PathBuf,
    pub images: Vec<PathBuf>,
}

/// Run every stage of `config` and write all output files.
///
/// Image paths are checked before anything is written, so an unsupported
/// extension leaves the output directory untouched.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunReport, DemoError> {
    let images = config.image_paths();
    for path in &images {
        ExportFormat::from_path(path)?;
    }

    let catalog = config.catalog()?;
    let plan = config.scenario_plan(&catalog)?;
    let output = Simulator::new(&catalog).simulate(&plan, config.start_time)?;

    let log = build_ocel(&output.events, &output.objects, &output.resources)?;
    let ocel_path = config.ocel_path();
    write_ocel(&log, &ocel_path)?;

    let graph = derive_flow_graph(
        &log,
        &FlowOptions {
            split_by_condition: config.split_by_condition,
        },
    )?;
    let positions_path = config.positions_path();
    let view = FlowView::open(graph, PositionStore::new(&positions_path))?;
    view.save()?;

    let elements_path = config.elements_path();
    write_elements(&view.elements(), &elements_path)?;

    let options = ExportOptions::default();
    for path in &images {
        view.export(path, &options)?;
    }

    let report = RunReport {
        cars: plan.car_count(),
        events: output.events.len(),
        objects: output.objects.len(),
        nodes: view.graph().node_count(),
        edges: view.graph().edge_count(),
        ocel_path,
        positions_path,
        elements_path,
        images,
    };
    info!(
        cars = report.cars,
        events = report.events,
        output_dir = %config.output_dir.display(),
        "Pipeline finished"
    );
    Ok(report)
}
