//! Headless demo: runs the pipeline and prints what it wrote.
//!
//! Run with: `cargo run --package disassembly-demo -- [pipeline.ron]`
//!
//! Without an argument the reference run is used (70 TD, 30 MD and 20 DD
//! cars, outputs under `./output`). Set `RUST_LOG=debug` for per-car logs.

use std::path::PathBuf;

use disassembly_data::{load_pipeline_config, PipelineConfig};
use disassembly_demo::{run_pipeline, DemoError, RunReport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn load_config() -> Result<PipelineConfig, DemoError> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) if !path.exists() => Err(DemoError::ConfigNotFound(path)),
        Some(path) => Ok(load_pipeline_config(&path)?),
        None => Ok(PipelineConfig::default()),
    }
}

fn print_report(report: &RunReport) {
    println!("=== Disassembly run ===");
    println!("Cars:    {}", report.cars);
    println!("Events:  {}", report.events);
    println!("Objects: {}", report.objects);
    println!("Flow graph: {} nodes, {} edges", report.nodes, report.edges);
    println!();
    println!("  event log  {}", report.ocel_path.display());
    println!("  positions  {}", report.positions_path.display());
    println!("  elements   {}", report.elements_path.display());
    for image in &report.images {
        println!("  image      {}", image.display());
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match load_config().and_then(|config| run_pipeline(&config)) {
        Ok(report) => print_report(&report),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
