use std::path::PathBuf;

/// Errors that can occur while running the demo pipeline.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// Failed to load the pipeline config or the catalog data files.
    #[error("data load error: {0}")]
    DataLoad(#[from] disassembly_data::DataLoadError),

    /// The scenario list names an unknown model or condition.
    #[error("invalid scenario: {0}")]
    Catalog(#[from] disassembly_core::catalog::CatalogError),

    /// The simulation failed.
    #[error("simulation failed: {0}")]
    Simulation(#[from] disassembly_core::simulator::SimulationError),

    /// The event log could not be built or written.
    #[error("event log error: {0}")]
    Ocel(#[from] disassembly_ocel::OcelError),

    /// The flow graph could not be derived, laid out or exported.
    #[error("flow graph error: {0}")]
    Flow(#[from] disassembly_flow::FlowError),

    /// The config file given on the command line does not exist.
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),
}
