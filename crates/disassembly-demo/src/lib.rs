//! Demo runner for the disassembly toolkit.
//!
//! Runs the whole pipeline from one [`PipelineConfig`]: simulate the
//! configured cars, write the OCEL log, derive the flow graph, restore saved
//! node positions and write the element list and images.
//!
//! ```rust,ignore
//! use disassembly_data::PipelineConfig;
//! use disassembly_demo::run_pipeline;
//!
//! let report = run_pipeline(&PipelineConfig::default())?;
//! println!("{} events written to {}", report.events, report.ocel_path.display());
//! ```
//!
//! [`PipelineConfig`]: disassembly_data::PipelineConfig

pub mod error;
pub mod runner;

pub use error::DemoError;
pub use runner::{run_pipeline, RunReport};
