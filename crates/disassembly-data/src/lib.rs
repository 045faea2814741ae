pub mod catalog;
pub mod loader;
pub mod pipeline;
pub mod schema;

pub use catalog::{load_catalog, standard_data_dir};
pub use loader::DataLoadError;
pub use pipeline::{load_pipeline_config, PipelineConfig};
