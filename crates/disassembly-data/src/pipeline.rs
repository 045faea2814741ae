//! Run configuration: which cars to simulate and where the outputs go.
//!
//! Every field has a default, so an empty config file reproduces the
//! reference run (70 TD, 30 MD and 20 DD cars of model `A` starting
//! 2023-12-22 07:00 UTC).

use chrono::{DateTime, TimeZone, Utc};
use disassembly_core::catalog::{Catalog, CatalogError};
use disassembly_core::simulator::ScenarioPlan;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::load_catalog;
use crate::loader::{deserialize_file, DataLoadError};

/// Number of cars to simulate for one condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioData {
    pub condition: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub car_model: String,
    /// Simulated in order; cars are numbered across all scenarios.
    pub scenarios: Vec<ScenarioData>,
    pub start_time: DateTime<Utc>,
    /// Directory of catalog data files. `None` uses the built-in catalog.
    pub catalog_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub ocel_file: String,
    pub positions_file: String,
    pub elements_file: String,
    /// Base name of the exported images, one file per entry of `image_formats`.
    pub image_name: String,
    pub image_formats: Vec<String>,
    /// Key object-state nodes by `type|condition` instead of `type`.
    pub split_by_condition: bool,
}

fn reference_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 12, 22, 7, 0, 0)
        .single()
        .unwrap_or_default()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            car_model: "A".to_string(),
            scenarios: [("TD", 70), ("MD", 30), ("DD", 20)]
                .into_iter()
                .map(|(condition, count)| ScenarioData {
                    condition: condition.to_string(),
                    count,
                })
                .collect(),
            start_time: reference_start(),
            catalog_dir: None,
            output_dir: PathBuf::from("output"),
            ocel_file: "ocel.json".to_string(),
            positions_file: "node_positions.json".to_string(),
            elements_file: "flow_elements.json".to_string(),
            image_name: "flow_graph".to_string(),
            image_formats: vec!["svg".to_string(), "png".to_string()],
            split_by_condition: false,
        }
    }
}

impl PipelineConfig {
    /// The configured catalog, validated and frozen.
    pub fn catalog(&self) -> Result<Catalog, DataLoadError> {
        match &self.catalog_dir {
            Some(dir) => Ok(load_catalog(dir)?.build()?),
            None => Ok(Catalog::standard()?),
        }
    }

    /// Resolve the scenario list against `catalog`.
    pub fn scenario_plan(&self, catalog: &Catalog) -> Result<ScenarioPlan, CatalogError> {
        let scenarios: Vec<(&str, u32)> = self
            .scenarios
            .iter()
            .map(|s| (s.condition.as_str(), s.count))
            .collect();
        ScenarioPlan::from_names(catalog, &self.car_model, &scenarios)
    }

    pub fn ocel_path(&self) -> PathBuf {
        self.output_dir.join(&self.ocel_file)
    }

    pub fn positions_path(&self) -> PathBuf {
        self.output_dir.join(&self.positions_file)
    }

    pub fn elements_path(&self) -> PathBuf {
        self.output_dir.join(&self.elements_file)
    }

    /// One output path per configured image format.
    pub fn image_paths(&self) -> Vec<PathBuf> {
        self.image_formats
            .iter()
            .map(|ext| self.output_dir.join(format!("{}.{ext}", self.image_name)))
            .collect()
    }
}

/// Load a pipeline config from a RON, JSON or TOML file. Relative
/// `catalog_dir` and `output_dir` entries are resolved against the file's
/// directory.
pub fn load_pipeline_config(path: &Path) -> Result<PipelineConfig, DataLoadError> {
    let mut config: PipelineConfig = deserialize_file(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    if let Some(dir) = config.catalog_dir.take() {
        config.catalog_dir = Some(base.join(dir));
    }
    config.output_dir = base.join(&config.output_dir);
    Ok(config)
}
