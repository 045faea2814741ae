//! Loads a catalog from a directory of data files.
//!
//! The directory holds four files, each in any supported format:
//! `event_types`, `stations`, `models` and `conditions`. Names are resolved
//! in that order, so models may only reference known step types and
//! conditions only known step types and workstations.

use disassembly_core::catalog::{CatalogBuilder, StepDef};
use disassembly_core::id::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::loader::{
    check_duplicate, deserialize_list, require_data_file, resolve_name, DataLoadError,
};
use crate::schema::*;

/// The reference catalog shipped with this crate.
pub fn standard_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("standard")
}

/// Read every catalog file in `dir` into an unfrozen builder.
///
/// Duplicate and unresolved names are reported against the file they occur
/// in. Call [`CatalogBuilder::build`] to validate install plans and recipes.
pub fn load_catalog(dir: &Path) -> Result<CatalogBuilder, DataLoadError> {
    let mut builder = CatalogBuilder::new();

    // Step types.
    let path = require_data_file(dir, "event_types")?;
    let event_types: Vec<EventTypeData> = deserialize_list(&path, "event_types")?;
    let mut event_ids: HashMap<String, EventTypeId> = HashMap::new();
    for data in &event_types {
        check_duplicate(&event_ids, &data.name, &path)?;
        let id = builder.register_event_type(&data.name, &data.label);
        event_ids.insert(data.name.clone(), id);
    }

    // Workstations.
    let path = require_data_file(dir, "stations")?;
    let stations: Vec<StationData> = deserialize_list(&path, "stations")?;
    let mut station_ids: HashMap<String, StationId> = HashMap::new();
    for data in &stations {
        check_duplicate(&station_ids, &data.name, &path)?;
        let id = builder.register_station(&data.name);
        station_ids.insert(data.name.clone(), id);
    }

    // Car models and their duration tables.
    let path = require_data_file(dir, "models")?;
    let models: Vec<CarModelData> = deserialize_list(&path, "models")?;
    let mut model_ids: HashMap<String, CarModelId> = HashMap::new();
    for data in &models {
        check_duplicate(&model_ids, &data.name, &path)?;
        let model = builder.register_car_model(&data.name);
        for (event, &minutes) in &data.durations {
            let event_type = *resolve_name(&event_ids, event, &path, "event type")?;
            builder.set_duration(model, event_type, minutes)?;
        }
        model_ids.insert(data.name.clone(), model);
    }

    // Conditions: install plans and recipes.
    let path = require_data_file(dir, "conditions")?;
    let conditions: Vec<ConditionData> = deserialize_list(&path, "conditions")?;
    let mut condition_ids: HashMap<String, ConditionId> = HashMap::new();
    for data in &conditions {
        check_duplicate(&condition_ids, &data.code, &path)?;
        let condition = builder.register_condition(&data.code, &data.label);
        for (parent, child) in &data.installs {
            builder.install(condition, parent, child)?;
        }
        for step in &data.steps {
            let def = StepDef {
                event_type: *resolve_name(&event_ids, &step.event, &path, "event type")?,
                main: step.main.clone(),
                remove: step.remove.clone(),
                station: *resolve_name(&station_ids, &step.station, &path, "station")?,
                rename_to: step.rename_to.clone(),
            };
            builder.add_step(condition, def)?;
        }
        condition_ids.insert(data.code.clone(), condition);
    }

    info!(
        dir = %dir.display(),
        event_types = event_ids.len(),
        stations = station_ids.len(),
        models = model_ids.len(),
        conditions = condition_ids.len(),
        "Catalog loaded"
    );
    Ok(builder)
}
