//! Serde data file structs for catalog definitions.
//!
//! These structs define the on-disk format for step types, workstations, car
//! models and conditions. They are deserialized from RON, JSON, or TOML data
//! files and then resolved into a catalog by [`crate::catalog::load_catalog`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ===========================================================================
// Step types and workstations
// ===========================================================================

/// A disassembly step type in a data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTypeData {
    pub name: String,
    #[serde(default)]
    pub label: String,
}

/// A workstation type in a data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationData {
    pub name: String,
}

// ===========================================================================
// Car models
// ===========================================================================

/// A car model and its step durations in minutes, keyed by step type name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarModelData {
    pub name: String,
    pub durations: BTreeMap<String, u32>,
}

// ===========================================================================
// Conditions
// ===========================================================================

/// One step of a recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepData {
    /// Step type name, e.g. `d3`.
    pub event: String,
    /// Type of the component the step works on.
    pub main: String,
    #[serde(default)]
    pub remove: Vec<String>,
    pub station: String,
    #[serde(default)]
    pub rename_to: Option<String>,
}

/// A condition scenario: its install plan as `(parent, child)` type pairs and
/// its recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionData {
    pub code: String,
    #[serde(default)]
    pub label: String,
    pub installs: Vec<(String, String)>,
    pub steps: Vec<StepData>,
}
