//! The frozen configuration tables the simulator runs against.
//!
//! A [`Catalog`] holds the closed sets of conditions, step types, workstations
//! and car models, plus the (model x step) duration table. It is assembled with
//! a [`CatalogBuilder`] and validated once in [`CatalogBuilder::build`]; after
//! that it is read-only.

use crate::id::*;
use std::collections::{HashMap, HashSet};

/// Component type of every car's root component.
pub const ROOT_COMPONENT_TYPE: &str = "car";

/// Prefix reserved for workstation objects in the event log.
pub const RESERVED_TYPE_PREFIX: &str = "Station";

/// A disassembly step type, e.g. `d1` ("spoil car").
#[derive(Debug, Clone)]
pub struct EventTypeDef {
    pub name: String,
    pub label: String,
}

/// A workstation type, e.g. `ws1`.
#[derive(Debug, Clone)]
pub struct StationDef {
    pub name: String,
}

/// A car model and its per-step durations.
#[derive(Debug, Clone)]
pub struct CarModelDef {
    pub name: String,
    pub durations: HashMap<EventTypeId, Minutes>,
}

/// One `parent owns child` link of a condition's install plan. Both sides are
/// component types; the parent must be the root or an earlier child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallDef {
    pub parent: String,
    pub child: String,
}

/// One step of a disassembly recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDef {
    pub event_type: EventTypeId,
    /// Type of the detached component the step works on.
    pub main: String,
    /// Types removed from below `main`, searched depth-first.
    pub remove: Vec<String>,
    pub station: StationId,
    /// New type of `main` after the step, if the step changes it.
    pub rename_to: Option<String>,
}

/// A condition scenario: how the car arrives and how it is taken apart.
#[derive(Debug, Clone)]
pub struct ConditionDef {
    /// Short code written to the event log (`TD`, `MD`, `DD`).
    pub code: String,
    pub label: String,
    pub installs: Vec<InstallDef>,
    pub steps: Vec<StepDef>,
}

/// Builder for constructing an immutable [`Catalog`].
/// Registration first, then per-condition plans, then [`build`](Self::build).
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    event_types: Vec<EventTypeDef>,
    event_type_name_to_id: HashMap<String, EventTypeId>,
    stations: Vec<StationDef>,
    station_name_to_id: HashMap<String, StationId>,
    models: Vec<CarModelDef>,
    model_name_to_id: HashMap<String, CarModelId>,
    conditions: Vec<ConditionDef>,
    condition_code_to_id: HashMap<String, ConditionId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step type. Returns its ID.
    pub fn register_event_type(&mut self, name: &str, label: &str) -> EventTypeId {
        let id = EventTypeId(self.event_types.len() as u32);
        self.event_types.push(EventTypeDef {
            name: name.to_string(),
            label: label.to_string(),
        });
        self.event_type_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Register a workstation type. Returns its ID.
    pub fn register_station(&mut self, name: &str) -> StationId {
        let id = StationId(self.stations.len() as u32);
        self.stations.push(StationDef {
            name: name.to_string(),
        });
        self.station_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Register a car model with an empty duration table. Returns its ID.
    pub fn register_car_model(&mut self, name: &str) -> CarModelId {
        let id = CarModelId(self.models.len() as u32);
        self.models.push(CarModelDef {
            name: name.to_string(),
            durations: HashMap::new(),
        });
        self.model_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Register a condition with an empty install plan and recipe. Returns its ID.
    pub fn register_condition(&mut self, code: &str, label: &str) -> ConditionId {
        let id = ConditionId(self.conditions.len() as u32);
        self.conditions.push(ConditionDef {
            code: code.to_string(),
            label: label.to_string(),
            installs: Vec::new(),
            steps: Vec::new(),
        });
        self.condition_code_to_id.insert(code.to_string(), id);
        id
    }

    /// Set the duration of `event_type` for `model`, replacing any earlier value.
    pub fn set_duration(
        &mut self,
        model: CarModelId,
        event_type: EventTypeId,
        minutes: Minutes,
    ) -> Result<(), CatalogError> {
        if event_type.0 as usize >= self.event_types.len() {
            return Err(CatalogError::InvalidEventTypeRef(event_type));
        }
        let def = self
            .models
            .get_mut(model.0 as usize)
            .ok_or(CatalogError::InvalidCarModelRef(model))?;
        def.durations.insert(event_type, minutes);
        Ok(())
    }

    /// Append a `parent owns child` link to a condition's install plan.
    pub fn install(
        &mut self,
        condition: ConditionId,
        parent: &str,
        child: &str,
    ) -> Result<(), CatalogError> {
        let def = self
            .conditions
            .get_mut(condition.0 as usize)
            .ok_or(CatalogError::InvalidConditionRef(condition))?;
        def.installs.push(InstallDef {
            parent: parent.to_string(),
            child: child.to_string(),
        });
        Ok(())
    }

    /// Append a step to a condition's recipe.
    pub fn add_step(&mut self, condition: ConditionId, step: StepDef) -> Result<(), CatalogError> {
        let def = self
            .conditions
            .get_mut(condition.0 as usize)
            .ok_or(CatalogError::InvalidConditionRef(condition))?;
        def.steps.push(step);
        Ok(())
    }

    pub fn event_type_id(&self, name: &str) -> Option<EventTypeId> {
        self.event_type_name_to_id.get(name).copied()
    }

    pub fn station_id(&self, name: &str) -> Option<StationId> {
        self.station_name_to_id.get(name).copied()
    }

    pub fn car_model_id(&self, name: &str) -> Option<CarModelId> {
        self.model_name_to_id.get(name).copied()
    }

    pub fn condition_id(&self, code: &str) -> Option<ConditionId> {
        self.condition_code_to_id.get(code).copied()
    }

    /// Validate every table and freeze the catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        check_unique(self.event_types.iter().map(|d| d.name.as_str()))?;
        check_unique(self.stations.iter().map(|d| d.name.as_str()))?;
        check_unique(self.models.iter().map(|d| d.name.as_str()))?;
        check_unique(self.conditions.iter().map(|d| d.code.as_str()))?;

        for condition in &self.conditions {
            validate_install_plan(condition)?;
            if condition.steps.is_empty() {
                return Err(CatalogError::MissingRecipe {
                    condition: condition.code.clone(),
                });
            }
            for step in &condition.steps {
                if step.event_type.0 as usize >= self.event_types.len() {
                    return Err(CatalogError::InvalidEventTypeRef(step.event_type));
                }
                if step.station.0 as usize >= self.stations.len() {
                    return Err(CatalogError::InvalidStationRef(step.station));
                }
                if let Some(new_type) = &step.rename_to {
                    check_component_type(new_type)?;
                }
            }
        }

        Ok(Catalog {
            event_types: self.event_types,
            event_type_name_to_id: self.event_type_name_to_id,
            stations: self.stations,
            station_name_to_id: self.station_name_to_id,
            models: self.models,
            model_name_to_id: self.model_name_to_id,
            conditions: self.conditions,
            condition_code_to_id: self.condition_code_to_id,
        })
    }
}

fn check_unique<'a>(names: impl Iterator<Item = &'a str>) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CatalogError::DuplicateName(name.to_string()));
        }
    }
    Ok(())
}

fn check_component_type(component_type: &str) -> Result<(), CatalogError> {
    if component_type.starts_with(RESERVED_TYPE_PREFIX) {
        return Err(CatalogError::ReservedComponentType(component_type.to_string()));
    }
    Ok(())
}

fn validate_install_plan(condition: &ConditionDef) -> Result<(), CatalogError> {
    let mut known: HashSet<&str> = HashSet::from([ROOT_COMPONENT_TYPE]);
    for link in &condition.installs {
        check_component_type(&link.child)?;
        if !known.contains(link.parent.as_str()) {
            return Err(CatalogError::UnknownParent {
                condition: condition.code.clone(),
                parent: link.parent.clone(),
            });
        }
        if !known.insert(link.child.as_str()) {
            return Err(CatalogError::DuplicateComponent {
                condition: condition.code.clone(),
                component: link.child.clone(),
            });
        }
    }
    Ok(())
}

/// Immutable catalog. Frozen after build().
#[derive(Debug, Clone)]
pub struct Catalog {
    event_types: Vec<EventTypeDef>,
    event_type_name_to_id: HashMap<String, EventTypeId>,
    stations: Vec<StationDef>,
    station_name_to_id: HashMap<String, StationId>,
    models: Vec<CarModelDef>,
    model_name_to_id: HashMap<String, CarModelId>,
    conditions: Vec<ConditionDef>,
    condition_code_to_id: HashMap<String, ConditionId>,
}

impl Catalog {
    pub fn get_event_type(&self, id: EventTypeId) -> Option<&EventTypeDef> {
        self.event_types.get(id.0 as usize)
    }

    pub fn get_station(&self, id: StationId) -> Option<&StationDef> {
        self.stations.get(id.0 as usize)
    }

    pub fn get_car_model(&self, id: CarModelId) -> Option<&CarModelDef> {
        self.models.get(id.0 as usize)
    }

    pub fn get_condition(&self, id: ConditionId) -> Option<&ConditionDef> {
        self.conditions.get(id.0 as usize)
    }

    pub fn event_type_id(&self, name: &str) -> Option<EventTypeId> {
        self.event_type_name_to_id.get(name).copied()
    }

    pub fn station_id(&self, name: &str) -> Option<StationId> {
        self.station_name_to_id.get(name).copied()
    }

    pub fn car_model_id(&self, name: &str) -> Option<CarModelId> {
        self.model_name_to_id.get(name).copied()
    }

    pub fn condition_id(&self, code: &str) -> Option<ConditionId> {
        self.condition_code_to_id.get(code).copied()
    }

    /// Workstation types in registration order.
    pub fn stations(&self) -> &[StationDef] {
        &self.stations
    }

    pub fn event_type_count(&self) -> usize {
        self.event_types.len()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn car_model_count(&self) -> usize {
        self.models.len()
    }

    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    /// Duration of `event_type` on `model`. A missing entry is a
    /// configuration error, never zero.
    pub fn duration(
        &self,
        model: CarModelId,
        event_type: EventTypeId,
    ) -> Result<Minutes, CatalogError> {
        let model_def = self
            .get_car_model(model)
            .ok_or(CatalogError::InvalidCarModelRef(model))?;
        model_def
            .durations
            .get(&event_type)
            .copied()
            .ok_or_else(|| CatalogError::MissingDuration {
                model: model_def.name.clone(),
                event_type: self
                    .get_event_type(event_type)
                    .map(|d| d.name.clone())
                    .unwrap_or_else(|| format!("{event_type:?}")),
            })
    }

    /// Durations of every step of `condition`'s recipe on `model`, in recipe
    /// order. Fails on the first missing entry.
    pub fn recipe_durations(
        &self,
        model: CarModelId,
        condition: ConditionId,
    ) -> Result<Vec<Minutes>, CatalogError> {
        let def = self
            .get_condition(condition)
            .ok_or(CatalogError::InvalidConditionRef(condition))?;
        def.steps
            .iter()
            .map(|step| self.duration(model, step.event_type))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate name: {0}")]
    DuplicateName(String),
    #[error("unknown condition: {0}")]
    UnknownCondition(String),
    #[error("unknown car model: {0}")]
    UnknownCarModel(String),
    #[error("unknown event type: {0}")]
    UnknownEventType(String),
    #[error("unknown station: {0}")]
    UnknownStation(String),
    #[error("invalid condition reference: {0:?}")]
    InvalidConditionRef(ConditionId),
    #[error("invalid event type reference: {0:?}")]
    InvalidEventTypeRef(EventTypeId),
    #[error("invalid station reference: {0:?}")]
    InvalidStationRef(StationId),
    #[error("invalid car model reference: {0:?}")]
    InvalidCarModelRef(CarModelId),
    #[error("no duration for step '{event_type}' on car model '{model}'")]
    MissingDuration { model: String, event_type: String },
    #[error("condition '{condition}' has no disassembly steps")]
    MissingRecipe { condition: String },
    #[error("condition '{condition}' installs onto unknown parent '{parent}'")]
    UnknownParent { condition: String, parent: String },
    #[error("condition '{condition}' installs component '{component}' twice")]
    DuplicateComponent { condition: String, component: String },
    #[error("component type '{0}' uses the reserved prefix 'Station'")]
    ReservedComponentType(String),
}
