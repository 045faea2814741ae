//! Car factory and disassembly run.
//!
//! A run is planned before anything is simulated: every car gets its number,
//! its first event number and its start time from the recipe lengths and the
//! duration table. Cars are then disassembled independently (in parallel with
//! the `parallel` feature) and their rows concatenated in car order, so both
//! modes produce identical tables.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::catalog::{CarModelDef, Catalog, CatalogError, ConditionDef, ROOT_COMPONENT_TYPE};
use crate::component::{Car, ComponentError};
use crate::id::*;
use crate::table::*;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("car {car}: cannot build component tree: {source}")]
    Factory {
        car: u32,
        #[source]
        source: ComponentError,
    },
    #[error("car {car}, step '{step}': no detached component of type '{component}'")]
    MainNotFound {
        car: u32,
        step: String,
        component: String,
    },
    #[error("car {car}, step '{step}': {source}")]
    StepFailed {
        car: u32,
        step: String,
        #[source]
        source: ComponentError,
    },
    #[error("root component must be of type 'car', was '{found}'")]
    NotACar { found: String },
    #[error("plan of {cars} cars exceeds the car numbering range")]
    TooManyCars { cars: u64 },
    #[error("car {car} would end after the last representable time")]
    TimeOverflow { car: u32 },
}

// ---------------------------------------------------------------------------
// Scenario plan
// ---------------------------------------------------------------------------

/// How many cars of each condition to simulate, all of one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioPlan {
    pub car_model: CarModelId,
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub condition: ConditionId,
    pub count: u32,
}

impl ScenarioPlan {
    pub fn new(car_model: CarModelId) -> Self {
        Self {
            car_model,
            scenarios: Vec::new(),
        }
    }

    /// Append `count` cars of `condition`. Cars are numbered in append order.
    pub fn with(mut self, condition: ConditionId, count: u32) -> Self {
        self.scenarios.push(Scenario { condition, count });
        self
    }

    pub fn car_count(&self) -> u64 {
        self.scenarios.iter().map(|s| u64::from(s.count)).sum()
    }

    /// Resolve a plan from names, e.g. `("A", [("TD", 70), ("MD", 30)])`.
    pub fn from_names(
        catalog: &Catalog,
        car_model: &str,
        scenarios: &[(&str, u32)],
    ) -> Result<Self, CatalogError> {
        let model = catalog
            .car_model_id(car_model)
            .ok_or_else(|| CatalogError::UnknownCarModel(car_model.to_string()))?;
        scenarios.iter().try_fold(Self::new(model), |plan, &(code, count)| {
            let condition = catalog
                .condition_id(code)
                .ok_or_else(|| CatalogError::UnknownCondition(code.to_string()))?;
            Ok(plan.with(condition, count))
        })
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Tables of one full run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationOutput {
    pub events: EventTable,
    pub objects: ObjectTable,
    pub resources: ResourceTable,
}

/// Rows produced by disassembling one car.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarRun {
    pub events: Vec<EventRecord>,
    pub objects: Vec<ObjectRecord>,
    pub end_time: DateTime<Utc>,
}

/// One workstation object per catalog station.
pub fn resource_table(catalog: &Catalog) -> ResourceTable {
    catalog
        .stations()
        .iter()
        .map(|s| ResourceRecord {
            id: station_instance_id(&s.name),
            resource_type: s.name.clone(),
        })
        .collect::<Vec<_>>()
        .into()
}

// ---------------------------------------------------------------------------
// Factory stage
// ---------------------------------------------------------------------------

/// Build car `number` of `model` in `condition`, with every component of the
/// condition's install plan installed.
pub fn car_factory(
    catalog: &Catalog,
    model: CarModelId,
    condition: ConditionId,
    number: u32,
) -> Result<Car, SimulationError> {
    catalog
        .get_car_model(model)
        .ok_or(CatalogError::InvalidCarModelRef(model))?;
    let def = catalog
        .get_condition(condition)
        .ok_or(CatalogError::InvalidConditionRef(condition))?;

    let mut car = Car::new(number, condition, model, ROOT_COMPONENT_TYPE);
    let mut by_type = HashMap::from([(ROOT_COMPONENT_TYPE, car.root())]);
    for link in &def.installs {
        let parent = *by_type
            .get(link.parent.as_str())
            .ok_or_else(|| CatalogError::UnknownParent {
                condition: def.code.clone(),
                parent: link.parent.clone(),
            })?;
        let child = car.create(&link.child);
        car.install(parent, child)
            .map_err(|source| SimulationError::Factory { car: number, source })?;
        by_type.insert(link.child.as_str(), child);
    }
    Ok(car)
}

// ---------------------------------------------------------------------------
// Disassembly stage
// ---------------------------------------------------------------------------

fn object_record(
    car: &Car,
    key: ComponentKey,
    parent: Option<String>,
    condition: &ConditionDef,
    model: &CarModelDef,
) -> Result<ObjectRecord, ComponentError> {
    let node = car.get(key).ok_or(ComponentError::InvalidKey)?;
    Ok(ObjectRecord {
        id: car.id_of(key)?,
        object_type: node.component_type.clone(),
        parent,
        condition: condition.code.clone(),
        car_model: model.name.clone(),
        car_number: car.number(),
    })
}

/// Apply the car's recipe, starting at `start_time`, numbering events from
/// `first_event_number`.
///
/// The root is recorded first. Each step records the removed components and,
/// if the step changes the main component's type, the main component under its
/// new identifier. All of them get the step's input identifier as parent.
pub fn disassemble_car(
    catalog: &Catalog,
    mut car: Car,
    start_time: DateTime<Utc>,
    first_event_number: u64,
) -> Result<CarRun, SimulationError> {
    let root = car.root();
    let root_type = car
        .get(root)
        .map(|n| n.component_type.clone())
        .unwrap_or_default();
    if root_type != ROOT_COMPONENT_TYPE {
        return Err(SimulationError::NotACar { found: root_type });
    }

    let condition = catalog
        .get_condition(car.condition())
        .ok_or(CatalogError::InvalidConditionRef(car.condition()))?;
    let model = catalog
        .get_car_model(car.model())
        .ok_or(CatalogError::InvalidCarModelRef(car.model()))?;
    // Every duration is resolved before the first event is emitted.
    let durations = catalog.recipe_durations(car.model(), car.condition())?;
    let number = car.number();

    let mut objects = vec![
        object_record(&car, root, None, condition, model)
            .map_err(|source| SimulationError::Factory { car: number, source })?,
    ];
    let mut events = Vec::with_capacity(condition.steps.len());
    let mut clock = start_time;

    for (offset, (step, minutes)) in condition.steps.iter().zip(durations).enumerate() {
        let step_name = catalog
            .get_event_type(step.event_type)
            .ok_or(CatalogError::InvalidEventTypeRef(step.event_type))?
            .name
            .clone();
        let station = catalog
            .get_station(step.station)
            .ok_or(CatalogError::InvalidStationRef(step.station))?;
        let failed = |source: ComponentError| SimulationError::StepFailed {
            car: number,
            step: step_name.clone(),
            source,
        };

        let main = car
            .find_detached(&step.main)
            .ok_or_else(|| SimulationError::MainNotFound {
                car: number,
                step: step_name.clone(),
                component: step.main.clone(),
            })?;
        let input_id = car.id_of(main).map_err(failed)?;

        let mut outputs = Vec::with_capacity(step.remove.len() + 1);
        for target in &step.remove {
            let popped = car.pop(main, target).map_err(failed)?;
            let record = object_record(&car, popped, Some(input_id.clone()), condition, model)
                .map_err(failed)?;
            outputs.push(record.id.clone());
            objects.push(record);
        }
        if let Some(new_type) = &step.rename_to {
            car.rename(main, new_type).map_err(failed)?;
            let record = object_record(&car, main, Some(input_id.clone()), condition, model)
                .map_err(failed)?;
            outputs.push(record.id.clone());
            objects.push(record);
        }

        let end_time = clock + Duration::minutes(i64::from(minutes));
        let sequence = first_event_number + offset as u64;
        debug!(
            car = number,
            step = %step_name,
            input = %input_id,
            outputs = outputs.len(),
            "Step disassembled"
        );
        events.push(EventRecord {
            id: format!("e{sequence}"),
            sequence,
            event_type: step_name,
            start_time: clock,
            end_time,
            input_component: input_id,
            output_components: outputs,
            resource: station_instance_id(&station.name),
            lot: number,
        });
        clock = end_time;
    }

    Ok(CarRun {
        events,
        objects,
        end_time: clock,
    })
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

/// Where one car sits in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarSlot {
    pub number: u32,
    pub condition: ConditionId,
    pub first_event_number: u64,
    pub start_time: DateTime<Utc>,
}

/// Runs scenario plans against a frozen catalog.
#[derive(Debug, Clone, Copy)]
pub struct Simulator<'a> {
    catalog: &'a Catalog,
}

impl<'a> Simulator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Assign numbers, event numbers and start times to every car of `plan`.
    /// Cars run back to back: each starts when the previous one ends.
    pub fn plan_cars(
        &self,
        plan: &ScenarioPlan,
        start_time: DateTime<Utc>,
    ) -> Result<Vec<CarSlot>, SimulationError> {
        let cars = plan.car_count();
        if u32::try_from(cars).is_err() {
            return Err(SimulationError::TooManyCars { cars });
        }
        let mut slots = Vec::new();
        let mut number = 0u32;
        let mut next_event = 1u64;
        let mut clock = start_time;

        for scenario in &plan.scenarios {
            let durations = self
                .catalog
                .recipe_durations(plan.car_model, scenario.condition)?;
            let total: i64 = durations.iter().map(|&m| i64::from(m)).sum();
            for _ in 0..scenario.count {
                number = number
                    .checked_add(1)
                    .ok_or(SimulationError::TooManyCars { cars })?;
                slots.push(CarSlot {
                    number,
                    condition: scenario.condition,
                    first_event_number: next_event,
                    start_time: clock,
                });
                next_event += durations.len() as u64;
                clock = Duration::try_minutes(total)
                    .and_then(|run| clock.checked_add_signed(run))
                    .ok_or(SimulationError::TimeOverflow { car: number })?;
            }
        }
        Ok(slots)
    }

    /// Build and disassemble the car of one slot.
    pub fn run_slot(&self, model: CarModelId, slot: &CarSlot) -> Result<CarRun, SimulationError> {
        let car = car_factory(self.catalog, model, slot.condition, slot.number)?;
        let run = disassemble_car(self.catalog, car, slot.start_time, slot.first_event_number)?;
        debug!(
            car = slot.number,
            events = run.events.len(),
            objects = run.objects.len(),
            "Car disassembled"
        );
        Ok(run)
    }

    #[cfg(not(feature = "parallel"))]
    fn run_slots(
        &self,
        model: CarModelId,
        slots: &[CarSlot],
    ) -> Result<Vec<CarRun>, SimulationError> {
        slots.iter().map(|slot| self.run_slot(model, slot)).collect()
    }

    #[cfg(feature = "parallel")]
    fn run_slots(
        &self,
        model: CarModelId,
        slots: &[CarSlot],
    ) -> Result<Vec<CarRun>, SimulationError> {
        use rayon::prelude::*;
        slots.par_iter().map(|slot| self.run_slot(model, slot)).collect()
    }

    /// Simulate every car of `plan`, the first one starting at `start_time`.
    pub fn simulate(
        &self,
        plan: &ScenarioPlan,
        start_time: DateTime<Utc>,
    ) -> Result<SimulationOutput, SimulationError> {
        let slots = self.plan_cars(plan, start_time)?;
        let runs = self.run_slots(plan.car_model, &slots)?;

        let mut output = SimulationOutput {
            resources: resource_table(self.catalog),
            ..Default::default()
        };
        for run in runs {
            output.events.extend(run.events);
            output.objects.extend(run.objects);
        }

        info!(
            cars = slots.len(),
            events = output.events.len(),
            objects = output.objects.len(),
            "Simulation finished"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 12, 22, 7, 0, 0).unwrap()
    }

    fn run_one(code: &str) -> CarRun {
        let catalog = Catalog::standard().unwrap();
        let model = catalog.car_model_id("A").unwrap();
        let condition = catalog.condition_id(code).unwrap();
        let car = car_factory(&catalog, model, condition, 1).unwrap();
        disassemble_car(&catalog, car, start(), 1).unwrap()
    }

    #[test]
    fn factory_installs_whole_plan() {
        let catalog = Catalog::standard().unwrap();
        let model = catalog.car_model_id("A").unwrap();
        let td = catalog.condition_id("TD").unwrap();
        let car = car_factory(&catalog, model, td, 3).unwrap();
        // Root plus 15 installed components.
        assert_eq!(car.len(), 16);
        assert_eq!(car.descendant_count(car.root()), 15);
        assert_eq!(car.id_of(car.root()).unwrap(), "car_3");
    }

    #[test]
    fn target_disassembly_emits_eleven_chained_events() {
        let run = run_one("TD");
        assert_eq!(run.events.len(), 11);
        for pair in run.events.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time);
        }
        assert_eq!(run.events[0].start_time, start());
        assert_eq!(run.end_time, run.events[10].end_time);
        assert_eq!(run.events[0].id, "e1");
        assert_eq!(run.events[10].id, "e11");
    }

    #[test]
    fn first_step_renames_the_car() {
        let run = run_one("TD");
        let first = &run.events[0];
        assert_eq!(first.event_type, "d1");
        assert_eq!(first.input_component, "car_1");
        assert_eq!(first.output_components, ["sp_1", "a1_1"]);
        assert_eq!(first.resource, "ws1_1");

        let a1 = run.objects.iter().find(|o| o.id == "a1_1").unwrap();
        assert_eq!(a1.parent.as_deref(), Some("car_1"));
    }

    #[test]
    fn nested_removal_is_parented_to_input_component() {
        let run = run_one("DD");
        let dd = run.objects.iter().find(|o| o.id == "dd_1").unwrap();
        assert_eq!(dd.parent.as_deref(), Some("a8_1"));
        let rt = run.objects.iter().find(|o| o.id == "rt_1").unwrap();
        assert_eq!(rt.parent.as_deref(), Some("a2_1"));
    }

    #[test]
    fn every_output_is_recorded_once() {
        for code in ["TD", "MD", "DD"] {
            let run = run_one(code);
            let outputs: Vec<&String> = run
                .events
                .iter()
                .flat_map(|e| e.output_components.iter())
                .collect();
            // Every object except the root is an output of exactly one event.
            assert_eq!(outputs.len() + 1, run.objects.len(), "{code}");
            for id in outputs {
                assert_eq!(run.objects.iter().filter(|o| &o.id == id).count(), 1);
            }
        }
    }

    #[test]
    fn durations_match_catalog() {
        let catalog = Catalog::standard().unwrap();
        let model = catalog.car_model_id("A").unwrap();
        let run = run_one("TD");
        for event in &run.events {
            let id = catalog.event_type_id(&event.event_type).unwrap();
            let minutes = catalog.duration(model, id).unwrap();
            assert_eq!(
                event.end_time - event.start_time,
                Duration::minutes(i64::from(minutes))
            );
        }
    }

    #[test]
    fn missing_duration_fails_before_any_event() {
        let mut b = crate::standard::standard_builder().unwrap();
        let b_model = b.register_car_model("B");
        let d1 = b.event_type_id("d1").unwrap();
        b.set_duration(b_model, d1, 10).unwrap();
        let catalog = b.build().unwrap();
        let plan = ScenarioPlan::from_names(&catalog, "B", &[("TD", 1)]).unwrap();
        let err = Simulator::new(&catalog).simulate(&plan, start()).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Catalog(CatalogError::MissingDuration { ref event_type, .. })
                if event_type == "d2"
        ));
    }

    #[test]
    fn step_on_absent_component_fails() {
        let mut b = crate::standard::standard_builder().unwrap();
        let md = b.condition_id("MD").unwrap();
        let d10 = b.event_type_id("d10").unwrap();
        let ws5 = b.station_id("ws5").unwrap();
        b.add_step(
            md,
            crate::catalog::StepDef {
                event_type: d10,
                main: "a10".to_string(),
                remove: vec!["a11".to_string()],
                station: ws5,
                rename_to: None,
            },
        )
        .unwrap();
        let catalog = b.build().unwrap();
        let plan = ScenarioPlan::from_names(&catalog, "A", &[("MD", 1)]).unwrap();
        let err = Simulator::new(&catalog).simulate(&plan, start()).unwrap_err();
        assert_eq!(
            err,
            SimulationError::MainNotFound {
                car: 1,
                step: "d10".to_string(),
                component: "a10".to_string(),
            }
        );
    }

    #[test]
    fn unknown_condition_name_fails() {
        let catalog = Catalog::standard().unwrap();
        assert_eq!(
            ScenarioPlan::from_names(&catalog, "A", &[("XX", 1)]),
            Err(CatalogError::UnknownCondition("XX".to_string()))
        );
    }

    #[test]
    fn disassembling_a_non_car_fails() {
        let catalog = Catalog::standard().unwrap();
        let car = Car::new(1, ConditionId(0), CarModelId(0), "a2");
        assert!(matches!(
            disassemble_car(&catalog, car, start(), 1),
            Err(SimulationError::NotACar { .. })
        ));
    }

    #[test]
    fn cars_run_back_to_back() {
        let catalog = Catalog::standard().unwrap();
        let plan = ScenarioPlan::from_names(&catalog, "A", &[("TD", 2), ("MD", 1)]).unwrap();
        let sim = Simulator::new(&catalog);
        let slots = sim.plan_cars(&plan, start()).unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[1].first_event_number, 12);
        assert_eq!(slots[2].first_event_number, 23);

        let out = sim.simulate(&plan, start()).unwrap();
        assert_eq!(out.events.len(), 11 + 11 + 4);
        for pair in out.events.rows().windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time);
            assert_eq!(pair[0].sequence + 1, pair[1].sequence);
        }
        assert_eq!(out.resources.len(), 5);
    }

    #[test]
    fn simulate_matches_slot_by_slot_run() {
        let catalog = Catalog::standard().unwrap();
        let plan =
            ScenarioPlan::from_names(&catalog, "A", &[("DD", 2), ("TD", 3), ("MD", 2)]).unwrap();
        let sim = Simulator::new(&catalog);

        let mut expected = SimulationOutput {
            resources: resource_table(&catalog),
            ..Default::default()
        };
        for slot in sim.plan_cars(&plan, start()).unwrap() {
            let run = sim.run_slot(plan.car_model, &slot).unwrap();
            expected.events.extend(run.events);
            expected.objects.extend(run.objects);
        }
        assert_eq!(sim.simulate(&plan, start()).unwrap(), expected);
    }

    #[test]
    fn oversized_plan_is_rejected_before_planning() {
        let catalog = Catalog::standard().unwrap();
        let model = catalog.car_model_id("A").unwrap();
        let plan = ScenarioPlan::new(model)
            .with(catalog.condition_id("TD").unwrap(), u32::MAX)
            .with(catalog.condition_id("MD").unwrap(), 1);
        assert_eq!(
            Simulator::new(&catalog).plan_cars(&plan, start()),
            Err(SimulationError::TooManyCars {
                cars: u64::from(u32::MAX) + 1
            })
        );
    }

    #[test]
    fn run_past_the_calendar_end_fails() {
        let catalog = Catalog::standard().unwrap();
        let plan = ScenarioPlan::from_names(&catalog, "A", &[("TD", 1)]).unwrap();
        let late = DateTime::<Utc>::MAX_UTC - Duration::minutes(100);
        assert_eq!(
            Simulator::new(&catalog).simulate(&plan, late),
            Err(SimulationError::TimeOverflow { car: 1 })
        );
    }

    #[test]
    fn empty_plan_yields_only_resources() {
        let catalog = Catalog::standard().unwrap();
        let plan = ScenarioPlan::from_names(&catalog, "A", &[]).unwrap();
        let out = Simulator::new(&catalog).simulate(&plan, start()).unwrap();
        assert!(out.events.is_empty());
        assert!(out.objects.is_empty());
        assert_eq!(out.resources.len(), 5);
    }
}
