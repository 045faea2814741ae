//! The reference electric-vehicle catalog: model `A`, five workstations,
//! eleven steps and three arrival conditions.
//!
//! The same tables ship as data files under `disassembly-data/data/standard`.

use crate::catalog::{Catalog, CatalogBuilder, CatalogError, StepDef};
use crate::id::Minutes;

/// (name, label, duration on model A in minutes)
const EVENT_TYPES: &[(&str, &str, Minutes)] = &[
    ("d1", "Spoil car", 180),
    ("d2", "Body chassis separation", 120),
    ("d3", "Split chassis", 120),
    ("d4", "Tyres from front chassis", 30),
    ("d5", "Small damper assembly from front chassis", 30),
    ("d6", "Small dampers from assembly", 30),
    ("d7", "Battery from chassis", 70),
    ("d8", "Tyres from rear chassis", 30),
    ("d9", "Motor, motor housing and base plate from rear chassis", 30),
    ("d10", "Large damper assembly from base plate", 30),
    ("d11", "Large dampers from assembly", 30),
];

const STATIONS: &[&str] = &["ws1", "ws2", "ws3", "ws4", "ws5"];

const MODEL_A: &str = "A";

/// Links every condition shares: spoiler, body and the split chassis.
const COMMON_INSTALLS: &[(&str, &str)] = &[
    ("car", "sp"),
    ("car", "bo"),
    ("car", "a2"),
    ("a2", "a3"),
    ("a2", "a6"),
];

/// (event type, main, removed, station, rename)
type StepRow = (
    &'static str,
    &'static str,
    &'static [&'static str],
    &'static str,
    Option<&'static str>,
);

const COMMON_STEPS: &[StepRow] = &[
    ("d1", "car", &["sp"], "ws1", Some("a1")),
    ("d2", "a1", &["a2", "bo"], "ws1", None),
];

struct ConditionRow {
    code: &'static str,
    label: &'static str,
    installs: &'static [(&'static str, &'static str)],
    steps: &'static [StepRow],
}

const CONDITIONS: &[ConditionRow] = &[
    ConditionRow {
        code: "TD",
        label: "Target Disassembly",
        installs: &[
            ("a6", "bt"),
            ("a3", "ft"),
            ("a3", "a5"),
            ("a5", "sd"),
            ("a6", "rt"),
            ("a6", "mo"),
            ("a6", "ho"),
            ("a6", "a10"),
            ("a10", "a11"),
            ("a11", "ld"),
        ],
        steps: &[
            ("d3", "a2", &["a3", "a6"], "ws2", None),
            ("d4", "a3", &["ft"], "ws4", Some("a4")),
            ("d5", "a4", &["a5"], "ws4", None),
            ("d6", "a5", &["sd"], "ws4", None),
            ("d7", "a6", &["bt"], "ws3", Some("a7")),
            ("d8", "a7", &["rt"], "ws3", Some("a9")),
            ("d9", "a9", &["mo", "ho", "a10"], "ws5", None),
            ("d10", "a10", &["a11"], "ws5", None),
            ("d11", "a11", &["ld"], "ws5", None),
        ],
    },
    ConditionRow {
        code: "MD",
        label: "Motor Damage",
        installs: &[("a6", "rt"), ("a6", "ho"), ("a6", "md")],
        steps: &[
            ("d8", "a2", &["rt"], "ws3", Some("a8")),
            ("d9", "a8", &["md", "ho"], "ws5", None),
        ],
    },
    ConditionRow {
        code: "DD",
        label: "Damper Damage",
        installs: &[("a6", "rt"), ("a3", "ft"), ("a3", "a5"), ("a5", "dd")],
        steps: &[
            ("d8", "a2", &["rt"], "ws3", Some("a8")),
            ("d5", "a8", &["dd"], "ws4", None),
        ],
    },
];

impl Catalog {
    /// The reference catalog used by the demo run.
    pub fn standard() -> Result<Catalog, CatalogError> {
        standard_builder()?.build()
    }
}

/// The reference catalog as an unfrozen builder, for callers that extend it.
pub fn standard_builder() -> Result<CatalogBuilder, CatalogError> {
    let mut b = CatalogBuilder::new();
    let model = b.register_car_model(MODEL_A);
    for &(name, label, minutes) in EVENT_TYPES {
        let id = b.register_event_type(name, label);
        b.set_duration(model, id, minutes)?;
    }
    for &name in STATIONS {
        b.register_station(name);
    }

    for row in CONDITIONS {
        let condition = b.register_condition(row.code, row.label);
        for &(parent, child) in COMMON_INSTALLS.iter().chain(row.installs) {
            b.install(condition, parent, child)?;
        }
        for &(event, main, remove, station, rename) in COMMON_STEPS.iter().chain(row.steps) {
            let step = StepDef {
                event_type: b
                    .event_type_id(event)
                    .ok_or_else(|| CatalogError::UnknownEventType(event.to_string()))?,
                main: main.to_string(),
                remove: remove.iter().map(|s| s.to_string()).collect(),
                station: b
                    .station_id(station)
                    .ok_or_else(|| CatalogError::UnknownStation(station.to_string()))?,
                rename_to: rename.map(str::to_string),
            };
            b.add_step(condition, step)?;
        }
    }
    Ok(b)
}
