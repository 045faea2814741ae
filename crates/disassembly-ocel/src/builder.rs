//! Tables to event log.

use chrono::{DateTime, Utc};
use disassembly_core::table::{EventTable, ObjectTable, ResourceTable};
use tracing::info;

use crate::error::OcelError;
use crate::model::*;
use crate::validate::validate;

/// Component attribute holding the condition code.
pub const ATTR_CONDITION: &str = "condition";
/// Component attribute holding the car model.
pub const ATTR_CAR_TYPE: &str = "car_type";
/// Component attribute holding the car number.
pub const ATTR_CAR_NUMBER: &str = "car_number";
/// Event attribute holding the start timestamp.
pub const ATTR_START_TIME: &str = "start_time";
/// Event attribute holding the car number (lot).
pub const ATTR_LOT: &str = "lot";

fn decl(name: &str, value_type: AttributeType) -> AttributeDecl {
    AttributeDecl {
        name: name.to_string(),
        value_type,
    }
}

fn component_type(name: &str) -> OcelType {
    OcelType {
        name: name.to_string(),
        attributes: vec![
            decl(ATTR_CONDITION, AttributeType::String),
            decl(ATTR_CAR_TYPE, AttributeType::String),
            decl(ATTR_CAR_NUMBER, AttributeType::Integer),
        ],
    }
}

fn event_type(name: &str) -> OcelType {
    OcelType {
        name: name.to_string(),
        attributes: vec![
            decl(ATTR_START_TIME, AttributeType::Time),
            decl(ATTR_LOT, AttributeType::Integer),
        ],
    }
}

/// Append the declaration of `name` to `types` unless it is already listed.
/// A listed type of that name with other attributes is a conflict.
fn push_type(
    types: &mut Vec<OcelType>,
    kind: &'static str,
    name: &str,
    make: impl FnOnce(&str) -> OcelType,
) -> Result<(), OcelError> {
    let declared = make(name);
    match types.iter().find(|t| t.name == name) {
        Some(existing) if *existing == declared => Ok(()),
        Some(_) => Err(OcelError::ConflictingType {
            kind,
            name: name.to_string(),
        }),
        None => {
            types.push(declared);
            Ok(())
        }
    }
}

/// Convert the three tables to a validated event log.
///
/// Objects are components in table order followed by workstations; events
/// keep table order. Types are declared in first-seen order. Component
/// attributes are stamped with the Unix epoch.
pub fn build_ocel(
    events: &EventTable,
    objects: &ObjectTable,
    resources: &ResourceTable,
) -> Result<OcelLog, OcelError> {
    let epoch = format_time(DateTime::<Utc>::UNIX_EPOCH);
    let mut log = OcelLog::default();

    for row in objects {
        push_type(&mut log.object_types, "object", &row.object_type, component_type)?;
        let stamped = |name: &str, value: AttributeValue| ObjectAttribute {
            name: name.to_string(),
            time: epoch.clone(),
            value,
        };
        log.objects.push(OcelObject {
            id: row.id.clone(),
            object_type: row.object_type.clone(),
            attributes: vec![
                stamped(ATTR_CONDITION, AttributeValue::Text(row.condition.clone())),
                stamped(ATTR_CAR_TYPE, AttributeValue::Text(row.car_model.clone())),
                stamped(ATTR_CAR_NUMBER, AttributeValue::Integer(i64::from(row.car_number))),
            ],
            relationships: row
                .parent
                .iter()
                .map(|parent| Relationship::new(parent.as_str(), PARENT_COMPONENT))
                .collect(),
        });
    }

    for row in resources {
        push_type(&mut log.object_types, "object", &row.resource_type, |name| OcelType {
            name: name.to_string(),
            attributes: Vec::new(),
        })?;
        log.objects.push(OcelObject {
            id: row.id.clone(),
            object_type: row.resource_type.clone(),
            attributes: Vec::new(),
            relationships: Vec::new(),
        });
    }

    for row in events {
        push_type(&mut log.event_types, "event", &row.event_type, event_type)?;
        let mut relationships = Vec::with_capacity(row.output_components.len() + 2);
        relationships.push(Relationship::new(row.input_component.as_str(), INPUT_COMPONENT));
        relationships.extend(
            row.output_components
                .iter()
                .map(|id| Relationship::new(id.as_str(), OUTPUT_COMPONENT)),
        );
        relationships.push(Relationship::new(row.resource.as_str(), STATION));

        log.events.push(OcelEvent {
            id: row.id.clone(),
            event_type: row.event_type.clone(),
            time: format_time(row.end_time),
            attributes: vec![
                EventAttribute {
                    name: ATTR_START_TIME.to_string(),
                    value: AttributeValue::Text(format_time(row.start_time)),
                },
                EventAttribute {
                    name: ATTR_LOT.to_string(),
                    value: AttributeValue::Integer(i64::from(row.lot)),
                },
            ],
            relationships,
        });
    }

    validate(&log)?;
    info!(
        objects = log.objects.len(),
        events = log.events.len(),
        object_types = log.object_types.len(),
        event_types = log.event_types.len(),
        "Event log built"
    );
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use disassembly_core::table::{ObjectRecord, ResourceRecord};
    use disassembly_core::test_utils::*;

    fn reference_log() -> OcelLog {
        let out = simulate_standard(&[("TD", 1), ("DD", 1)]);
        build_ocel(&out.events, &out.objects, &out.resources).unwrap()
    }

    #[test]
    fn first_event_of_the_run() {
        let log = reference_log();
        let e1 = &log.events[0];
        assert_eq!(e1.id, "e1");
        assert_eq!(e1.event_type, "d1");
        // Spoiling takes 180 minutes.
        assert_eq!(e1.time, "2023-12-22T10:00:00Z");
        assert_eq!(
            e1.attribute(ATTR_START_TIME).and_then(AttributeValue::as_str),
            Some("2023-12-22T07:00:00Z")
        );
        assert_eq!(e1.attribute(ATTR_LOT).and_then(AttributeValue::as_i64), Some(1));

        let rels: Vec<(&str, &str)> = e1
            .relationships
            .iter()
            .map(|r| (r.qualifier.as_str(), r.object_id.as_str()))
            .collect();
        assert_eq!(
            rels,
            [
                (INPUT_COMPONENT, "car_1"),
                (OUTPUT_COMPONENT, "sp_1"),
                (OUTPUT_COMPONENT, "a1_1"),
                (STATION, "ws1_1"),
            ]
        );
    }

    #[test]
    fn components_carry_attributes_and_parent() {
        let log = reference_log();
        let root = log.object("car_2").unwrap();
        assert!(root.relationships.is_empty());
        assert_eq!(root.attribute(ATTR_CONDITION).and_then(AttributeValue::as_str), Some("DD"));
        assert_eq!(root.attribute(ATTR_CAR_TYPE).and_then(AttributeValue::as_str), Some("A"));
        assert_eq!(root.attributes[0].time, "1970-01-01T00:00:00Z");

        let dd = log.object("dd_2").unwrap();
        assert_eq!(dd.related(PARENT_COMPONENT), Some("a8_2"));
    }

    #[test]
    fn workstations_are_attribute_less_objects() {
        let log = reference_log();
        let ws3 = log.object("ws3_1").unwrap();
        assert_eq!(ws3.object_type, "ws3");
        assert!(ws3.attributes.is_empty());
        assert!(log.object_type("ws3").unwrap().attributes.is_empty());
        assert_eq!(log.object_type("car").unwrap().attributes.len(), 3);
    }

    #[test]
    fn types_listed_once_in_first_seen_order() {
        let log = reference_log();
        let objects: Vec<&str> = log.object_types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(&objects[..3], ["car", "sp", "a1"]);
        assert_eq!(objects.last(), Some(&"ws5"));
        let events: Vec<&str> = log.event_types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            events,
            ["d1", "d2", "d3", "d4", "d5", "d6", "d7", "d8", "d9", "d10", "d11"]
        );
    }

    #[test]
    fn output_mirrors_input_order() {
        let out = simulate_standard(&[("MD", 2)]);
        let log = build_ocel(&out.events, &out.objects, &out.resources).unwrap();
        let table_ids: Vec<&str> = out.events.iter().map(|e| e.id.as_str()).collect();
        let log_ids: Vec<&str> = log.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(table_ids, log_ids);
        assert_eq!(log.objects.len(), out.objects.len() + out.resources.len());
    }

    #[test]
    fn dangling_parent_is_rejected() {
        let objects = ObjectTable::from(vec![ObjectRecord {
            id: "sp_1".to_string(),
            object_type: "sp".to_string(),
            parent: Some("car_1".to_string()),
            condition: "TD".to_string(),
            car_model: "A".to_string(),
            car_number: 1,
        }]);
        let err = build_ocel(&EventTable::new(), &objects, &ResourceTable::new()).unwrap_err();
        assert!(matches!(
            err,
            OcelError::DanglingReference { ref target, .. } if target == "car_1"
        ));
    }

    #[test]
    fn workstation_named_like_component_type_is_rejected() {
        let objects = ObjectTable::from(vec![ObjectRecord {
            id: "ws1_7".to_string(),
            object_type: "ws1".to_string(),
            parent: None,
            condition: "TD".to_string(),
            car_model: "A".to_string(),
            car_number: 7,
        }]);
        let resources = ResourceTable::from(vec![ResourceRecord {
            id: "ws1_1".to_string(),
            resource_type: "ws1".to_string(),
        }]);
        let err = build_ocel(&EventTable::new(), &objects, &resources).unwrap_err();
        assert!(matches!(
            err,
            OcelError::ConflictingType { kind: "object", ref name } if name == "ws1"
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let resources = ResourceTable::from(vec![
            ResourceRecord {
                id: "ws1_1".to_string(),
                resource_type: "ws1".to_string(),
            },
            ResourceRecord {
                id: "ws1_1".to_string(),
                resource_type: "ws1".to_string(),
            },
        ]);
        let err = build_ocel(&EventTable::new(), &ObjectTable::new(), &resources).unwrap_err();
        assert!(matches!(err, OcelError::DuplicateObject(ref id) if id == "ws1_1"));
    }
}
