//! Event log back to tables.

use std::collections::HashSet;

use disassembly_core::table::*;

use crate::builder::{ATTR_CAR_NUMBER, ATTR_CAR_TYPE, ATTR_CONDITION, ATTR_LOT, ATTR_START_TIME};
use crate::error::OcelError;
use crate::model::*;
use crate::validate::validate;

/// The three simulator tables recovered from an event log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedTables {
    pub events: EventTable,
    pub objects: ObjectTable,
    pub resources: ResourceTable,
}

fn text_attribute(
    value: Option<&AttributeValue>,
    owner: &str,
    name: &'static str,
) -> Result<String, OcelError> {
    value
        .and_then(AttributeValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| OcelError::MissingAttribute {
            owner: owner.to_string(),
            name,
        })
}

fn u32_attribute(
    value: Option<&AttributeValue>,
    owner: &str,
    name: &'static str,
) -> Result<u32, OcelError> {
    value
        .and_then(AttributeValue::as_i64)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| OcelError::MissingAttribute {
            owner: owner.to_string(),
            name,
        })
}

fn time_value(value: &str, owner: &str) -> Result<chrono::DateTime<chrono::Utc>, OcelError> {
    parse_time(value).map_err(|e| OcelError::BadTimestamp {
        owner: owner.to_string(),
        value: value.to_string(),
        detail: e.to_string(),
    })
}

fn sequence_of(id: &str) -> Result<u64, OcelError> {
    id.strip_prefix('e')
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| OcelError::MalformedEventId(id.to_string()))
}

fn single_related<'a>(event: &'a OcelEvent, qualifier: &'static str) -> Result<&'a str, OcelError> {
    event
        .related(qualifier)
        .next()
        .ok_or_else(|| OcelError::MissingQualifier {
            event: event.id.clone(),
            qualifier,
        })
}

/// Re-derive the event, component and workstation tables.
///
/// Objects whose type declares no attributes are workstations; every other
/// object is a component. The log is validated first.
pub fn extract_tables(log: &OcelLog) -> Result<ExtractedTables, OcelError> {
    validate(log)?;
    let resource_types: HashSet<&str> = log
        .object_types
        .iter()
        .filter(|t| t.attributes.is_empty())
        .map(|t| t.name.as_str())
        .collect();

    let mut tables = ExtractedTables::default();
    for object in &log.objects {
        if resource_types.contains(object.object_type.as_str()) {
            tables.resources.push(ResourceRecord {
                id: object.id.clone(),
                resource_type: object.object_type.clone(),
            });
            continue;
        }
        tables.objects.push(ObjectRecord {
            id: object.id.clone(),
            object_type: object.object_type.clone(),
            parent: object.related(PARENT_COMPONENT).map(str::to_string),
            condition: text_attribute(
                object.attribute(ATTR_CONDITION),
                &object.id,
                ATTR_CONDITION,
            )?,
            car_model: text_attribute(object.attribute(ATTR_CAR_TYPE), &object.id, ATTR_CAR_TYPE)?,
            car_number: u32_attribute(
                object.attribute(ATTR_CAR_NUMBER),
                &object.id,
                ATTR_CAR_NUMBER,
            )?,
        });
    }

    for event in &log.events {
        let start = text_attribute(event.attribute(ATTR_START_TIME), &event.id, ATTR_START_TIME)?;
        tables.events.push(EventRecord {
            id: event.id.clone(),
            sequence: sequence_of(&event.id)?,
            event_type: event.event_type.clone(),
            start_time: time_value(&start, &event.id)?,
            end_time: time_value(&event.time, &event.id)?,
            input_component: single_related(event, INPUT_COMPONENT)?.to_string(),
            output_components: event.related(OUTPUT_COMPONENT).map(str::to_string).collect(),
            resource: single_related(event, STATION)?.to_string(),
            lot: u32_attribute(event.attribute(ATTR_LOT), &event.id, ATTR_LOT)?,
        });
    }
    Ok(tables)
}
