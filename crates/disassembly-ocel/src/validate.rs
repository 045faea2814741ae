//! Structural checks on an event log.

use std::collections::HashSet;

use crate::error::OcelError;
use crate::model::{OcelLog, OcelType};

fn declared_names<'a>(
    types: &'a [OcelType],
    kind: &'static str,
) -> Result<HashSet<&'a str>, OcelError> {
    let mut names = HashSet::with_capacity(types.len());
    for t in types {
        if !names.insert(t.name.as_str()) {
            return Err(OcelError::ConflictingType {
                kind,
                name: t.name.clone(),
            });
        }
    }
    Ok(names)
}

/// Check that type names and ids are unique, every type used is declared
/// and every relationship targets an existing object.
pub fn validate(log: &OcelLog) -> Result<(), OcelError> {
    let object_types = declared_names(&log.object_types, "object")?;
    let event_types = declared_names(&log.event_types, "event")?;

    let mut object_ids = HashSet::with_capacity(log.objects.len());
    for object in &log.objects {
        if !object_ids.insert(object.id.as_str()) {
            return Err(OcelError::DuplicateObject(object.id.clone()));
        }
        if !object_types.contains(object.object_type.as_str()) {
            return Err(OcelError::UndeclaredType {
                kind: "object",
                name: object.object_type.clone(),
            });
        }
    }

    for object in &log.objects {
        for rel in &object.relationships {
            if !object_ids.contains(rel.object_id.as_str()) {
                return Err(OcelError::DanglingReference {
                    from: object.id.clone(),
                    target: rel.object_id.clone(),
                    qualifier: rel.qualifier.clone(),
                });
            }
        }
    }

    let mut event_ids = HashSet::with_capacity(log.events.len());
    for event in &log.events {
        if !event_ids.insert(event.id.as_str()) {
            return Err(OcelError::DuplicateEvent(event.id.clone()));
        }
        if !event_types.contains(event.event_type.as_str()) {
            return Err(OcelError::UndeclaredType {
                kind: "event",
                name: event.event_type.clone(),
            });
        }
        for rel in &event.relationships {
            if !object_ids.contains(rel.object_id.as_str()) {
                return Err(OcelError::DanglingReference {
                    from: event.id.clone(),
                    target: rel.object_id.clone(),
                    qualifier: rel.qualifier.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;

    fn small_log() -> OcelLog {
        OcelLog {
            object_types: vec![
                OcelType {
                    name: "car".to_string(),
                    attributes: vec![],
                },
                OcelType {
                    name: "ws1".to_string(),
                    attributes: vec![],
                },
            ],
            event_types: vec![OcelType {
                name: "d1".to_string(),
                attributes: vec![],
            }],
            objects: vec![
                OcelObject {
                    id: "car_1".to_string(),
                    object_type: "car".to_string(),
                    attributes: vec![],
                    relationships: vec![],
                },
                OcelObject {
                    id: "ws1_1".to_string(),
                    object_type: "ws1".to_string(),
                    attributes: vec![],
                    relationships: vec![],
                },
            ],
            events: vec![OcelEvent {
                id: "e1".to_string(),
                event_type: "d1".to_string(),
                time: "2023-12-22T10:00:00Z".to_string(),
                attributes: vec![],
                relationships: vec![
                    Relationship::new("car_1", INPUT_COMPONENT),
                    Relationship::new("ws1_1", STATION),
                ],
            }],
        }
    }

    #[test]
    fn consistent_log_passes() {
        assert!(validate(&small_log()).is_ok());
    }

    #[test]
    fn event_reference_to_missing_object() {
        let mut log = small_log();
        log.events[0]
            .relationships
            .push(Relationship::new("sp_1", OUTPUT_COMPONENT));
        match validate(&log) {
            Err(OcelError::DanglingReference {
                from,
                target,
                qualifier,
            }) => {
                assert_eq!(from, "e1");
                assert_eq!(target, "sp_1");
                assert_eq!(qualifier, OUTPUT_COMPONENT);
            }
            other => panic!("expected DanglingReference, got: {other:?}"),
        }
    }

    #[test]
    fn parent_may_appear_later_in_the_list() {
        let mut log = small_log();
        log.objects.insert(
            0,
            OcelObject {
                id: "sp_1".to_string(),
                object_type: "car".to_string(),
                attributes: vec![],
                relationships: vec![Relationship::new("car_1", PARENT_COMPONENT)],
            },
        );
        assert!(validate(&log).is_ok());
    }

    #[test]
    fn duplicate_event_id() {
        let mut log = small_log();
        let copy = log.events[0].clone();
        log.events.push(copy);
        assert!(matches!(validate(&log), Err(OcelError::DuplicateEvent(ref id)) if id == "e1"));
    }

    #[test]
    fn object_type_declared_twice() {
        let mut log = small_log();
        log.object_types.push(OcelType {
            name: "ws1".to_string(),
            attributes: vec![],
        });
        assert!(matches!(
            validate(&log),
            Err(OcelError::ConflictingType { kind: "object", ref name }) if name == "ws1"
        ));
    }

    #[test]
    fn undeclared_event_type() {
        let mut log = small_log();
        log.events[0].event_type = "d12".to_string();
        assert!(matches!(
            validate(&log),
            Err(OcelError::UndeclaredType { kind: "event", ref name }) if name == "d12"
        ));
    }
}
