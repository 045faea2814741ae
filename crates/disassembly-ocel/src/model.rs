//! OCEL 2.0 JSON document types.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// `Input component` event-to-object qualifier.
pub const INPUT_COMPONENT: &str = "Input component";
/// `Output component` event-to-object qualifier.
pub const OUTPUT_COMPONENT: &str = "Output component";
/// `Station` event-to-object qualifier.
pub const STATION: &str = "Station";
/// `Parent component` object-to-object qualifier.
pub const PARENT_COMPONENT: &str = "Parent component";

/// Timestamp layout of every `time` field and time-valued attribute.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Render a timestamp in [`TIME_FORMAT`].
pub fn format_time(time: DateTime<Utc>) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Parse a timestamp written in [`TIME_FORMAT`].
pub fn parse_time(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, TIME_FORMAT).map(|naive| naive.and_utc())
}

/// A whole event log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcelLog {
    pub object_types: Vec<OcelType>,
    pub event_types: Vec<OcelType>,
    pub objects: Vec<OcelObject>,
    pub events: Vec<OcelEvent>,
}

/// An object or event type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcelType {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: AttributeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Integer,
    Float,
    Boolean,
    Time,
}

/// An attribute value. Integers stay integers through a JSON round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub object_id: String,
    pub qualifier: String,
}

impl Relationship {
    pub fn new(object_id: impl Into<String>, qualifier: &str) -> Self {
        Self {
            object_id: object_id.into(),
            qualifier: qualifier.to_string(),
        }
    }
}

/// A time-stamped object attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectAttribute {
    pub name: String,
    pub time: String,
    pub value: AttributeValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAttribute {
    pub name: String,
    pub value: AttributeValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcelObject {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<ObjectAttribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
}

impl OcelObject {
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.iter().find(|a| a.name == name).map(|a| &a.value)
    }

    /// Target of the first relationship with `qualifier`.
    pub fn related(&self, qualifier: &str) -> Option<&str> {
        self.relationships
            .iter()
            .find(|r| r.qualifier == qualifier)
            .map(|r| r.object_id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcelEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub time: String,
    #[serde(default)]
    pub attributes: Vec<EventAttribute>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl OcelEvent {
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.iter().find(|a| a.name == name).map(|a| &a.value)
    }

    /// Targets of every relationship with `qualifier`, in order.
    pub fn related<'a>(&'a self, qualifier: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.relationships
            .iter()
            .filter(move |r| r.qualifier == qualifier)
            .map(|r| r.object_id.as_str())
    }
}

impl OcelLog {
    pub fn object(&self, id: &str) -> Option<&OcelObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn object_type(&self, name: &str) -> Option<&OcelType> {
        self.object_types.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn time_format_round_trips() {
        let t = Utc.with_ymd_and_hms(2023, 12, 22, 10, 0, 0).unwrap();
        assert_eq!(format_time(t), "2023-12-22T10:00:00Z");
        assert_eq!(parse_time("2023-12-22T10:00:00Z").unwrap(), t);
        assert!(parse_time("22.12.2023 10:00").is_err());
    }

    #[test]
    fn json_field_names() {
        let object = OcelObject {
            id: "sp_1".to_string(),
            object_type: "sp".to_string(),
            attributes: vec![],
            relationships: vec![Relationship::new("car_1", PARENT_COMPONENT)],
        };
        let json = serde_json::to_value(&object).unwrap();
        assert_eq!(json["type"], "sp");
        assert_eq!(json["relationships"][0]["objectId"], "car_1");
        assert!(json.get("attributes").is_none());

        let log = OcelLog::default();
        let json = serde_json::to_value(&log).unwrap();
        assert!(json.get("objectTypes").is_some());
        assert!(json.get("eventTypes").is_some());
    }

    #[test]
    fn attribute_values_keep_their_kind() {
        let attrs: Vec<EventAttribute> =
            serde_json::from_str(r#"[{"name": "lot", "value": 7}, {"name": "start_time", "value": "2023-12-22T07:00:00Z"}]"#)
                .unwrap();
        assert_eq!(attrs[0].value.as_i64(), Some(7));
        assert_eq!(attrs[1].value.as_str(), Some("2023-12-22T07:00:00Z"));
    }

    #[test]
    fn declared_attribute_types_are_lowercase() {
        let decl = AttributeDecl {
            name: "car_number".to_string(),
            value_type: AttributeType::Integer,
        };
        assert_eq!(
            serde_json::to_string(&decl).unwrap(),
            r#"{"name":"car_number","type":"integer"}"#
        );
    }
}
