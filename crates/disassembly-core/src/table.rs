//! Flat, append-only record tables produced by the simulator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Suffix of the single instance of every workstation type.
pub const STATION_INSTANCE_SUFFIX: &str = "_1";

/// Object identifier of the single instance of workstation type `station`.
pub fn station_instance_id(station: &str) -> String {
    format!("{station}{STATION_INSTANCE_SUFFIX}")
}

/// One disassembly event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// `e{sequence}`.
    pub id: String,
    pub sequence: u64,
    pub event_type: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Main component before the step, under its pre-step identifier.
    pub input_component: String,
    pub output_components: Vec<String>,
    /// Workstation instance, e.g. `ws1_1`.
    pub resource: String,
    /// Car instance number the event belongs to.
    pub lot: u32,
}

/// One component object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub id: String,
    pub object_type: String,
    /// `None` only for a car's root component.
    pub parent: Option<String>,
    /// Condition code, e.g. `TD`.
    pub condition: String,
    pub car_model: String,
    pub car_number: u32,
}

/// One workstation object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: String,
    pub resource_type: String,
}

macro_rules! record_table {
    ($(#[$meta:meta])* $name:ident, $record:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            rows: Vec<$record>,
        }

        impl $name {
            pub fn new() -> Self {
                Self { rows: Vec::new() }
            }

            pub fn push(&mut self, row: $record) {
                self.rows.push(row);
            }

            /// Append all rows of `other`, keeping their order.
            pub fn append(&mut self, other: &mut Self) {
                self.rows.append(&mut other.rows);
            }

            pub fn rows(&self) -> &[$record] {
                &self.rows
            }

            pub fn iter(&self) -> std::slice::Iter<'_, $record> {
                self.rows.iter()
            }

            pub fn last(&self) -> Option<&$record> {
                self.rows.last()
            }

            pub fn len(&self) -> usize {
                self.rows.len()
            }

            pub fn is_empty(&self) -> bool {
                self.rows.is_empty()
            }
        }

        impl From<Vec<$record>> for $name {
            fn from(rows: Vec<$record>) -> Self {
                Self { rows }
            }
        }

        impl Extend<$record> for $name {
            fn extend<I: IntoIterator<Item = $record>>(&mut self, iter: I) {
                self.rows.extend(iter);
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $record;
            type IntoIter = std::slice::Iter<'a, $record>;

            fn into_iter(self) -> Self::IntoIter {
                self.rows.iter()
            }
        }
    };
}

record_table!(
    /// Events of every simulated car, in emission order.
    EventTable,
    EventRecord
);
record_table!(
    /// Component objects of every simulated car, in recording order.
    ObjectTable,
    ObjectRecord
);
record_table!(
    /// Workstation objects.
    ResourceTable,
    ResourceRecord
);

impl ObjectTable {
    /// Root components (cars), in order.
    pub fn roots(&self) -> impl Iterator<Item = &ObjectRecord> {
        self.rows.iter().filter(|r| r.parent.is_none())
    }
}
