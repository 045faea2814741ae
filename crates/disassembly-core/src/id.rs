use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a component inside one car's ownership arena.
    pub struct ComponentKey;
}

/// Identifies a condition scenario in the catalog. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionId(pub u32);

/// Identifies a disassembly step type (`d1`..`d11` in the standard catalog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventTypeId(pub u32);

/// Identifies a workstation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StationId(pub u32);

/// Identifies a car model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarModelId(pub u32);

/// Whole minutes. All step durations are configured in minutes.
pub type Minutes = u32;
