//! Disassembly Core -- the discrete-event simulation of electric-vehicle
//! disassembly.
//!
//! This crate owns the configuration tables, the per-car component tree and
//! the simulator that turns a scenario plan into flat event and object tables.
//!
//! # Pipeline
//!
//! 1. **Plan** -- Number every requested car and place it on the time line;
//!    each car starts when the previous one ends.
//! 2. **Factory** -- Build the car's component tree from its condition's
//!    install plan.
//! 3. **Disassembly** -- Apply the condition's recipe step by step, stamping
//!    each event with its (model x step) duration.
//! 4. **Collect** -- Concatenate the per-car rows in car order.
//!
//! ```rust,ignore
//! let catalog = Catalog::standard()?;
//! let plan = ScenarioPlan::from_names(&catalog, "A", &[("TD", 70), ("MD", 30), ("DD", 20)])?;
//! let output = Simulator::new(&catalog).simulate(&plan, start_time)?;
//! ```
//!
//! # Key Types
//!
//! - [`catalog::Catalog`] -- Frozen conditions, step types, workstations,
//!   car models and durations.
//! - [`component::Car`] -- Arena-owned component tree of one car.
//! - [`simulator::Simulator`] -- Plans and runs scenario plans.
//! - [`table::EventTable`] / [`table::ObjectTable`] -- Append-only output rows.

pub mod catalog;
pub mod component;
pub mod id;
pub mod simulator;
pub mod standard;
pub mod table;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
