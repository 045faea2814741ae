//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use chrono::{DateTime, TimeZone, Utc};

use crate::catalog::Catalog;
use crate::simulator::{ScenarioPlan, SimulationOutput, Simulator};

/// Start of the reference run: 2023-12-22 07:00 UTC.
pub fn reference_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 12, 22, 7, 0, 0)
        .single()
        .expect("valid reference start time")
}

pub fn standard_catalog() -> Catalog {
    Catalog::standard().expect("standard catalog builds")
}

/// Simulate `counts` of `(condition code, count)` on model `A` of the
/// standard catalog.
pub fn simulate_standard(counts: &[(&str, u32)]) -> SimulationOutput {
    let catalog = standard_catalog();
    let plan = ScenarioPlan::from_names(&catalog, "A", counts).expect("known conditions");
    Simulator::new(&catalog)
        .simulate(&plan, reference_start())
        .expect("standard simulation succeeds")
}

/// The 70 TD + 30 MD + 20 DD reference run.
pub fn simulate_reference() -> SimulationOutput {
    simulate_standard(&[("TD", 70), ("MD", 30), ("DD", 20)])
}
