//! Criterion benchmarks for the disassembly simulator.
//!
//! Two benchmark groups:
//! - `reference_run`: the 70 TD + 30 MD + 20 DD run on the standard catalog
//! - `single_car`: factory plus disassembly of one car per condition

use criterion::{criterion_group, criterion_main, Criterion};
use disassembly_core::simulator::{car_factory, disassemble_car, ScenarioPlan, Simulator};
use disassembly_core::test_utils::*;

fn bench_reference_run(c: &mut Criterion) {
    let catalog = standard_catalog();
    let plan = ScenarioPlan::from_names(&catalog, "A", &[("TD", 70), ("MD", 30), ("DD", 20)])
        .unwrap();
    let sim = Simulator::new(&catalog);

    let mut group = c.benchmark_group("reference_run");
    group.bench_function("plan_120_cars", |b| {
        b.iter(|| sim.plan_cars(&plan, reference_start()).unwrap());
    });
    group.bench_function("simulate_120_cars", |b| {
        b.iter(|| sim.simulate(&plan, reference_start()).unwrap());
    });
    group.finish();
}

fn bench_single_car(c: &mut Criterion) {
    let catalog = standard_catalog();
    let model = catalog.car_model_id("A").unwrap();

    let mut group = c.benchmark_group("single_car");
    for code in ["TD", "MD", "DD"] {
        let condition = catalog.condition_id(code).unwrap();
        group.bench_function(code, |b| {
            b.iter(|| {
                let car = car_factory(&catalog, model, condition, 1).unwrap();
                disassemble_car(&catalog, car, reference_start(), 1).unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reference_run, bench_single_car);
criterion_main!(benches);
