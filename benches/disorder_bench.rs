use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;
use std::hint::black_box;
use tbdisorder::context::SimulationContext;
use tbdisorder::core_types::ReplicaSeed;
use tbdisorder::disorder::PointDefectBuilder;
use tbdisorder::hamiltonian::HamiltonianAssembly;
use tbdisorder::orchestrator::{EnsembleOptions, ReplicaOrchestrator};
use tbdisorder::pipeline::{OnsiteStatistics, Pipeline};
use tbdisorder::store::JsonConfigStore;

// 128x128 cells, 2 orbitals (one Gaussian, one Uniform) and a 5% vacancy defect.
fn setup_context() -> SimulationContext {
    let store = JsonConfigStore::from_value(json!({
        "EnergyScale": 4.0,
        "NOrbitals": 2,
        "L": [128, 128],
        "Divisions": [1, 1],
        "Hamiltonian": {
            "Disorder": {
                "OrbitalNum": [0, 1],
                "OnsiteDisorderModelType": [1, 2],
                "OnsiteDisorderMeanValue": [0.0, 0.5],
                "OnsiteDisorderMeanStdv": [1.0, 2.0]
            },
            "StructuralDisorder": {
                "Vacancy": { "Concentration": 0.05 }
            }
        }
    }));
    SimulationContext::from_store(store, Some(4)).expect("Failed to build context")
}

fn criterion_benchmark(c: &mut Criterion) {
    let ctx = setup_context();
    let mut assembly =
        HamiltonianAssembly::construct(&ctx, &PointDefectBuilder, ReplicaSeed::new(7, 0).rng())
            .expect("Failed to assemble Hamiltonian");

    c.bench_function("generate_disorder (128x128, 2 orb)", |b| {
        b.iter(|| {
            assembly.generate_disorder().expect("realization failed");
            black_box(assembly.realization()[0])
        })
    });

    c.bench_function("construct assembly", |b| {
        b.iter(|| {
            HamiltonianAssembly::construct(
                black_box(&ctx),
                &PointDefectBuilder,
                ReplicaSeed::new(7, 0).rng(),
            )
            .expect("construct failed")
            .realization()
            .len()
        })
    });

    let pipeline = Pipeline::new().with_stage(OnsiteStatistics::new(2));
    let options = EnsembleOptions::builder().replicas(4).seed(11).build();
    let orchestrator = ReplicaOrchestrator::new(&ctx, &PointDefectBuilder);

    let mut group = c.benchmark_group("ensemble");
    group.sample_size(10);
    group.bench_function("4 replicas x 2 realizations", |b| {
        b.iter(|| orchestrator.run(black_box(&options), &pipeline).expect("run failed"))
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
