//! Criterion micro-benchmarks for guard exchange and particle routing.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use yee_comm::{run_cluster, Boundaries, BoundaryKind, DomainComm};
use yee_exec::ExecSerial;
use yee_field::VectorField;
use yee_grid::{FieldType, Grid};
use yee_test_utils::{decomposition, fill_random, SeededUniform, TestParticle};

/// Benchmark: Periodic self-exchange of an edge-centred field on a 32^3 cube.
fn bench_guard_exchange_periodic_32cube(c: &mut Criterion) {
    let grid = Arc::new(Grid::builder(3).reso(&[32, 32, 32]).build().unwrap());
    let mut comm = DomainComm::single(ExecSerial, Arc::clone(&grid), Boundaries::periodic()).unwrap();
    let mut field = VectorField::new(grid, FieldType::EdgeCentered, &ExecSerial).unwrap();
    fill_random(&mut field, 1, 1.0);

    c.bench_function("guard_exchange_periodic_32cube", |b| {
        b.iter(|| {
            comm.exchange_guards(black_box(&mut field)).unwrap();
        });
    });
}

/// Benchmark: Conductor boundary fill of a face-centred field on a 32^3 cube.
fn bench_guard_exchange_conductor_32cube(c: &mut Criterion) {
    let grid = Arc::new(Grid::builder(3).reso(&[32, 32, 32]).build().unwrap());
    let boundaries = Boundaries::uniform(BoundaryKind::Conductor);
    let mut comm = DomainComm::single(ExecSerial, Arc::clone(&grid), boundaries).unwrap();
    let mut field = VectorField::new(grid, FieldType::FaceCentered, &ExecSerial).unwrap();
    fill_random(&mut field, 2, 1.0);

    c.bench_function("guard_exchange_conductor_32cube", |b| {
        b.iter(|| {
            comm.exchange_guards(black_box(&mut field)).unwrap();
        });
    });
}

/// Benchmark: 2x2 ranks, 10 guard exchanges per rank per run, thread
/// start-up included.
fn bench_cluster_exchange_2x2(c: &mut Criterion) {
    c.bench_function("cluster_exchange_2x2", |b| {
        b.iter(|| {
            let comms = decomposition(&[64, 64], 1, &[2, 2], Boundaries::periodic())
                .communicators(ExecSerial)
                .unwrap();
            run_cluster(comms, |mut comm| {
                let grid = Arc::clone(comm.grid());
                let mut field = VectorField::new(grid, FieldType::EdgeCentered, &ExecSerial).unwrap();
                for _ in 0..10 {
                    comm.exchange_guards(&mut field).unwrap();
                }
                black_box(field.component(0).get(yee_grid::Index::new(0, 0, 0)))
            })
            .unwrap()
        });
    });
}

/// Benchmark: Route 1000 particles per rank, a tenth of them leaving, on
/// 2x2 ranks.
fn bench_particle_exchange_2x2(c: &mut Criterion) {
    c.bench_function("particle_exchange_2x2", |b| {
        b.iter(|| {
            let comms = decomposition(&[64, 64], 1, &[2, 2], Boundaries::periodic())
                .communicators(ExecSerial)
                .unwrap();
            run_cluster(comms, |mut comm| {
                let mut rng = SeededUniform::new(comm.rank().0 as u64);
                let mut particles: Vec<TestParticle> = (0..1000u32)
                    .map(|id| {
                        // Cells in [-2, 34): roughly 11% outside [0, 32) per axis.
                        let mut cell = || (16.0 + 18.0 * rng.sample()).floor() as i64;
                        TestParticle::new([cell(), cell(), 0], id)
                    })
                    .collect();
                let stats = comm.exchange_particles(&mut particles).unwrap();
                black_box(stats.sent)
            })
            .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_guard_exchange_periodic_32cube,
    bench_guard_exchange_conductor_32cube,
    bench_cluster_exchange_2x2,
    bench_particle_exchange_2x2
);
criterion_main!(benches);
