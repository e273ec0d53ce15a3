//! Criterion micro-benchmarks for field updates and diagnostics.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use yee_bench::{layered_profile, reference_profile, stress_profile};
use yee_core::Scalar;
use yee_exec::{ExecRayon, ExecSerial};

/// Benchmark: One explicit leapfrog step on the 64x64 plane, serial.
fn bench_explicit_serial_64x64(c: &mut Criterion) {
    let profile = reference_profile().unwrap();
    let (mut solver, _ctx) = profile.single(ExecSerial).unwrap();
    let dt = profile.dt();

    c.bench_function("explicit_serial_64x64", |b| {
        b.iter(|| {
            solver.update_explicit(black_box(dt), 0.0).unwrap();
        });
    });
}

/// Benchmark: The same step dispatched over the rayon global pool.
fn bench_explicit_rayon_64x64(c: &mut Criterion) {
    let profile = reference_profile().unwrap();
    let (mut solver, _ctx) = profile.single(ExecRayon::new()).unwrap();
    let dt = profile.dt();

    c.bench_function("explicit_rayon_64x64", |b| {
        b.iter(|| {
            solver.update_explicit(black_box(dt), 0.0).unwrap();
        });
    });
}

/// Benchmark: Explicit step with 8-cell absorbing layers on every face.
fn bench_explicit_pml_64x64(c: &mut Criterion) {
    let profile = layered_profile().unwrap();
    let (mut solver, _ctx) = profile.single(ExecSerial).unwrap();
    let dt = profile.dt();

    c.bench_function("explicit_pml_64x64", |b| {
        b.iter(|| {
            solver.update_explicit(black_box(dt), 0.0).unwrap();
        });
    });
}

/// Benchmark: Semi-implicit step with the default sweep settings.
fn bench_semi_implicit_64x64(c: &mut Criterion) {
    let profile = reference_profile().unwrap();
    let (mut solver, _ctx) = profile.single(ExecSerial).unwrap();
    let dt = profile.dt();

    c.bench_function("semi_implicit_64x64", |b| {
        b.iter(|| {
            solver.update_semi_implicit(black_box(dt), 0.5, 0.5, 0.0).unwrap();
        });
    });
}

/// Benchmark: Explicit step on the 48^3 cube, serial against rayon.
fn bench_explicit_cube(c: &mut Criterion) {
    let profile = stress_profile().unwrap();
    let dt = profile.dt();
    let mut group = c.benchmark_group("explicit_48cube");
    group.sample_size(20);

    let (mut serial, _ctx_s) = profile.single(ExecSerial).unwrap();
    group.bench_function("serial", |b| {
        b.iter(|| serial.update_explicit(black_box(dt), 0.0).unwrap());
    });
    let (mut rayon, _ctx_r) = profile.single(ExecRayon::new()).unwrap();
    group.bench_function("rayon", |b| {
        b.iter(|| rayon.update_explicit(black_box(dt), 0.0).unwrap());
    });
    group.finish();
}

/// Benchmark: Every diagnostic plus total energy on the 64x64 plane.
fn bench_diagnostics_64x64(c: &mut Criterion) {
    let profile = reference_profile().unwrap();
    let (mut solver, _ctx) = profile.single(ExecSerial).unwrap();

    c.bench_function("diagnostics_64x64", |b| {
        b.iter(|| {
            solver.compute_divs_e_b().unwrap();
            solver.compute_flux().unwrap();
            solver.compute_eb_sqr().unwrap();
            let energy: Scalar = solver.field_energy().unwrap();
            black_box(energy);
        });
    });
}

criterion_group!(
    benches,
    bench_explicit_serial_64x64,
    bench_explicit_rayon_64x64,
    bench_explicit_pml_64x64,
    bench_semi_implicit_64x64,
    bench_explicit_cube,
    bench_diagnostics_64x64
);
criterion_main!(benches);
