//! A pulse absorbed by PML layers on a 2x2-rank plane.
//!
//! Demonstrates: parameters → decomposition → one solver per rank thread →
//! explicit steps with periodic diagnostics → energy drained by the layers.
//!
//! Set `RUST_LOG=yee_solver=debug` for per-rank solver logs.

use tracing_subscriber::EnvFilter;
use yee_bench::seed_pulse;
use yee_comm::{run_cluster, Boundaries, Decomposition};
use yee_core::{OrAbort, Params, Scalar, SimContext};
use yee_exec::ExecSerial;
use yee_grid::Grid;
use yee_solver::FieldSolver;

const STEPS: u64 = 400;
const REPORT_EVERY: u64 = 50;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .init();

    let params = Params::new()
        .with("periodic_boundary", [false, false])
        .with("conductor_boundary", [true; 4])
        .with("damping_boundary", [true; 4])
        .with("pml_length", 12)
        .with("fld_output_interval", REPORT_EVERY as i64);

    let global = Grid::builder(2).reso(&[128, 128]).build().or_abort();
    let boundaries = Boundaries::from_params(&params, global.dim()).or_abort();
    let decomposition = Decomposition::new(global.clone(), &[2, 2], boundaries).or_abort();
    let comms = decomposition.communicators(ExecSerial).or_abort();
    let dt = 0.5 * global.delta(0);

    println!("=== Yee PML pulse: 128x128 cells on 2x2 ranks ===\n");

    let history = run_cluster(comms, |comm| {
        let rank = comm.rank();
        let mut solver = FieldSolver::new(comm);
        let mut ctx = SimContext::new(params.clone());
        solver.init(&mut ctx).or_abort();
        seed_pulse(&mut solver, &global).or_abort();

        let mut energies: Vec<(u64, Scalar)> = vec![(0, solver.field_energy().or_abort())];
        for step in 1..=STEPS {
            solver.update(dt, step, step as Scalar * dt).or_abort();
            if step % REPORT_EVERY == 0 {
                let energy = solver.field_energy().or_abort();
                tracing::debug!(%rank, step, energy, "field energy");
                energies.push((step, energy));
            }
        }
        energies
    })
    .or_abort();

    // Every rank holds the same global totals.
    let energies = &history[0];
    let e0 = energies[0].1;
    for &(step, energy) in energies {
        println!(
            "  step {step:>4}: t={:>7.2}, energy={energy:>12.6e}, remaining={:>7.3}%",
            step as Scalar * dt,
            100.0 * energy / e0,
        );
    }
    let remaining = energies.last().map_or(e0, |&(_, e)| e) / e0;
    println!("\n{:.2}% of the initial energy left in the box", 100.0 * remaining);
}
