//! Benchmark profiles and utilities for the Yee field solver.
//!
//! Provides pre-built [`Profile`]s for benchmarking and demos:
//!
//! - [`reference_profile`]: 64x64 periodic plane, one rank
//! - [`layered_profile`]: the same plane closed by conductors with absorbing
//!   layers on every face
//! - [`stress_profile`]: 48^3 periodic cube
//! - [`seed_pulse`]: a centred Gaussian `E_z` pulse

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use yee_comm::{BoundaryKind, Boundaries, Decomposition, DomainComm, Transport};
use yee_core::{ConfigError, Params, Scalar, SimContext, SolverError, AXES};
use yee_exec::ExecPolicy;
use yee_grid::Grid;
use yee_solver::FieldSolver;
use yee_test_utils::gaussian;

/// A global problem: geometry, rank split, boundaries and solver parameters.
#[derive(Clone, Debug)]
pub struct Profile {
    pub global: Grid,
    pub ranks: Vec<usize>,
    pub boundaries: Boundaries,
    pub params: Params,
}

impl Profile {
    /// Split the global grid over `ranks`.
    pub fn decomposition(&self) -> Result<Decomposition, ConfigError> {
        Decomposition::new(self.global.clone(), &self.ranks, self.boundaries)
    }

    /// 90% of the explicit stability limit of the global spacing.
    pub fn dt(&self) -> Scalar {
        let inv: Scalar = (0..self.global.dim())
            .map(|d| 1.0 / (self.global.delta(d) * self.global.delta(d)))
            .sum();
        0.9 / inv.sqrt()
    }

    /// The whole domain on one subdomain, initialised and seeded with
    /// [`seed_pulse`].
    pub fn single<P: ExecPolicy>(&self, policy: P) -> Result<(FieldSolver<P>, SimContext), SolverError> {
        let comm = DomainComm::single(policy, Arc::new(self.global.clone()), self.boundaries)?;
        let mut solver = FieldSolver::new(comm);
        let mut ctx = SimContext::new(self.params.clone());
        solver.init(&mut ctx)?;
        seed_pulse(&mut solver, &self.global)?;
        Ok((solver, ctx))
    }
}

/// Overwrite `E_z` with a Gaussian centred in the global domain, one
/// eighth of the shortest active extent wide, then refresh the guards.
pub fn seed_pulse<P: ExecPolicy, T: Transport>(
    solver: &mut FieldSolver<P, T>,
    global: &Grid,
) -> Result<(), SolverError> {
    let dim = global.dim();
    let center: [Scalar; AXES] = std::array::from_fn(|d| 0.5 * (global.global_lower(d) + global.global_upper(d)));
    let width = (0..dim)
        .map(|d| global.global_upper(d) - global.global_lower(d))
        .fold(Scalar::INFINITY, Scalar::min)
        / 8.0;
    solver
        .fields()?
        .e
        .write()?
        .set_values(2, |p| (0..dim).map(|d| gaussian(p[d], center[d], width)).product());
    solver.exchange_fields()
}

/// 64x64 periodic plane (4096 cells), explicit updates.
pub fn reference_profile() -> Result<Profile, ConfigError> {
    Ok(Profile {
        global: Grid::builder(2).reso(&[64, 64]).build()?,
        ranks: vec![1, 1],
        boundaries: Boundaries::periodic(),
        params: Params::new(),
    })
}

/// [`reference_profile`] with conducting walls and 8-cell absorbing layers
/// on all four faces.
pub fn layered_profile() -> Result<Profile, ConfigError> {
    Ok(Profile {
        boundaries: Boundaries::uniform(BoundaryKind::Conductor),
        params: Params::new()
            .with("damping_boundary", [true; 4])
            .with("pml_length", 8),
        ..reference_profile()?
    })
}

/// 48^3 periodic cube (~110K cells).
pub fn stress_profile() -> Result<Profile, ConfigError> {
    Ok(Profile {
        global: Grid::builder(3).reso(&[48, 48, 48]).build()?,
        ranks: vec![1, 1, 1],
        boundaries: Boundaries::periodic(),
        params: Params::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use yee_exec::ExecSerial;

    #[test]
    fn profiles_build_and_seed() {
        for profile in [reference_profile().unwrap(), layered_profile().unwrap()] {
            let (mut solver, _ctx) = profile.single(ExecSerial).unwrap();
            assert!(solver.field_energy().unwrap() > 0.0);
            assert!(profile.dt() < solver.courant_limit());
        }
    }

    #[test]
    fn decomposition_matches_rank_split() {
        let mut profile = reference_profile().unwrap();
        profile.ranks = vec![2, 2];
        assert_eq!(profile.decomposition().unwrap().size(), 4);
    }
}
