//! Yee: a distributed Maxwell field solver on a staggered Cartesian grid.
//!
//! This is the top-level facade crate that re-exports the public API of
//! the Yee sub-crates. For most users, adding `yee` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use yee::prelude::*;
//!
//! // A 64-cell periodic line, one subdomain.
//! let grid = Arc::new(Grid::builder(1).reso(&[64]).build()?);
//! let comm = DomainComm::single(ExecSerial, grid, Boundaries::periodic())?;
//! let mut solver = FieldSolver::new(comm);
//! let mut ctx = SimContext::new(Params::new().with("fld_output_interval", 5));
//! solver.init(&mut ctx)?;
//!
//! // A pulse travelling in +x: E_y = B_z.
//! let pulse = |p: [Scalar; 3]| (-(p[0] - 32.0) * (p[0] - 32.0) / 16.0).exp();
//! solver.fields()?.e.write()?.set_values(1, pulse);
//! solver.fields()?.b.write()?.set_values(2, pulse);
//! solver.exchange_fields()?;
//!
//! let dt = 0.5 * solver.courant_limit();
//! let e0 = solver.field_energy()?;
//! for step in 1..=20 {
//!     solver.update(dt, step, step as Scalar * dt)?;
//! }
//! assert!((solver.field_energy()? - e0).abs() < 0.05 * e0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `yee-core` | `Scalar`, ids, errors, parameters, data registry |
//! | [`grid`] | `yee-grid` | Subdomain geometry, staggers, grid-shaped arrays |
//! | [`exec`] | `yee-exec` | Serial and rayon execution policies |
//! | [`field`] | `yee-field` | Multi-component staggered fields |
//! | [`comm`] | `yee-comm` | Decomposition, guard exchange, particle routing |
//! | [`solver`] | `yee-solver` | Field updates, absorbing layers, diagnostics |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, errors and configuration (`yee-core`).
pub use yee_core as types;

/// Grid geometry and storage (`yee-grid`).
///
/// [`grid::Grid`] describes one subdomain, [`grid::Stagger`] where a
/// component is sampled inside a cell.
pub use yee_grid as grid;

/// Execution policies (`yee-exec`).
pub use yee_exec as exec;

/// Staggered fields (`yee-field`).
pub use yee_field as field;

/// Domain decomposition and communication (`yee-comm`).
///
/// [`comm::Decomposition`] splits a global grid into ranks;
/// [`comm::run_cluster`] runs one closure per rank on its own thread.
pub use yee_comm as comm;

/// The field solver (`yee-solver`).
pub use yee_solver as solver;

/// Common imports for typical Yee usage.
///
/// ```rust
/// use yee::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use yee_core::{DataHandle, OrAbort, Params, Rank, Scalar, Side, SimContext, AXES};

    // Errors
    pub use yee_core::{BackendError, ConfigError, RegistryError, SolverError, TopologyError};

    // Geometry
    pub use yee_grid::{FieldType, Grid, Index, Stagger};

    // Execution
    pub use yee_exec::{ExecPolicy, ExecRayon, ExecSerial};

    // Fields
    pub use yee_field::{ScalarField, VectorField};

    // Communication
    pub use yee_comm::{run_cluster, BoundaryKind, Boundaries, Decomposition, DomainComm, ParticleRecord};

    // Solver
    pub use yee_solver::{names, FieldSolver, SolverConfig, UpdateMode};
}
