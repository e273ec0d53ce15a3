//! Maxwell field solver on a staggered (Yee) grid.
//!
//! A [`FieldSolver`] owns the communicator of one subdomain and advances
//! the electric field `E` (edge-centred) and magnetic field `B`
//! (face-centred) in normalised units:
//!
//! ```text
//! ∂B/∂t = -curl E
//! ∂E/∂t =  curl B - J
//! ```
//!
//! Two schemes are available, an explicit leapfrog and a semi-implicit
//! blend, plus graded absorbing layers (PML) on any subset of the global
//! faces for the explicit scheme. Diagnostics (`div E`, `div B`, the flux
//! function, energy densities and total energy) are derived on demand and
//! never change the fields they read.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
mod diagnostics;
mod kernels;
pub mod pml;
pub mod scratch;
pub mod solver;
pub mod stencil;

pub use config::{PmlConfig, SolverConfig, UpdateMode};
pub use pml::PmlProfile;
pub use scratch::ScratchFields;
pub use solver::{names, FieldHandles, FieldSolver};
pub use stencil::Stencil;
