//! Core types for the Yee staggered-grid field solver.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! floating-point [`Scalar`], rank and side identifiers, the error
//! taxonomy shared by every other crate, the [`Params`] configuration
//! provider and the [`DataRegistry`] through which solver outputs are
//! published.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod error;
pub mod fatal;
pub mod id;
pub mod params;
pub mod registry;

pub use context::SimContext;
pub use error::{BackendError, ConfigError, RegistryError, SolverError, TopologyError};
pub use fatal::OrAbort;
pub use id::{Rank, Side, AXES};
pub use params::{ParamValue, Params};
pub use registry::{DataHandle, DataRegistry};

/// Floating-point type used for every field value, coordinate and payload.
#[cfg(not(feature = "single-precision"))]
pub type Scalar = f64;

/// Floating-point type used for every field value, coordinate and payload.
#[cfg(feature = "single-precision")]
pub type Scalar = f32;

/// Atomic integer wide enough to hold a [`Scalar`]'s bit pattern.
#[cfg(not(feature = "single-precision"))]
pub type ScalarBits = std::sync::atomic::AtomicU64;

/// Atomic integer wide enough to hold a [`Scalar`]'s bit pattern.
#[cfg(feature = "single-precision")]
pub type ScalarBits = std::sync::atomic::AtomicU32;
