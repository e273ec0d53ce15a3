//! Execution policies: how a per-cell closure is dispatched over a range.
//!
//! Solver kernels are written once as closures over `(Index, linear)` and
//! handed to an [`ExecPolicy`]. Policies are generic parameters, so every
//! kernel is monomorphised per backend and cell loops carry no dynamic
//! dispatch.
//!
//! - [`ExecSerial`]: one thread, linear order.
//! - [`ExecRayon`]: rows of the range spread over a rayon pool, no ordering
//!   guarantee between cells.
//!
//! Closures passed to [`ExecPolicy::update_cells`] must read only state that
//! no invocation writes; each invocation returns the new value of its own
//! cell. Side-effecting accumulation into shared cells goes through
//! [`ExecPolicy::for_each_cell`] with [`AtomicScalar`] targets.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod atomic;
pub mod policy;
pub mod rayon_exec;
pub mod serial;

pub use atomic::{AtomicArray, AtomicScalar};
pub use policy::ExecPolicy;
pub use rayon_exec::ExecRayon;
pub use serial::ExecSerial;
