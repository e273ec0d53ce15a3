//! Cartesian grid geometry, stagger patterns and grid-shaped storage.
//!
//! A [`Grid`] describes one subdomain: its interior resolution, guard
//! width, spacing and physical placement inside the global domain. Every
//! array on that subdomain has the grid's guard-inclusive [`Extent`] and
//! is addressed by a three-component [`Index`], linearised with `x`
//! fastest.
//!
//! A [`Stagger`] bitmask records where inside a cell a field component is
//! sampled. A set bit along an axis places the sample on the cell's lower
//! face instead of its centre.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod geometry;
pub mod index;
pub mod stagger;

pub use array::MultiArray;
pub use geometry::{Grid, GridBuilder};
pub use index::{CellRange, Extent, Index};
pub use stagger::{FieldType, Stagger};
