//! Single-threaded host execution.

use yee_core::Scalar;
use yee_grid::{CellRange, Extent, Index, MultiArray};

use crate::policy::ExecPolicy;

/// Runs every loop on the calling thread in linear (`x`-fastest) order.
///
/// Deterministic, including the summation order of
/// [`reduce_sum`](ExecPolicy::reduce_sum).
#[derive(Clone, Copy, Debug, Default)]
pub struct ExecSerial;

impl ExecSerial {
    /// The serial policy.
    pub fn new() -> Self {
        Self
    }
}

impl ExecPolicy for ExecSerial {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn for_each_cell<F>(&self, extent: Extent, range: CellRange, f: F)
    where
        F: Fn(Index, usize) + Send + Sync,
    {
        for idx in range.iter() {
            f(idx, extent.linear(idx));
        }
    }

    fn update_cells<F>(&self, out: &mut MultiArray, range: CellRange, f: F)
    where
        F: Fn(Index, usize, Scalar) -> Scalar + Send + Sync,
    {
        let extent = out.extent();
        let data = out.as_mut_slice();
        for idx in range.iter() {
            let n = extent.linear(idx);
            data[n] = f(idx, n, data[n]);
        }
    }

    fn reduce_sum<F>(&self, extent: Extent, range: CellRange, f: F) -> Scalar
    where
        F: Fn(Index, usize) -> Scalar + Send + Sync,
    {
        range.iter().map(|idx| f(idx, extent.linear(idx))).sum()
    }
}
