//! Staggered finite differences.
//!
//! The derivative of a component along an axis lands half a cell away from
//! the component's own sample along that axis. A component sitting on the
//! lower face (stagger bit set) differences forward to the cell centre, a
//! centred component differences backward to the lower face:
//!
//! ```text
//! bit set:   (f[n + s] - f[n]) / delta
//! bit clear: (f[n] - f[n - s]) / delta
//! ```
//!
//! With `B` face-centred and `E` edge-centred this puts `curl E` exactly on
//! the `B` samples and `curl B` on the `E` samples, `div E` on vertices and
//! `div B` on cell centres. Axes past the grid's dimensionality have zero
//! derivative.

use yee_core::{Scalar, AXES};
use yee_grid::{Grid, Stagger};

/// Difference operators of one grid, evaluated at linear array offsets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stencil {
    dim: usize,
    strides: [usize; AXES],
    inv_delta: [Scalar; AXES],
}

impl Stencil {
    /// Operators for arrays shaped like `grid`.
    pub fn new(grid: &Grid) -> Self {
        Self {
            dim: grid.dim(),
            strides: grid.extent().strides(),
            inv_delta: std::array::from_fn(|d| 1.0 / grid.delta(d)),
        }
    }

    /// `∂f/∂axis` at offset `n` for a component with `stagger`.
    #[inline]
    pub fn diff(&self, f: &[Scalar], stagger: Stagger, axis: usize, n: usize) -> Scalar {
        if axis >= self.dim {
            return 0.0;
        }
        let s = self.strides[axis];
        let d = if stagger.bit(axis) {
            f[n + s] - f[n]
        } else {
            f[n] - f[n - s]
        };
        d * self.inv_delta[axis]
    }

    /// Component `comp` of `curl F`: `∂_j F_k - ∂_k F_j` with
    /// `(comp, j, k)` cyclic.
    #[inline]
    pub fn curl(&self, f: [&[Scalar]; AXES], stagger: [Stagger; AXES], comp: usize, n: usize) -> Scalar {
        let (j, k) = cyclic(comp);
        self.diff(f[k], stagger[k], j, n) - self.diff(f[j], stagger[j], k, n)
    }

    /// `div F` at offset `n`.
    #[inline]
    pub fn div(&self, f: [&[Scalar]; AXES], stagger: [Stagger; AXES], n: usize) -> Scalar {
        (0..self.dim).map(|a| self.diff(f[a], stagger[a], a, n)).sum()
    }

    /// Upper bound on the eigenvalues of `curl curl`: `4 sum 1/delta^2`
    /// over the active axes, the spectral radius of the discrete Laplacian.
    pub fn curl_curl_bound(&self) -> Scalar {
        (0..self.dim).map(|a| 4.0 * self.inv_delta[a] * self.inv_delta[a]).sum()
    }
}

/// The two axes following `comp` in cyclic order.
#[inline]
pub fn cyclic(comp: usize) -> (usize, usize) {
    ((comp + 1) % AXES, (comp + 2) % AXES)
}
