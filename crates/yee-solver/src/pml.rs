//! Graded conductivity of the absorbing layers.
//!
//! The conductivity along an axis depends only on the position of a sample
//! along that axis, measured in cells from the *global* damped face, so a
//! subdomain deep inside the domain sees zero everywhere and a layer split
//! across ranks matches the single-rank profile exactly.

use yee_core::{Scalar, Side, AXES};
use yee_grid::{Grid, Index, Stagger};

use crate::config::PmlConfig;

/// `σ(depth) = σ_max (depth / L)^order` sampled for one subdomain.
#[derive(Clone, Debug, PartialEq)]
pub struct PmlProfile {
    // sigma[axis][bit][n]: bit 1 for samples on the lower cell face.
    sigma: [[Vec<Scalar>; 2]; AXES],
}

impl PmlProfile {
    /// Profile of `pml` for the subdomain `grid`, over the full extent.
    pub fn new(grid: &Grid, pml: &PmlConfig) -> Self {
        let length = pml.length as Scalar;
        let sigma = std::array::from_fn(|axis| {
            std::array::from_fn(|bit| {
                let extent = grid.extent().get(axis);
                (0..extent)
                    .map(|n| {
                        if axis >= grid.dim() {
                            return 0.0;
                        }
                        // Cells from the global lower face to the sample.
                        let g = grid.offset(axis) as Scalar + n as Scalar - grid.guard(axis) as Scalar + 0.5
                            - 0.5 * bit as Scalar;
                        let mut depth: Scalar = 0.0;
                        if pml.damps(axis, Side::Lower) {
                            depth = depth.max(length - g);
                        }
                        if pml.damps(axis, Side::Upper) {
                            depth = depth.max(g - (grid.global_reso(axis) as Scalar - length));
                        }
                        let ratio = (depth / length).clamp(0.0, 1.0);
                        pml.sigma_max[axis] * ratio.powi(pml.order as i32)
                    })
                    .collect()
            })
        });
        Self { sigma }
    }

    /// Conductivity along `axis` of a sample at `idx` with `stagger`.
    #[inline]
    pub fn sigma(&self, idx: Index, stagger: Stagger, axis: usize) -> Scalar {
        self.sigma[axis][usize::from(stagger.bit(axis))][idx.get(axis) as usize]
    }

    /// Whether any sample of this subdomain is damped.
    pub fn is_active(&self) -> bool {
        self.sigma.iter().flatten().flatten().any(|&s| s > 0.0)
    }

    /// Whether the sample at `idx` with `stagger` is damped along either of
    /// the axes `j`, `k`.
    #[inline]
    pub fn damped(&self, idx: Index, stagger: Stagger, j: usize, k: usize) -> bool {
        self.sigma(idx, stagger, j) > 0.0 || self.sigma(idx, stagger, k) > 0.0
    }
}

/// Exponential integrator coefficients `(a, b)` of `u' = -σu + s` over a
/// step `h`: `u ← a u + b s` with `a = e^{-σh}` and `b = (1 - a) / σ`,
/// falling back to `b = h` as `σ → 0`.
#[inline]
pub fn coefficients(sigma: Scalar, h: Scalar) -> (Scalar, Scalar) {
    if sigma * h < 1e-12 {
        return (1.0, h);
    }
    let a = (-sigma * h).exp();
    (a, (1.0 - a) / sigma)
}
