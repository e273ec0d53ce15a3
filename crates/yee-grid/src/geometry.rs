//! Subdomain geometry.
//!
//! Constructed via the builder pattern: [`Grid::builder`].

use yee_core::{ConfigError, Scalar, AXES};

use crate::index::{CellRange, Extent, Index};
use crate::stagger::Stagger;

/// Geometry of one Cartesian subdomain.
///
/// Along each of the first `dim` axes the subdomain holds `reso` interior
/// cells flanked by `guard` guard cells on both sides. The remaining axes
/// are degenerate: one cell, no guards, unit spacing.
///
/// The grid also remembers where it sits inside the global domain, so
/// position-dependent profiles (absorbing layers) can be evaluated on any
/// rank without communication.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    dim: usize,
    reso: [u32; AXES],
    guard: [u32; AXES],
    delta: [Scalar; AXES],
    lower: [Scalar; AXES],
    offset: [u32; AXES],
    global_reso: [u32; AXES],
    global_lower: [Scalar; AXES],
}

/// Builder for [`Grid`].
///
/// Required: `reso`. Spacing comes from either `delta` or `sizes`
/// (default: unit spacing). `guard` defaults to 1, `lower` to the origin.
#[derive(Clone, Debug)]
pub struct GridBuilder {
    dim: usize,
    reso: Option<Vec<u32>>,
    guard: u32,
    delta: Option<Vec<Scalar>>,
    sizes: Option<Vec<Scalar>>,
    lower: Option<Vec<Scalar>>,
}

impl Grid {
    /// Create a new builder for a `dim`-dimensional grid.
    pub fn builder(dim: usize) -> GridBuilder {
        GridBuilder {
            dim,
            reso: None,
            guard: 1,
            delta: None,
            sizes: None,
            lower: None,
        }
    }

    /// Dimensionality (1, 2 or 3).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Interior cells along `axis`.
    pub fn reso(&self, axis: usize) -> u32 {
        self.reso[axis]
    }

    /// Guard cells on each side along `axis`.
    pub fn guard(&self, axis: usize) -> u32 {
        self.guard[axis]
    }

    /// Cell spacing along `axis`.
    pub fn delta(&self, axis: usize) -> Scalar {
        self.delta[axis]
    }

    /// Physical lower corner of the first interior cell along `axis`.
    pub fn lower(&self, axis: usize) -> Scalar {
        self.lower[axis]
    }

    /// Physical upper bound of the last interior cell along `axis`.
    pub fn upper(&self, axis: usize) -> Scalar {
        self.lower[axis] + self.reso[axis] as Scalar * self.delta[axis]
    }

    /// Global cell index of this subdomain's first interior cell.
    pub fn offset(&self, axis: usize) -> u32 {
        self.offset[axis]
    }

    /// Interior cells of the whole domain along `axis`.
    pub fn global_reso(&self, axis: usize) -> u32 {
        self.global_reso[axis]
    }

    /// Physical lower bound of the whole domain along `axis`.
    pub fn global_lower(&self, axis: usize) -> Scalar {
        self.global_lower[axis]
    }

    /// Physical upper bound of the whole domain along `axis`.
    pub fn global_upper(&self, axis: usize) -> Scalar {
        self.global_lower[axis] + self.global_reso[axis] as Scalar * self.delta[axis]
    }

    /// Whether this subdomain touches the global lower face of `axis`.
    pub fn at_global_lower(&self, axis: usize) -> bool {
        self.offset[axis] == 0
    }

    /// Whether this subdomain touches the global upper face of `axis`.
    pub fn at_global_upper(&self, axis: usize) -> bool {
        self.offset[axis] + self.reso[axis] == self.global_reso[axis]
    }

    /// Guard-inclusive array shape: `reso + 2 * guard` per axis.
    pub fn extent(&self) -> Extent {
        Extent(std::array::from_fn(|d| self.reso[d] + 2 * self.guard[d]))
    }

    /// Interior cells only.
    pub fn interior_range(&self) -> CellRange {
        CellRange::new(
            Index(self.guard),
            Index(std::array::from_fn(|d| self.guard[d] + self.reso[d])),
        )
    }

    /// Every cell, guards included.
    pub fn full_range(&self) -> CellRange {
        self.extent().range()
    }

    /// Whether `idx` is an interior cell.
    pub fn is_interior(&self, idx: Index) -> bool {
        self.interior_range().contains(idx)
    }

    /// Physical coordinate along `axis` of array position `n` for a sample
    /// that is (`face = true`) or is not face-offset along that axis.
    pub fn coord(&self, axis: usize, n: u32, face: bool) -> Scalar {
        let shift = if face { 0.0 } else { 0.5 };
        self.lower[axis] + (n as Scalar - self.guard[axis] as Scalar + shift) * self.delta[axis]
    }

    /// Physical position of the sample at `idx` with stagger `stagger`.
    pub fn position(&self, idx: Index, stagger: Stagger) -> [Scalar; AXES] {
        std::array::from_fn(|d| self.coord(d, idx.0[d], stagger.bit(d)))
    }

    /// Volume (area, length) of one cell over the active dimensions.
    pub fn cell_volume(&self) -> Scalar {
        self.delta[..self.dim].iter().product()
    }

    /// The subdomain at rank coordinate `coord` of a `rank_dims` split of
    /// this (global) grid.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidDecomposition`] when an axis does not divide
    /// evenly, when a rank count is zero or when a degenerate axis is split.
    pub fn subdomain(
        &self,
        coord: [usize; AXES],
        rank_dims: [usize; AXES],
    ) -> Result<Grid, ConfigError> {
        let mut sub = self.clone();
        for d in 0..AXES {
            let n = rank_dims[d];
            if n == 0 || (d >= self.dim && n != 1) {
                return Err(ConfigError::InvalidDecomposition {
                    reason: format!("{n} ranks along axis {d} of a {}D grid", self.dim),
                });
            }
            let global = self.global_reso[d] as usize;
            if global % n != 0 {
                return Err(ConfigError::InvalidDecomposition {
                    reason: format!("{global} cells along axis {d} do not split into {n} ranks"),
                });
            }
            if coord[d] >= n {
                return Err(ConfigError::InvalidDecomposition {
                    reason: format!("rank coordinate {} out of {n} along axis {d}", coord[d]),
                });
            }
            let local = (global / n) as u32;
            if d < self.dim && local < self.guard[d] {
                return Err(ConfigError::InvalidDecomposition {
                    reason: format!(
                        "{local} cells per rank along axis {d} is less than the guard width {}",
                        self.guard[d]
                    ),
                });
            }
            sub.reso[d] = local;
            sub.offset[d] = self.offset[d] + coord[d] as u32 * local;
            sub.lower[d] = self.global_lower[d] + sub.offset[d] as Scalar * self.delta[d];
        }
        Ok(sub)
    }
}

impl GridBuilder {
    /// Interior cells per active axis (length must equal `dim`).
    pub fn reso(mut self, reso: &[u32]) -> Self {
        self.reso = Some(reso.to_vec());
        self
    }

    /// Guard width applied along every active axis (default: 1).
    pub fn guard(mut self, guard: u32) -> Self {
        self.guard = guard;
        self
    }

    /// Cell spacing per active axis.
    pub fn delta(mut self, delta: &[Scalar]) -> Self {
        self.delta = Some(delta.to_vec());
        self
    }

    /// Physical domain length per active axis; spacing is `size / reso`.
    pub fn sizes(mut self, sizes: &[Scalar]) -> Self {
        self.sizes = Some(sizes.to_vec());
        self
    }

    /// Physical lower corner per active axis (default: origin).
    pub fn lower(mut self, lower: &[Scalar]) -> Self {
        self.lower = Some(lower.to_vec());
        self
    }

    /// Build the grid, validating all configuration.
    ///
    /// The result describes a whole domain: offset zero, global bounds
    /// equal to local ones. Use [`Grid::subdomain`] to split it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGrid`] if:
    /// - `dim` is not 1, 2 or 3
    /// - `reso` is missing, has the wrong length or contains a zero
    /// - both `delta` and `sizes` are given
    /// - a spacing is not finite and > 0
    pub fn build(self) -> Result<Grid, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidGrid { reason };
        let dim = self.dim;
        if !(1..=AXES).contains(&dim) {
            return Err(invalid(format!("dimension must be 1, 2 or 3, got {dim}")));
        }
        let check_len = |name: &str, len: usize| {
            if len != dim {
                Err(invalid(format!("{name} has {len} entries for a {dim}D grid")))
            } else {
                Ok(())
            }
        };

        let reso_in = self
            .reso
            .ok_or_else(|| invalid("reso is required".to_string()))?;
        check_len("reso", reso_in.len())?;
        if let Some(d) = reso_in.iter().position(|&n| n == 0) {
            return Err(invalid(format!("reso along axis {d} is zero")));
        }

        let mut reso = [1u32; AXES];
        let mut guard = [0u32; AXES];
        let mut delta = [1.0 as Scalar; AXES];
        let mut lower = [0.0 as Scalar; AXES];
        for d in 0..dim {
            reso[d] = reso_in[d];
            guard[d] = self.guard;
        }

        match (self.delta, self.sizes) {
            (Some(_), Some(_)) => {
                return Err(invalid("give either delta or sizes, not both".to_string()));
            }
            (Some(dx), None) => {
                check_len("delta", dx.len())?;
                delta[..dim].copy_from_slice(&dx);
            }
            (None, Some(sizes)) => {
                check_len("sizes", sizes.len())?;
                for d in 0..dim {
                    delta[d] = sizes[d] / reso[d] as Scalar;
                }
            }
            (None, None) => {}
        }
        for (d, &dx) in delta[..dim].iter().enumerate() {
            if !(dx.is_finite() && dx > 0.0) {
                return Err(invalid(format!(
                    "spacing along axis {d} must be finite and > 0, got {dx}"
                )));
            }
        }

        if let Some(lo) = self.lower {
            check_len("lower", lo.len())?;
            if lo.iter().any(|x| !x.is_finite()) {
                return Err(invalid("lower corner must be finite".to_string()));
            }
            lower[..dim].copy_from_slice(&lo);
        }

        Ok(Grid {
            dim,
            reso,
            guard,
            delta,
            lower,
            offset: [0; AXES],
            global_reso: reso,
            global_lower: lower,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid_1d() -> Grid {
        Grid::builder(1)
            .reso(&[8])
            .guard(2)
            .sizes(&[4.0])
            .lower(&[-1.0])
            .build()
            .unwrap()
    }

    #[test]
    fn extent_includes_guards() {
        let g = grid_1d();
        assert_eq!(g.extent(), Extent::new(12, 1, 1));
        assert_eq!(g.interior_range().len(), 8);
        assert_eq!(g.full_range().len(), 12);
        assert_relative_eq!(g.delta(0), 0.5);
    }

    #[test]
    fn stagger_shifts_sample_to_lower_face() {
        let g = grid_1d();
        // First interior cell (n = guard) spans [-1.0, -0.5).
        assert_relative_eq!(g.coord(0, 2, true), -1.0);
        assert_relative_eq!(g.coord(0, 2, false), -0.75);
        assert_relative_eq!(g.coord(0, 0, true), -2.0);
        let pos = g.position(Index::new(3, 0, 0), Stagger::new(0b001));
        assert_relative_eq!(pos[0], -0.5);
    }

    #[test]
    fn degenerate_axes_have_no_guards() {
        let g = Grid::builder(2).reso(&[4, 6]).guard(3).build().unwrap();
        assert_eq!(g.extent(), Extent::new(10, 12, 1));
        assert_eq!(g.guard(2), 0);
        assert_relative_eq!(g.cell_volume(), 1.0);
    }

    #[test]
    fn builder_rejects_bad_input() {
        assert!(Grid::builder(4).reso(&[1, 1, 1, 1]).build().is_err());
        assert!(Grid::builder(2).reso(&[4]).build().is_err());
        assert!(Grid::builder(1).reso(&[0]).build().is_err());
        assert!(Grid::builder(1).reso(&[4]).delta(&[-1.0]).build().is_err());
        assert!(Grid::builder(1)
            .reso(&[4])
            .delta(&[1.0])
            .sizes(&[4.0])
            .build()
            .is_err());
        assert!(Grid::builder(1).build().is_err());
    }

    #[test]
    fn subdomain_offsets_and_bounds() {
        let global = grid_1d();
        let right = global.subdomain([1, 0, 0], [2, 1, 1]).unwrap();
        assert_eq!(right.reso(0), 4);
        assert_eq!(right.offset(0), 4);
        assert_relative_eq!(right.lower(0), 1.0);
        assert_relative_eq!(right.global_upper(0), 3.0);
        assert!(right.at_global_upper(0));
        assert!(!right.at_global_lower(0));
        assert_eq!(right.extent(), Extent::new(8, 1, 1));
    }

    #[test]
    fn uneven_split_is_rejected() {
        let global = grid_1d();
        assert!(matches!(
            global.subdomain([0, 0, 0], [3, 1, 1]),
            Err(ConfigError::InvalidDecomposition { .. })
        ));
        // 8 / 8 = 1 cell per rank, less than the guard width of 2.
        assert!(global.subdomain([0, 0, 0], [8, 1, 1]).is_err());
        assert!(global.subdomain([0, 0, 0], [1, 2, 1]).is_err());
    }
}
