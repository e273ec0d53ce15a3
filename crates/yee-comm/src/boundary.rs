//! Boundary conditions on the faces of the global domain.

use yee_core::{ConfigError, Params, Side, AXES};
use yee_grid::{Grid, MultiArray, Stagger};

/// What happens at one face of the global domain.
///
/// This is distinct from absorbing layers, which damp fields *inside* the
/// domain. `BoundaryKind` decides how guard cells beyond a global face are
/// filled, and whether the face connects to the opposite one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    /// The face wraps to the opposite face of the same axis.
    Periodic,
    /// Perfect electric conductor. Components sampled on the face plane are
    /// mirrored with odd parity (zero on the face), centred components with
    /// even parity.
    Conductor,
    /// Zero-gradient continuation of the last interior sample.
    Outflow,
}

/// Boundary kind of each of the six global faces, `[x-, x+, y-, y+, z-, z+]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Boundaries {
    faces: [BoundaryKind; 2 * AXES],
}

impl Default for Boundaries {
    fn default() -> Self {
        Self::periodic()
    }
}

impl Boundaries {
    /// Every face periodic.
    pub fn periodic() -> Self {
        Self::uniform(BoundaryKind::Periodic)
    }

    /// Every face of the same kind.
    pub fn uniform(kind: BoundaryKind) -> Self {
        Self {
            faces: [kind; 2 * AXES],
        }
    }

    /// Replace one face.
    pub fn with_face(mut self, axis: usize, side: Side, kind: BoundaryKind) -> Self {
        self.faces[side.face(axis)] = kind;
        self
    }

    /// Replace both faces of an axis.
    pub fn with_axis(self, axis: usize, kind: BoundaryKind) -> Self {
        self.with_face(axis, Side::Lower, kind)
            .with_face(axis, Side::Upper, kind)
    }

    /// Kind of one face.
    pub fn face(&self, axis: usize, side: Side) -> BoundaryKind {
        self.faces[side.face(axis)]
    }

    /// Whether `axis` wraps.
    pub fn is_periodic(&self, axis: usize) -> bool {
        self.face(axis, Side::Lower) == BoundaryKind::Periodic
    }

    /// Per-axis periodicity flags.
    pub fn periodic_axes(&self) -> [bool; AXES] {
        std::array::from_fn(|d| self.is_periodic(d))
    }

    /// Check that periodic faces come in pairs on every active axis.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidParameter`] naming the offending axis.
    pub fn validate(&self, dim: usize) -> Result<(), ConfigError> {
        for axis in 0..dim {
            let lo = self.face(axis, Side::Lower) == BoundaryKind::Periodic;
            let hi = self.face(axis, Side::Upper) == BoundaryKind::Periodic;
            if lo != hi {
                return Err(ConfigError::invalid(
                    "periodic_boundary",
                    format!("axis {axis} is periodic on one face only"),
                ));
            }
        }
        Ok(())
    }

    /// Read `periodic_boundary` (one flag per active axis, default all
    /// periodic) and `conductor_boundary` (one flag per face; non-periodic
    /// faces without it are outflow, default conductor).
    pub fn from_params(params: &Params, dim: usize) -> Result<Self, ConfigError> {
        let periodic = params.get_or("periodic_boundary", vec![true; dim])?;
        if periodic.len() != dim {
            return Err(ConfigError::invalid(
                "periodic_boundary",
                format!("expected {dim} entries, found {}", periodic.len()),
            ));
        }
        let conductor = params.get_or("conductor_boundary", vec![true; 2 * dim])?;
        if conductor.len() != 2 * dim {
            return Err(ConfigError::invalid(
                "conductor_boundary",
                format!("expected {} entries, found {}", 2 * dim, conductor.len()),
            ));
        }
        let mut out = Self::periodic();
        for axis in 0..dim {
            if periodic[axis] {
                continue;
            }
            for side in Side::BOTH {
                let kind = if conductor[side.face(axis)] {
                    BoundaryKind::Conductor
                } else {
                    BoundaryKind::Outflow
                };
                out = out.with_face(axis, side, kind);
            }
        }
        Ok(out)
    }
}

/// Fill the guard cells of `array` beyond face `(axis, side)` according to
/// `kind`, for a component sampled with `stagger`.
///
/// Covers the full extent of the other axes, so guard corners filled by an
/// earlier axis are carried along. `Periodic` is a no-op: wrapping faces
/// are filled by the neighbour exchange.
pub fn fill_face(
    array: &mut MultiArray,
    grid: &Grid,
    stagger: Stagger,
    axis: usize,
    side: Side,
    kind: BoundaryKind,
) {
    let g = grid.guard(axis) as usize;
    let n = grid.reso(axis) as usize;
    if g == 0 || kind == BoundaryKind::Periodic {
        return;
    }
    let on_face = stagger.bit(axis);
    let extent = array.extent();
    let stride = extent.strides()[axis];
    let data = array.as_mut_slice();

    for idx in extent.range().with_axis(axis, 0, 1) {
        let base = extent.linear(idx);
        let at = |k: usize| base + k * stride;
        match (kind, side, on_face) {
            (BoundaryKind::Conductor, Side::Lower, true) => {
                data[at(g)] = 0.0;
                for m in 1..=g {
                    data[at(g - m)] = -data[at(g + m)];
                }
            }
            (BoundaryKind::Conductor, Side::Lower, false) => {
                for m in 0..g {
                    data[at(g - 1 - m)] = data[at(g + m)];
                }
            }
            (BoundaryKind::Conductor, Side::Upper, true) => {
                data[at(g + n)] = 0.0;
                for m in 1..g {
                    data[at(g + n + m)] = -data[at(g + n - m)];
                }
            }
            (BoundaryKind::Conductor, Side::Upper, false) => {
                for m in 0..g {
                    data[at(g + n + m)] = data[at(g + n - 1 - m)];
                }
            }
            (BoundaryKind::Outflow, Side::Lower, _) => {
                let edge = data[at(g)];
                for k in 0..g {
                    data[at(k)] = edge;
                }
            }
            (BoundaryKind::Outflow, Side::Upper, _) => {
                let edge = data[at(g + n - 1)];
                for k in g + n..2 * g + n {
                    data[at(k)] = edge;
                }
            }
            (BoundaryKind::Periodic, _, _) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yee_grid::{FieldType, Index};

    fn line(n: u32, g: u32) -> Grid {
        Grid::builder(1).reso(&[n]).guard(g).build().unwrap()
    }

    fn ramp(grid: &Grid) -> MultiArray {
        let mut a = MultiArray::zeros(grid.extent());
        for (i, x) in a.as_mut_slice().iter_mut().enumerate() {
            *x = i as yee_core::Scalar + 1.0;
        }
        a
    }

    #[test]
    fn conductor_zeroes_face_samples_with_odd_mirror() {
        let grid = line(4, 2);
        let mut a = ramp(&grid);
        // E_y is face-offset along x: sits on the conductor plane.
        let ey = FieldType::EdgeCentered.stagger(1);
        fill_face(&mut a, &grid, ey, 0, Side::Lower, BoundaryKind::Conductor);
        let v = a.as_slice();
        assert_eq!(v[2], 0.0);
        assert_eq!(v[1], -v[3]);
        assert_eq!(v[0], -v[4]);

        fill_face(&mut a, &grid, ey, 0, Side::Upper, BoundaryKind::Conductor);
        let v = a.as_slice();
        assert_eq!(v[6], 0.0);
        assert_eq!(v[7], -v[5]);
    }

    #[test]
    fn conductor_mirrors_centred_samples_evenly() {
        let grid = line(4, 2);
        let mut a = ramp(&grid);
        // E_x is centred along x.
        let ex = FieldType::EdgeCentered.stagger(0);
        fill_face(&mut a, &grid, ex, 0, Side::Lower, BoundaryKind::Conductor);
        fill_face(&mut a, &grid, ex, 0, Side::Upper, BoundaryKind::Conductor);
        let v = a.as_slice();
        assert_eq!((v[1], v[0]), (v[2], v[3]));
        assert_eq!((v[6], v[7]), (v[5], v[4]));
    }

    #[test]
    fn outflow_copies_the_edge_value() {
        let grid = Grid::builder(2).reso(&[3, 3]).guard(1).build().unwrap();
        let mut a = ramp(&grid);
        fill_face(&mut a, &grid, Stagger::CELL, 1, Side::Upper, BoundaryKind::Outflow);
        for x in 0..5 {
            assert_eq!(a.get(Index::new(x, 4, 0)), a.get(Index::new(x, 3, 0)));
        }
    }

    #[test]
    fn one_sided_periodicity_is_rejected() {
        let b = Boundaries::periodic().with_face(0, Side::Upper, BoundaryKind::Outflow);
        assert!(b.validate(1).is_err());
        assert!(b.with_axis(0, BoundaryKind::Conductor).validate(1).is_ok());
    }

    #[test]
    fn params_select_kinds() {
        let params = Params::new()
            .with("periodic_boundary", [false, true])
            .with("conductor_boundary", [true, false, true, true]);
        let b = Boundaries::from_params(&params, 2).unwrap();
        assert_eq!(b.face(0, Side::Lower), BoundaryKind::Conductor);
        assert_eq!(b.face(0, Side::Upper), BoundaryKind::Outflow);
        assert!(b.is_periodic(1));
        assert!(b.validate(2).is_ok());
    }
}
