//! Cartesian rank arrangement and face neighbours.

use smallvec::SmallVec;
use yee_core::{ConfigError, Rank, Side, TopologyError, AXES};

/// Position of one rank inside a Cartesian rank grid.
///
/// Along periodic axes neighbours wrap, so a single rank along a periodic
/// axis is its own neighbour on both sides. Along non-periodic axes the
/// outermost ranks have no neighbour across the global face.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    rank: Rank,
    dims: [usize; AXES],
    coord: [usize; AXES],
    periodic: [bool; AXES],
}

impl Topology {
    /// The topology seen by `rank` in a `dims` rank grid.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidDecomposition`] if a rank count is zero or
    /// `rank` is out of range.
    pub fn new(rank: Rank, dims: [usize; AXES], periodic: [bool; AXES]) -> Result<Self, ConfigError> {
        if dims.contains(&0) {
            return Err(ConfigError::InvalidDecomposition {
                reason: format!("rank grid {dims:?} has an empty axis"),
            });
        }
        let size: usize = dims.iter().product();
        if rank.0 >= size {
            return Err(ConfigError::InvalidDecomposition {
                reason: format!("rank {rank} outside a grid of {size} ranks"),
            });
        }
        Ok(Self {
            rank,
            dims,
            coord: coord_of(rank, dims),
            periodic,
        })
    }

    /// Every topology of a `dims` rank grid, in rank order.
    pub fn all(dims: [usize; AXES], periodic: [bool; AXES]) -> Result<Vec<Self>, ConfigError> {
        let size: usize = dims.iter().product();
        (0..size)
            .map(|r| Self::new(Rank(r), dims, periodic))
            .collect()
    }

    /// This rank.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Number of ranks.
    pub fn size(&self) -> usize {
        self.dims.iter().product()
    }

    /// Ranks per axis.
    pub fn dims(&self) -> [usize; AXES] {
        self.dims
    }

    /// This rank's coordinate in the rank grid.
    pub fn coord(&self) -> [usize; AXES] {
        self.coord
    }

    /// Whether `axis` wraps.
    pub fn is_periodic(&self, axis: usize) -> bool {
        self.periodic[axis]
    }

    /// Rank at a rank-grid coordinate.
    pub fn rank_of(&self, coord: [usize; AXES]) -> Rank {
        rank_of(coord, self.dims)
    }

    /// Face neighbour across `side` of `axis`, wrapping along periodic axes.
    pub fn neighbor(&self, axis: usize, side: Side) -> Option<Rank> {
        let n = self.dims[axis];
        let c = self.coord[axis];
        let next = match side {
            Side::Lower if c > 0 => c - 1,
            Side::Lower if self.periodic[axis] => n - 1,
            Side::Upper if c + 1 < n => c + 1,
            Side::Upper if self.periodic[axis] => 0,
            _ => return None,
        };
        let mut coord = self.coord;
        coord[axis] = next;
        Some(self.rank_of(coord))
    }

    /// Face neighbour ignoring periodic wrap: the previous or next rank of
    /// an open chain along `axis`.
    pub fn chain_neighbor(&self, axis: usize, side: Side) -> Option<Rank> {
        let c = self.coord[axis];
        let next = match side {
            Side::Lower => c.checked_sub(1)?,
            Side::Upper => Some(c + 1).filter(|&x| x < self.dims[axis])?,
        };
        let mut coord = self.coord;
        coord[axis] = next;
        Some(self.rank_of(coord))
    }

    /// Whether `side` of `axis` is a global, non-wrapping face.
    pub fn is_global_boundary(&self, axis: usize, side: Side) -> bool {
        self.neighbor(axis, side).is_none()
    }

    /// All existing `(axis, side, neighbour)` entries over the first `dim`
    /// axes.
    pub fn neighbors(&self, dim: usize) -> SmallVec<[(usize, Side, Rank); 6]> {
        let mut out = SmallVec::new();
        for axis in 0..dim {
            for side in Side::BOTH {
                if let Some(r) = self.neighbor(axis, side) {
                    out.push((axis, side, r));
                }
            }
        }
        out
    }

    /// Check that the neighbour relation over a full set of topologies is
    /// symmetric: whenever `a` lists `b` on one side, `b` lists `a` on the
    /// opposite side.
    ///
    /// # Errors
    ///
    /// [`TopologyError::InconsistentNeighbors`] for the first unmatched
    /// entry.
    pub fn validate_symmetry(all: &[Topology], dim: usize) -> Result<(), TopologyError> {
        for t in all {
            for (axis, side, n) in t.neighbors(dim) {
                let back = all
                    .get(n.0)
                    .and_then(|other| other.neighbor(axis, side.opposite()));
                if back != Some(t.rank) {
                    return Err(TopologyError::InconsistentNeighbors {
                        rank: t.rank,
                        neighbor: n,
                        axis,
                        side,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Rank-grid coordinate of `rank`, `x` fastest.
pub fn coord_of(rank: Rank, dims: [usize; AXES]) -> [usize; AXES] {
    let r = rank.0;
    [r % dims[0], (r / dims[0]) % dims[1], r / (dims[0] * dims[1])]
}

/// Rank at `coord`, `x` fastest.
pub fn rank_of(coord: [usize; AXES], dims: [usize; AXES]) -> Rank {
    Rank(coord[0] + dims[0] * (coord[1] + dims[1] * coord[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn single_periodic_rank_is_its_own_neighbour() {
        let t = Topology::new(Rank(0), [1, 1, 1], [true, false, false]).unwrap();
        assert_eq!(t.neighbor(0, Side::Lower), Some(Rank(0)));
        assert_eq!(t.neighbor(0, Side::Upper), Some(Rank(0)));
        assert_eq!(t.neighbor(1, Side::Lower), None);
        assert!(t.is_global_boundary(1, Side::Upper));
    }

    #[test]
    fn open_chain_ends() {
        let all = Topology::all([3, 1, 1], [false; 3]).unwrap();
        assert_eq!(all[0].neighbor(0, Side::Lower), None);
        assert_eq!(all[0].neighbor(0, Side::Upper), Some(Rank(1)));
        assert_eq!(all[2].neighbor(0, Side::Upper), None);
        assert_eq!(all[1].neighbors(1).len(), 2);
    }

    #[test]
    fn chain_neighbour_ignores_wrap() {
        let all = Topology::all([3, 1, 1], [true; 3]).unwrap();
        assert_eq!(all[0].neighbor(0, Side::Lower), Some(Rank(2)));
        assert_eq!(all[0].chain_neighbor(0, Side::Lower), None);
        assert_eq!(all[2].chain_neighbor(0, Side::Upper), None);
        assert_eq!(all[1].chain_neighbor(0, Side::Upper), Some(Rank(2)));
    }

    #[test]
    fn linearisation_is_x_fastest() {
        let dims = [2, 3, 2];
        assert_eq!(rank_of([1, 0, 0], dims), Rank(1));
        assert_eq!(rank_of([0, 1, 0], dims), Rank(2));
        assert_eq!(rank_of([0, 0, 1], dims), Rank(6));
        assert_eq!(coord_of(Rank(11), dims), [1, 2, 1]);
    }

    #[test]
    fn asymmetric_set_is_detected() {
        let mut all = Topology::all([2, 1, 1], [false; 3]).unwrap();
        all[1] = Topology::new(Rank(1), [2, 1, 1], [true, false, false]).unwrap();
        all[1].coord = [0, 0, 0];
        assert!(matches!(
            Topology::validate_symmetry(&all, 1),
            Err(TopologyError::InconsistentNeighbors { .. })
        ));
    }

    proptest! {
        #[test]
        fn neighbour_relation_is_symmetric(
            nx in 1usize..5, ny in 1usize..4, nz in 1usize..3,
            px: bool, py: bool, pz: bool,
        ) {
            let all = Topology::all([nx, ny, nz], [px, py, pz]).unwrap();
            prop_assert!(Topology::validate_symmetry(&all, 3).is_ok());
            for t in &all {
                prop_assert_eq!(rank_of(t.coord(), t.dims()), t.rank());
            }
        }
    }
}
