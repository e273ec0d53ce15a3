//! Strongly-typed identifiers for ranks and subdomain faces.

use std::fmt;

/// Number of spatial axes every index and geometry carries.
///
/// Dimensions beyond a grid's dimensionality are degenerate (one cell,
/// no guards).
pub const AXES: usize = 3;

/// Identifies one subdomain (and the thread that owns it).
///
/// Ranks are linearised from their Cartesian rank coordinate with `x`
/// fastest: `rank = cx + nx * (cy + ny * cz)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(pub usize);

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for Rank {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

/// One of the two faces of a subdomain along an axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    /// The face at the low end of the axis.
    Lower,
    /// The face at the high end of the axis.
    Upper,
}

impl Side {
    /// Both sides, lower first.
    pub const BOTH: [Side; 2] = [Side::Lower, Side::Upper];

    /// The face on the other end of the axis.
    pub fn opposite(self) -> Self {
        match self {
            Side::Lower => Side::Upper,
            Side::Upper => Side::Lower,
        }
    }

    /// `0` for [`Side::Lower`], `1` for [`Side::Upper`].
    pub fn index(self) -> usize {
        match self {
            Side::Lower => 0,
            Side::Upper => 1,
        }
    }

    /// `-1` for [`Side::Lower`], `+1` for [`Side::Upper`].
    pub fn sign(self) -> i64 {
        match self {
            Side::Lower => -1,
            Side::Upper => 1,
        }
    }

    /// Index of the face `(axis, side)` in a `2 * dim` face array
    /// ordered `[x-, x+, y-, y+, z-, z+]`.
    pub fn face(self, axis: usize) -> usize {
        2 * axis + self.index()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Lower => f.write_str("lower"),
            Side::Upper => f.write_str("upper"),
        }
    }
}
