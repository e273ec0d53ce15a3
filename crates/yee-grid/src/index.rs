//! Cell indices, array extents and index ranges.

use std::fmt;

use yee_core::AXES;

/// A cell index, guard cells included (`0` is the first guard cell).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Index(pub [u32; AXES]);

impl Index {
    /// Index from its components.
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self([x, y, z])
    }

    /// Component along `axis`.
    pub fn get(self, axis: usize) -> u32 {
        self.0[axis]
    }

    /// A copy with the component along `axis` replaced.
    pub fn with(mut self, axis: usize, value: u32) -> Self {
        self.0[axis] = value;
        self
    }
}

impl From<[u32; AXES]> for Index {
    fn from(v: [u32; AXES]) -> Self {
        Self(v)
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0[0], self.0[1], self.0[2])
    }
}

/// Size of a grid-shaped array along each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extent(pub [u32; AXES]);

impl Extent {
    /// Extent from its components.
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self([x, y, z])
    }

    /// Size along `axis`.
    pub fn get(self, axis: usize) -> u32 {
        self.0[axis]
    }

    /// Total number of cells.
    pub fn size(self) -> usize {
        self.0.iter().map(|&n| n as usize).product()
    }

    /// Distance in the flat array between neighbours along each axis.
    pub fn strides(self) -> [usize; AXES] {
        let e0 = self.0[0] as usize;
        let e1 = self.0[1] as usize;
        [1, e0, e0 * e1]
    }

    /// Row-major linear offset of `idx`, `x` fastest.
    pub fn linear(self, idx: Index) -> usize {
        let [x, y, z] = idx.0;
        x as usize + self.0[0] as usize * (y as usize + self.0[1] as usize * z as usize)
    }

    /// Inverse of [`linear`](Self::linear).
    pub fn index_of(self, linear: usize) -> Index {
        let e0 = self.0[0] as usize;
        let e1 = self.0[1] as usize;
        let x = linear % e0;
        let rest = linear / e0;
        Index::new(x as u32, (rest % e1) as u32, (rest / e1) as u32)
    }

    /// Whether `idx` addresses a cell of this extent.
    pub fn contains(self, idx: Index) -> bool {
        (0..AXES).all(|d| idx.0[d] < self.0[d])
    }

    /// The range covering the whole extent.
    pub fn range(self) -> CellRange {
        CellRange::new(Index::default(), Index(self.0))
    }
}

/// A half-open box of cell indices `[begin, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// First index (inclusive) along each axis.
    pub begin: Index,
    /// Last index (exclusive) along each axis.
    pub end: Index,
}

impl CellRange {
    /// Range from its corners. An `end` component below `begin` yields an
    /// empty range.
    pub fn new(begin: Index, end: Index) -> Self {
        Self { begin, end }
    }

    /// Number of indices along `axis`.
    pub fn span(&self, axis: usize) -> u32 {
        self.end.0[axis].saturating_sub(self.begin.0[axis])
    }

    /// Total number of indices.
    pub fn len(&self) -> usize {
        (0..AXES).map(|d| self.span(d) as usize).product()
    }

    /// Whether the range holds no index.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `idx` lies inside the range.
    pub fn contains(&self, idx: Index) -> bool {
        (0..AXES).all(|d| idx.0[d] >= self.begin.0[d] && idx.0[d] < self.end.0[d])
    }

    /// The same range with the bounds along `axis` replaced.
    pub fn with_axis(mut self, axis: usize, begin: u32, end: u32) -> Self {
        self.begin.0[axis] = begin;
        self.end.0[axis] = end;
        self
    }

    /// Number of `x` rows, one per `(y, z)` pair.
    pub fn row_count(&self) -> usize {
        if self.span(0) == 0 {
            return 0;
        }
        self.span(1) as usize * self.span(2) as usize
    }

    /// The `k`-th row as its `(y, z)` coordinate.
    pub fn row(&self, k: usize) -> (u32, u32) {
        let ny = self.span(1) as usize;
        (
            self.begin.0[1] + (k % ny) as u32,
            self.begin.0[2] + (k / ny) as u32,
        )
    }

    /// Iterate in linear order (`x` fastest).
    pub fn iter(&self) -> CellIter {
        CellIter {
            range: *self,
            next: if self.is_empty() {
                None
            } else {
                Some(self.begin)
            },
        }
    }
}

impl IntoIterator for CellRange {
    type Item = Index;
    type IntoIter = CellIter;

    fn into_iter(self) -> CellIter {
        self.iter()
    }
}

/// Iterator over a [`CellRange`].
#[derive(Clone, Debug)]
pub struct CellIter {
    range: CellRange,
    next: Option<Index>,
}

impl Iterator for CellIter {
    type Item = Index;

    fn next(&mut self) -> Option<Index> {
        let current = self.next?;
        let mut idx = current;
        self.next = None;
        for d in 0..AXES {
            idx.0[d] += 1;
            if idx.0[d] < self.range.end.0[d] {
                self.next = Some(idx);
                break;
            }
            idx.0[d] = self.range.begin.0[d];
        }
        Some(current)
    }
}
