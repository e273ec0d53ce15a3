//! Guard slabs exchanged across subdomain faces.
//!
//! Along an exchange axis with `g` guard cells and `n` interior cells:
//!
//! ```text
//!  index   0 .. g        g .. 2g   ...   n .. n+g       n+g .. n+2g
//!          lower guard   to lower        to upper       upper guard
//! ```
//!
//! The first interior slab goes to the lower neighbour, which stores it in
//! its upper guard; the last interior slab goes to the upper neighbour's
//! lower guard. A face-sitting component's sample on the upper face
//! plane (index `n+g`) is the upper neighbour's first interior sample, so
//! neighbour slabs are the same for every stagger. Slabs span the full
//! extent of the other axes, guards included.

use yee_core::{Scalar, Side};
use yee_grid::{CellRange, Grid, MultiArray};

/// Interior cells sent to the neighbour across `side` of `axis`.
pub fn send_range(grid: &Grid, axis: usize, side: Side) -> CellRange {
    let g = grid.guard(axis);
    let n = grid.reso(axis);
    let (lo, hi) = match side {
        Side::Lower => (g, 2 * g),
        Side::Upper => (n, n + g),
    };
    grid.full_range().with_axis(axis, lo, hi)
}

/// Guard cells filled from the neighbour across `side` of `axis`.
pub fn recv_range(grid: &Grid, axis: usize, side: Side) -> CellRange {
    let g = grid.guard(axis);
    let n = grid.reso(axis);
    let (lo, hi) = match side {
        Side::Lower => (0, g),
        Side::Upper => (n + g, n + 2 * g),
    };
    grid.full_range().with_axis(axis, lo, hi)
}

/// Append the values of `range` to `out` in linear order.
pub fn pack(array: &MultiArray, range: CellRange, out: &mut Vec<Scalar>) {
    let extent = array.extent();
    let data = array.as_slice();
    out.extend(range.iter().map(|idx| data[extent.linear(idx)]));
}

/// Overwrite `range` with the leading values of `data`, returning the
/// number consumed.
///
/// # Panics
///
/// If `data` holds fewer than `range.len()` values.
pub fn unpack(array: &mut MultiArray, range: CellRange, data: &[Scalar]) -> usize {
    let extent = array.extent();
    let out = array.as_mut_slice();
    let count = range.len();
    for (idx, &v) in range.iter().zip(&data[..count]) {
        out[extent.linear(idx)] = v;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slabs_have_guard_width() {
        let grid = Grid::builder(2).reso(&[8, 4]).guard(2).build().unwrap();
        let s = send_range(&grid, 0, Side::Upper);
        assert_eq!((s.begin.get(0), s.end.get(0)), (8, 10));
        assert_eq!(s.span(1), 8);
        let r = recv_range(&grid, 1, Side::Upper);
        assert_eq!((r.begin.get(1), r.end.get(1)), (6, 8));
        assert_eq!(r.len(), 12 * 2);
        assert_eq!(send_range(&grid, 1, Side::Lower).len(), recv_range(&grid, 1, Side::Upper).len());
    }

    #[test]
    fn pack_then_unpack_moves_the_slab() {
        let grid = Grid::builder(1).reso(&[4]).guard(1).build().unwrap();
        let mut a = MultiArray::zeros(grid.extent());
        a.as_mut_slice().copy_from_slice(&[0.0, 1.0, 2.0, 3.0, 4.0, 0.0]);
        let mut buf = Vec::new();
        pack(&a, send_range(&grid, 0, Side::Lower), &mut buf);
        assert_eq!(buf, vec![1.0]);
        let used = unpack(&mut a, recv_range(&grid, 0, Side::Upper), &buf);
        assert_eq!(used, 1);
        assert_eq!(a.as_slice()[5], 1.0);
    }
}
