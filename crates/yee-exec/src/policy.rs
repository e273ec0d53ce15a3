//! The [`ExecPolicy`] trait.

use yee_core::error::BackendErrorKind;
use yee_core::{BackendError, Scalar};
use yee_grid::{CellRange, Extent, Index, MultiArray};

use crate::atomic::AtomicScalar;

/// A backend for per-cell loops and the memory those loops touch.
///
/// Host policies keep arrays in ordinary memory and the transfer hooks are
/// no-ops. A device policy would mirror arrays in device memory; callers
/// that need host-visible data (packing guard slabs, I/O) bracket that
/// access with [`copy_to_host`](Self::copy_to_host) and
/// [`copy_to_device`](Self::copy_to_device).
pub trait ExecPolicy: Clone + Send + Sync + 'static {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// A zero-filled array of `extent`.
    ///
    /// # Errors
    ///
    /// [`BackendErrorKind::AllocationFailed`] if the element count
    /// overflows the address space.
    #[track_caller]
    fn alloc(&self, extent: Extent) -> Result<MultiArray, BackendError> {
        let elements = extent
            .0
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n as usize));
        match elements {
            Some(n) if n <= isize::MAX as usize / std::mem::size_of::<Scalar>() => {
                Ok(MultiArray::zeros(extent))
            }
            _ => Err(BackendError::new(BackendErrorKind::AllocationFailed {
                elements: elements.unwrap_or(usize::MAX),
            })),
        }
    }

    /// Release an array allocated by [`alloc`](Self::alloc).
    fn free(&self, array: MultiArray) {
        drop(array);
    }

    /// Make host-side changes of `array` visible to kernels.
    fn copy_to_device(&self, _array: &mut MultiArray) {}

    /// Make kernel-side changes of `array` visible to the host.
    fn copy_to_host(&self, _array: &mut MultiArray) {}

    /// Invoke `f(idx, linear)` for every index of `range` inside an array
    /// of shape `extent`.
    fn for_each_cell<F>(&self, extent: Extent, range: CellRange, f: F)
    where
        F: Fn(Index, usize) + Send + Sync;

    /// Replace every cell of `range` in `out` with `f(idx, linear, old)`.
    fn update_cells<F>(&self, out: &mut MultiArray, range: CellRange, f: F)
    where
        F: Fn(Index, usize, Scalar) -> Scalar + Send + Sync;

    /// Sum of `f(idx, linear)` over `range` inside an array of shape
    /// `extent`.
    fn reduce_sum<F>(&self, extent: Extent, range: CellRange, f: F) -> Scalar
    where
        F: Fn(Index, usize) -> Scalar + Send + Sync;

    /// Atomically add `value` to `target`.
    fn atomic_add(&self, target: &AtomicScalar, value: Scalar) {
        target.fetch_add(value);
    }

    /// Block until every dispatched loop has completed.
    fn sync(&self) -> Result<(), BackendError> {
        Ok(())
    }
}
