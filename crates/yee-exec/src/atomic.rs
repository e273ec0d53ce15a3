//! Lock-free floating-point accumulation.

use std::sync::atomic::Ordering;

use yee_core::{Scalar, ScalarBits as AtomicBits};
use yee_grid::{Extent, MultiArray};

/// A [`Scalar`] that can be added to from many threads.
///
/// Stored as its bit pattern; additions retry a compare-exchange until no
/// other thread intervened.
#[derive(Debug, Default)]
pub struct AtomicScalar(AtomicBits);

impl AtomicScalar {
    /// A new atomic holding `value`.
    pub fn new(value: Scalar) -> Self {
        Self(AtomicBits::new(value.to_bits()))
    }

    /// Current value.
    pub fn load(&self) -> Scalar {
        Scalar::from_bits(self.0.load(Ordering::Acquire))
    }

    /// Overwrite the value.
    pub fn store(&self, value: Scalar) {
        self.0.store(value.to_bits(), Ordering::Release);
    }

    /// Add `value`, returning the previous value.
    pub fn fetch_add(&self, value: Scalar) -> Scalar {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let new = (Scalar::from_bits(current) + value).to_bits();
            match self
                .0
                .compare_exchange_weak(current, new, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(prev) => return Scalar::from_bits(prev),
                Err(actual) => current = actual,
            }
        }
    }
}

/// A grid-shaped array of [`AtomicScalar`]s, the accumulation target of
/// deposition-style loops.
#[derive(Debug)]
pub struct AtomicArray {
    extent: Extent,
    data: Vec<AtomicScalar>,
}

impl AtomicArray {
    /// A zero-filled array.
    pub fn zeros(extent: Extent) -> Self {
        Self {
            extent,
            data: (0..extent.size()).map(|_| AtomicScalar::default()).collect(),
        }
    }

    /// Shape of the array.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// The element at linear offset `n`.
    pub fn at(&self, n: usize) -> &AtomicScalar {
        &self.data[n]
    }

    /// Add the accumulated values into `out`.
    ///
    /// # Panics
    ///
    /// If the extents differ.
    pub fn add_into(&self, out: &mut MultiArray) {
        assert_eq!(self.extent, out.extent(), "AtomicArray extent mismatch");
        for (o, a) in out.as_mut_slice().iter_mut().zip(&self.data) {
            *o += a.load();
        }
    }
}
