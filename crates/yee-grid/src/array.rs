//! Grid-shaped flat storage.

use yee_core::Scalar;

use crate::index::{Extent, Index};

/// A contiguous buffer of `extent.size()` scalars, addressed by [`Index`]
/// in `x`-fastest order.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiArray {
    extent: Extent,
    data: Vec<Scalar>,
}

impl MultiArray {
    /// A zero-filled array.
    pub fn zeros(extent: Extent) -> Self {
        Self {
            extent,
            data: vec![0.0; extent.size()],
        }
    }

    /// Shape of the array.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array holds no element.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at `idx`.
    pub fn get(&self, idx: Index) -> Scalar {
        self.data[self.extent.linear(idx)]
    }

    /// Overwrite the value at `idx`.
    pub fn set(&mut self, idx: Index, value: Scalar) {
        let n = self.extent.linear(idx);
        self.data[n] = value;
    }

    /// Flat read access.
    pub fn as_slice(&self) -> &[Scalar] {
        &self.data
    }

    /// Flat write access.
    pub fn as_mut_slice(&mut self) -> &mut [Scalar] {
        &mut self.data
    }

    /// Fill every element (guards included) with `value`.
    pub fn assign(&mut self, value: Scalar) {
        self.data.fill(value);
    }

    /// Copy every element of `other`.
    ///
    /// # Panics
    ///
    /// If the extents differ.
    pub fn copy_from(&mut self, other: &MultiArray) {
        assert_eq!(self.extent, other.extent, "MultiArray extent mismatch");
        self.data.copy_from_slice(&other.data);
    }

    /// `self += scale * other`, element-wise.
    ///
    /// # Panics
    ///
    /// If the extents differ.
    pub fn add_scaled(&mut self, other: &MultiArray, scale: Scalar) {
        assert_eq!(self.extent, other.extent, "MultiArray extent mismatch");
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += scale * b;
        }
    }
}
