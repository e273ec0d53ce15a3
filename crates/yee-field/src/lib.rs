//! Multi-component fields on a staggered grid.
//!
//! A [`Field<N>`] holds `N` independently allocated arrays on one shared
//! [`Grid`], each tagged with the [`Stagger`] that places its samples. The
//! electric field and current are edge-centred [`VectorField`]s, the
//! magnetic field a face-centred one; divergences and energy densities are
//! [`ScalarField`]s.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use yee_core::error::BackendErrorKind;
use yee_core::{BackendError, Scalar, AXES};
use yee_exec::ExecPolicy;
use yee_grid::{FieldType, Grid, MultiArray, Stagger};

/// A field with one component.
pub type ScalarField = Field<1>;

/// A field with three components.
pub type VectorField = Field<3>;

/// `N` grid-shaped components with fixed staggers on a shared geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct Field<const N: usize> {
    grid: Arc<Grid>,
    data: [MultiArray; N],
    stagger: [Stagger; N],
}

#[track_caller]
fn alloc_components<P: ExecPolicy, const N: usize>(
    grid: &Grid,
    policy: &P,
) -> Result<[MultiArray; N], BackendError> {
    let extent = grid.extent();
    let mut parts = Vec::with_capacity(N);
    for _ in 0..N {
        parts.push(policy.alloc(extent)?);
    }
    parts.try_into().map_err(|_| {
        BackendError::new(BackendErrorKind::AllocationFailed {
            elements: extent.size() * N,
        })
    })
}

impl<const N: usize> Field<N> {
    /// A zeroed field whose staggers follow a named configuration.
    ///
    /// # Errors
    ///
    /// Propagates allocation failures of `policy`.
    #[track_caller]
    pub fn new<P: ExecPolicy>(
        grid: Arc<Grid>,
        kind: FieldType,
        policy: &P,
    ) -> Result<Self, BackendError> {
        Self::with_stagger(grid, kind.staggers(), policy)
    }

    /// A zeroed field with explicit per-component staggers.
    ///
    /// # Errors
    ///
    /// Propagates allocation failures of `policy`.
    #[track_caller]
    pub fn with_stagger<P: ExecPolicy>(
        grid: Arc<Grid>,
        stagger: [Stagger; N],
        policy: &P,
    ) -> Result<Self, BackendError> {
        let data = alloc_components(&grid, policy)?;
        Ok(Self {
            grid,
            data,
            stagger,
        })
    }

    /// Rebind to a new geometry. Storage is reallocated (zeroed); staggers
    /// are kept.
    ///
    /// # Errors
    ///
    /// Propagates allocation failures of `policy`; the field is unchanged
    /// on error.
    #[track_caller]
    pub fn resize<P: ExecPolicy>(&mut self, grid: Arc<Grid>, policy: &P) -> Result<(), BackendError> {
        let data = alloc_components(&grid, policy)?;
        for old in std::mem::replace(&mut self.data, data) {
            policy.free(old);
        }
        self.grid = grid;
        Ok(())
    }

    /// The geometry the field lives on.
    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    /// Component `i`.
    pub fn component(&self, i: usize) -> &MultiArray {
        &self.data[i]
    }

    /// Mutable component `i`.
    pub fn component_mut(&mut self, i: usize) -> &mut MultiArray {
        &mut self.data[i]
    }

    /// All components.
    pub fn components(&self) -> &[MultiArray; N] {
        &self.data
    }

    /// All components, mutably.
    pub fn components_mut(&mut self) -> &mut [MultiArray; N] {
        &mut self.data
    }

    /// Stagger of component `i`.
    pub fn stagger(&self, i: usize) -> Stagger {
        self.stagger[i]
    }

    /// Staggers of all components.
    pub fn staggers(&self) -> [Stagger; N] {
        self.stagger
    }

    /// Flat read access to every component, in order.
    pub fn slices(&self) -> [&[Scalar]; N] {
        std::array::from_fn(|c| self.data[c].as_slice())
    }

    /// Set every cell (guards included) of component `comp` to
    /// `f(position)`, where `position` is the component's sample point.
    pub fn set_values<F>(&mut self, comp: usize, f: F)
    where
        F: Fn([Scalar; AXES]) -> Scalar,
    {
        let grid = Arc::clone(&self.grid);
        let stagger = self.stagger[comp];
        let extent = grid.extent();
        let array = &mut self.data[comp];
        for idx in grid.full_range() {
            let value = f(grid.position(idx, stagger));
            array.as_mut_slice()[extent.linear(idx)] = value;
        }
    }

    /// Fill component `comp` with a constant.
    pub fn assign(&mut self, comp: usize, value: Scalar) {
        self.data[comp].assign(value);
    }

    /// Fill every component with a constant.
    pub fn assign_all(&mut self, value: Scalar) {
        for array in &mut self.data {
            array.assign(value);
        }
    }

    /// Copy all values of `other`.
    ///
    /// # Panics
    ///
    /// If the two fields do not share an extent.
    pub fn copy_from(&mut self, other: &Field<N>) {
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            a.copy_from(b);
        }
    }

    /// `self += scale * other`, component-wise.
    ///
    /// # Panics
    ///
    /// If the two fields do not share an extent.
    pub fn add_by(&mut self, other: &Field<N>, scale: Scalar) {
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            a.add_scaled(b, scale);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use yee_exec::ExecSerial;
    use yee_grid::Index;

    fn grid(n: u32) -> Arc<Grid> {
        Arc::new(
            Grid::builder(2)
                .reso(&[n, n])
                .guard(1)
                .sizes(&[1.0, 1.0])
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn named_type_sets_component_staggers() {
        let b = VectorField::new(grid(4), FieldType::FaceCentered, &ExecSerial).unwrap();
        assert_eq!(b.stagger(0).bits(), 0b001);
        assert_eq!(b.stagger(2).bits(), 0b100);
        for c in 0..3 {
            assert_eq!(b.component(c).extent(), b.grid().extent());
            assert!(b.component(c).as_slice().iter().all(|&x| x == 0.0));
        }
    }

    #[test]
    fn set_values_evaluates_at_sample_position() {
        let mut e = VectorField::new(grid(4), FieldType::EdgeCentered, &ExecSerial).unwrap();
        e.set_values(0, |p| p[0]);
        e.set_values(1, |p| p[0]);
        let idx = Index::new(1, 1, 0);
        // E_x (0b110) is x-centred, E_y (0b101) sits on the x face.
        assert_relative_eq!(e.component(0).get(idx), 0.125);
        assert_relative_eq!(e.component(1).get(idx), 0.0);
    }

    #[test]
    fn resize_rebinds_and_keeps_stagger() {
        let policy = ExecSerial;
        let mut f = ScalarField::new(grid(4), FieldType::VertCentered, &policy).unwrap();
        f.assign(0, 3.0);
        f.resize(grid(8), &policy).unwrap();
        assert_eq!(f.component(0).len(), 100);
        assert_eq!(f.stagger(0), Stagger::VERTEX);
        assert!(f.component(0).as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn add_by_and_copy_from() {
        let policy = ExecSerial;
        let mut a = VectorField::new(grid(2), FieldType::EdgeCentered, &policy).unwrap();
        let mut b = a.clone();
        a.assign_all(1.0);
        b.assign_all(4.0);
        a.add_by(&b, -0.25);
        assert!(a.component(1).as_slice().iter().all(|&x| x == 0.0));
        a.copy_from(&b);
        assert_eq!(a, b);
    }
}
