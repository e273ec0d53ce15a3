//! Work fields owned by one solver.

use std::sync::Arc;

use yee_core::BackendError;
use yee_exec::ExecPolicy;
use yee_field::VectorField;
use yee_grid::{FieldType, Grid};

/// Auxiliary fields shaped like the primary ones, allocated at `init()`
/// and never published in the registry.
///
/// With absorbing layers, `e1`/`e2` (`b1`/`b2`) hold the two split curl
/// terms of `E` (`B`) inside the layers. The semi-implicit scheme reuses
/// them: `b1` for the old magnetic field, `b2` for the right-hand side and
/// then the residual, `b3` for the search direction, `e1`/`e2` for
/// intermediate curls.
#[derive(Clone, Debug)]
pub struct ScratchFields {
    /// Edge-centred, first split term.
    pub e1: VectorField,
    /// Edge-centred, second split term.
    pub e2: VectorField,
    /// Face-centred, first split term.
    pub b1: VectorField,
    /// Face-centred, second split term.
    pub b2: VectorField,
    /// Face-centred, semi-implicit search direction.
    pub b3: VectorField,
}

impl ScratchFields {
    /// Zeroed work fields on `grid`.
    ///
    /// # Errors
    ///
    /// Propagates allocation failures of `policy`.
    #[track_caller]
    pub fn new<P: ExecPolicy>(grid: &Arc<Grid>, policy: &P) -> Result<Self, BackendError> {
        Ok(Self {
            e1: VectorField::new(Arc::clone(grid), FieldType::EdgeCentered, policy)?,
            e2: VectorField::new(Arc::clone(grid), FieldType::EdgeCentered, policy)?,
            b1: VectorField::new(Arc::clone(grid), FieldType::FaceCentered, policy)?,
            b2: VectorField::new(Arc::clone(grid), FieldType::FaceCentered, policy)?,
            b3: VectorField::new(Arc::clone(grid), FieldType::FaceCentered, policy)?,
        })
    }
}
