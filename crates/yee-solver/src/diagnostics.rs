//! Derived fields and reductions. None of these touch `E`, `B` or `J`.

use yee_comm::Transport;
use yee_core::{Scalar, SolverError, AXES};
use yee_exec::ExecPolicy;
use yee_grid::Index;

use crate::solver::FieldSolver;

impl<P: ExecPolicy, T: Transport> FieldSolver<P, T> {
    /// `divE` on vertices and `divB` on cell centres, over the interior.
    pub fn compute_divs_e_b(&mut self) -> Result<(), SolverError> {
        let state = self.state()?;
        let policy = self.comm().policy();
        let stencil = &state.stencil;
        let e = state.fields.e.read()?;
        let b = state.fields.b.read()?;
        let range = e.grid().interior_range();

        let (es, est) = (e.slices(), e.staggers());
        let mut div_e = state.fields.div_e.write()?;
        policy.update_cells(div_e.component_mut(0), range, |_, n, _| stencil.div(es, est, n));

        let (bs, bst) = (b.slices(), b.staggers());
        let mut div_b = state.fields.div_b.write()?;
        policy.update_cells(div_b.component_mut(0), range, |_, n, _| stencil.div(bs, bst, n));
        policy.sync()?;
        Ok(())
    }

    /// `E2 = |E|^2` and `B2 = |B|^2` per cell, summing the components held
    /// at the same array index.
    pub fn compute_eb_sqr(&mut self) -> Result<(), SolverError> {
        let state = self.state()?;
        let policy = self.comm().policy();
        let e = state.fields.e.read()?;
        let b = state.fields.b.read()?;
        let range = e.grid().interior_range();

        let es = e.slices();
        let mut e_sqr = state.fields.e_sqr.write()?;
        policy.update_cells(e_sqr.component_mut(0), range, |_, n, _| {
            es.iter().map(|c| c[n] * c[n]).sum()
        });
        let bs = b.slices();
        let mut b_sqr = state.fields.b_sqr.write()?;
        policy.update_cells(b_sqr.component_mut(0), range, |_, n, _| {
            bs.iter().map(|c| c[n] * c[n]).sum()
        });
        policy.sync()?;
        Ok(())
    }

    /// The flux function `Φ(x, y) = Σ_{y' < y} B_x(x, y') Δy` on the lower
    /// vertices of the interior, continued across ranks along `y`. Left at
    /// zero on 1D grids.
    ///
    /// Collective along the `y` rank chain on 2D and 3D grids.
    pub fn compute_flux(&mut self) -> Result<(), SolverError> {
        let (comm, state) = self.parts()?;
        let grid = std::sync::Arc::clone(comm.grid());
        if grid.dim() < 2 {
            return Ok(());
        }
        comm.policy().sync()?;
        let b = state.fields.b.read()?;
        let bx = b.component(0);
        let range = grid.interior_range();
        let (gy, ny, dy) = (grid.guard(1), grid.reso(1), grid.delta(1));

        let columns: Vec<(u32, u32)> = (range.begin.get(2)..range.end.get(2))
            .flat_map(|z| (range.begin.get(0)..range.end.get(0)).map(move |x| (x, z)))
            .collect();
        let totals: Vec<Scalar> = columns
            .iter()
            .map(|&(x, z)| (gy..gy + ny).map(|y| bx.get(Index::new(x, y, z)) * dy).sum())
            .collect();
        let offsets = comm.exclusive_scan(1, &totals)?;

        let mut flux = state.fields.flux.write()?;
        let out = flux.component_mut(0);
        for (&(x, z), &start) in columns.iter().zip(&offsets) {
            let mut acc = start;
            for y in gy..gy + ny {
                let idx = Index::new(x, y, z);
                out.set(idx, acc);
                acc += bx.get(idx) * dy;
            }
        }
        Ok(())
    }

    /// Total field energy `½ Σ (|E|^2 + |B|^2) ΔV` over the global domain.
    ///
    /// Collective over all ranks.
    pub fn field_energy(&mut self) -> Result<Scalar, SolverError> {
        let (comm, state) = self.parts()?;
        let local = {
            let e = state.fields.e.read()?;
            let b = state.fields.b.read()?;
            let grid = e.grid();
            let (es, bs) = (e.slices(), b.slices());
            let sum = comm.policy().reduce_sum(grid.extent(), grid.interior_range(), |_, n| {
                (0..AXES).map(|c| es[c][n] * es[c][n] + bs[c][n] * bs[c][n]).sum::<Scalar>()
            });
            0.5 * sum * grid.cell_volume()
        };
        Ok(comm.all_reduce_sum(local)?)
    }
}
