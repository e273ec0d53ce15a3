//! The field solver state machine and its time updates.

use std::sync::Arc;

use yee_comm::{ChannelTransport, DomainComm, Transport};
use yee_core::{ConfigError, DataHandle, DataRegistry, Scalar, SimContext, SolverError, AXES};
use yee_exec::ExecPolicy;
use yee_field::{ScalarField, VectorField};
use yee_grid::{FieldType, Grid};

use crate::config::{SolverConfig, UpdateMode};
use crate::kernels::{combine, curl_into, curl_step, pml_curl_step, subtract_shifted_curl_curl};
use crate::pml::PmlProfile;
use crate::scratch::ScratchFields;
use crate::stencil::Stencil;

/// Registry names of the fields a solver publishes.
pub mod names {
    /// Electric field, edge-centred.
    pub const E: &str = "E";
    /// Magnetic field, face-centred.
    pub const B: &str = "B";
    /// Current density, edge-centred.
    pub const J: &str = "J";
    /// `div E`, vertex-centred.
    pub const DIV_E: &str = "divE";
    /// `div B`, cell-centred.
    pub const DIV_B: &str = "divB";
    /// `|E|^2`, cell-centred.
    pub const E_SQR: &str = "E2";
    /// `|B|^2`, cell-centred.
    pub const B_SQR: &str = "B2";
    /// Magnetic flux function, vertex-centred.
    pub const FLUX: &str = "flux";

    /// Every published name, in registration order.
    pub const ALL: [&str; 8] = [E, B, J, DIV_E, DIV_B, E_SQR, B_SQR, FLUX];
}

/// Handles to the published fields, resolved once at `init()`.
#[derive(Clone, Debug)]
pub struct FieldHandles {
    /// [`names::E`].
    pub e: DataHandle<VectorField>,
    /// [`names::B`].
    pub b: DataHandle<VectorField>,
    /// [`names::J`].
    pub j: DataHandle<VectorField>,
    /// [`names::DIV_E`].
    pub div_e: DataHandle<ScalarField>,
    /// [`names::DIV_B`].
    pub div_b: DataHandle<ScalarField>,
    /// [`names::E_SQR`].
    pub e_sqr: DataHandle<ScalarField>,
    /// [`names::B_SQR`].
    pub b_sqr: DataHandle<ScalarField>,
    /// [`names::FLUX`].
    pub flux: DataHandle<ScalarField>,
}

impl FieldHandles {
    /// Allocate every field on `grid` and register it.
    fn register<P: ExecPolicy>(
        registry: &mut DataRegistry,
        grid: &Arc<Grid>,
        policy: &P,
    ) -> Result<Self, SolverError> {
        // All or nothing: never leave a partial set behind.
        if let Some(name) = names::ALL.iter().find(|n| registry.contains(n)) {
            return Err(yee_core::RegistryError::Duplicate {
                name: (*name).to_string(),
            }
            .into());
        }
        let vector = |kind| VectorField::new(Arc::clone(grid), kind, policy);
        let scalar = |kind| ScalarField::new(Arc::clone(grid), kind, policy);
        Ok(Self {
            e: registry.register(names::E, vector(FieldType::EdgeCentered)?)?,
            b: registry.register(names::B, vector(FieldType::FaceCentered)?)?,
            j: registry.register(names::J, vector(FieldType::EdgeCentered)?)?,
            div_e: registry.register(names::DIV_E, scalar(FieldType::VertCentered)?)?,
            div_b: registry.register(names::DIV_B, scalar(FieldType::CellCentered)?)?,
            e_sqr: registry.register(names::E_SQR, scalar(FieldType::CellCentered)?)?,
            b_sqr: registry.register(names::B_SQR, scalar(FieldType::CellCentered)?)?,
            flux: registry.register(names::FLUX, scalar(FieldType::VertCentered)?)?,
        })
    }
}

pub(crate) struct SolverState {
    pub(crate) config: SolverConfig,
    pub(crate) stencil: Stencil,
    pub(crate) pml: Option<PmlProfile>,
    pub(crate) fields: FieldHandles,
    pub(crate) scratch: ScratchFields,
    courant_warned: bool,
}

/// Advances `E` and `B` on one subdomain.
///
/// Created uninitialised around a [`DomainComm`]; [`init`](Self::init)
/// reads the configuration, allocates and publishes the fields. Every
/// update and diagnostic before that is [`SolverError::NotInitialized`].
pub struct FieldSolver<P: ExecPolicy, T: Transport = ChannelTransport> {
    comm: DomainComm<P, T>,
    state: Option<SolverState>,
}

impl<P: ExecPolicy, T: Transport> FieldSolver<P, T> {
    /// An uninitialised solver on `comm`'s subdomain.
    pub fn new(comm: DomainComm<P, T>) -> Self {
        Self { comm, state: None }
    }

    /// The communicator of this subdomain.
    pub fn comm(&self) -> &DomainComm<P, T> {
        &self.comm
    }

    /// The subdomain geometry.
    pub fn grid(&self) -> &Arc<Grid> {
        self.comm.grid()
    }

    /// Whether [`init`](Self::init) has run.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// The configuration read at `init()`.
    pub fn config(&self) -> Option<&SolverConfig> {
        self.state.as_ref().map(|s| &s.config)
    }

    /// Handles to the published fields.
    pub fn fields(&self) -> Result<&FieldHandles, SolverError> {
        Ok(&self.state()?.fields)
    }

    /// Largest stable explicit `dt`: `1 / sqrt(sum 1 / delta_d^2)` over the
    /// active axes.
    pub fn courant_limit(&self) -> Scalar {
        let grid = self.comm.grid();
        let inv: Scalar = (0..grid.dim()).map(|d| 1.0 / (grid.delta(d) * grid.delta(d))).sum();
        1.0 / inv.sqrt()
    }

    /// Read the configuration from `ctx.params`, allocate `E`, `B`, `J`
    /// and the diagnostic fields, register them in `ctx.registry` and
    /// allocate the work fields.
    ///
    /// # Errors
    ///
    /// - [`SolverError::AlreadyInitialized`] on a second call;
    /// - any [`ConfigError`] of [`SolverConfig::from_params`];
    /// - [`RegistryError::Duplicate`](yee_core::RegistryError::Duplicate)
    ///   if a field name is taken (nothing is registered then);
    /// - allocation failures.
    pub fn init(&mut self, ctx: &mut SimContext) -> Result<(), SolverError> {
        if self.state.is_some() {
            return Err(SolverError::AlreadyInitialized);
        }
        let grid = Arc::clone(self.comm.grid());
        let config = SolverConfig::from_params(&ctx.params, &grid)?;
        let fields = FieldHandles::register(&mut ctx.registry, &grid, self.comm.policy())?;
        let scratch = ScratchFields::new(&grid, self.comm.policy())?;
        let pml = config.pml.as_ref().map(|p| PmlProfile::new(&grid, p));

        tracing::info!(
            rank = %self.comm.rank(),
            backend = self.comm.policy().name(),
            mode = ?config.mode,
            pml_layers = pml.as_ref().is_some_and(PmlProfile::is_active),
            "field solver initialised"
        );
        self.state = Some(SolverState {
            config,
            stencil: Stencil::new(&grid),
            pml,
            fields,
            scratch,
            courant_warned: false,
        });
        Ok(())
    }

    pub(crate) fn state(&self) -> Result<&SolverState, SolverError> {
        self.state.as_ref().ok_or(SolverError::NotInitialized)
    }

    pub(crate) fn parts(&mut self) -> Result<(&mut DomainComm<P, T>, &mut SolverState), SolverError> {
        match self.state.as_mut() {
            Some(state) => Ok((&mut self.comm, state)),
            None => Err(SolverError::NotInitialized),
        }
    }

    /// Refresh the guard cells of `E`, `B` and `J`, e.g. after a driver
    /// wrote initial conditions or deposited a current.
    pub fn exchange_fields(&mut self) -> Result<(), SolverError> {
        let (comm, state) = self.parts()?;
        for handle in [&state.fields.e, &state.fields.b, &state.fields.j] {
            let mut field = handle.write()?;
            comm.exchange_guards(&mut *field)?;
        }
        Ok(())
    }

    /// One leapfrog step:
    /// `B -= dt/2 curl E`, `E += dt (curl B - J)`, `B -= dt/2 curl E`, with
    /// a guard exchange after each sub-step. Inside absorbing layers both
    /// advances use the split-field form.
    pub fn update_explicit(&mut self, dt: Scalar, time: Scalar) -> Result<(), SolverError> {
        let (comm, state) = self.parts()?;
        let SolverState {
            stencil,
            pml,
            fields,
            scratch,
            ..
        } = state;
        let mut e = fields.e.write()?;
        let mut b = fields.b.write()?;
        let j = fields.j.read()?;
        let stencil: &Stencil = stencil;
        let pml = pml.as_ref().filter(|p| p.is_active());
        let half = 0.5 * dt;

        let advance_b = |comm: &mut DomainComm<P, T>,
                         b: &mut VectorField,
                         e: &VectorField,
                         scratch: &mut ScratchFields|
         -> Result<(), SolverError> {
            match pml {
                Some(profile) => pml_curl_step(
                    comm.policy(),
                    stencil,
                    profile,
                    b,
                    e,
                    None,
                    (&mut scratch.b1, &mut scratch.b2),
                    half,
                    -1.0,
                ),
                None => curl_step(comm.policy(), stencil, b, e, None, half, -1.0),
            }
            comm.exchange_guards(b)?;
            Ok(())
        };

        advance_b(&mut *comm, &mut *b, &*e, &mut *scratch)?;
        match pml {
            Some(profile) => pml_curl_step(
                comm.policy(),
                stencil,
                profile,
                &mut e,
                &b,
                Some(&*j),
                (&mut scratch.e1, &mut scratch.e2),
                dt,
                1.0,
            ),
            None => curl_step(comm.policy(), stencil, &mut e, &b, Some(&*j), dt, 1.0),
        }
        comm.exchange_guards(&mut *e)?;
        advance_b(&mut *comm, &mut *b, &*e, &mut *scratch)?;
        comm.policy().sync()?;

        tracing::trace!(rank = %comm.rank(), time, dt, "explicit field update");
        Ok(())
    }

    /// One semi-implicit step with weights `alpha` (old state) and `beta`
    /// (new state):
    ///
    /// ```text
    /// B' = B - dt curl(alpha E + beta E')
    /// E' = E + dt (curl(alpha B + beta B') - J)
    /// ```
    ///
    /// Eliminating `E'` gives `(1 + beta^2 dt^2 curl curl) B' = rhs` with
    /// `rhs = B - dt curl((alpha + beta) E + alpha beta dt curl B - beta dt J)`,
    /// solved by Chebyshev sweeps (at least `implicit_iterations`, more if
    /// `implicit_tolerance` needs them); `E'` then follows directly. `alpha + beta = 1`
    /// is the caller's contract. The scheme damps for `beta > 1/2` at any
    /// `dt`, is neutral at `beta = 1/2` and grows below it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnsupportedCombination`] if absorbing layers are
    /// configured.
    pub fn update_semi_implicit(
        &mut self,
        dt: Scalar,
        alpha: Scalar,
        beta: Scalar,
        time: Scalar,
    ) -> Result<(), SolverError> {
        let (comm, state) = self.parts()?;
        if state.config.pml.is_some() {
            return Err(ConfigError::UnsupportedCombination {
                first: "use_implicit".into(),
                second: "damping_boundary".into(),
                reason: "absorbing layers are only implemented for explicit updates".into(),
            }
            .into());
        }
        let (iterations, tolerance) = match state.config.mode {
            UpdateMode::SemiImplicit {
                iterations, tolerance, ..
            } => (iterations, tolerance),
            UpdateMode::Explicit => (DEFAULT_SWEEPS, DEFAULT_TOLERANCE),
        };
        let SolverState {
            stencil,
            fields,
            scratch,
            ..
        } = state;
        let stencil: &Stencil = stencil;
        let mut e = fields.e.write()?;
        let mut b = fields.b.write()?;
        let j = fields.j.read()?;
        let policy = comm.policy().clone();
        let interior = b.grid().interior_range();
        let full = b.grid().full_range();

        // b1 <- B, e1 <- curl B.
        scratch.b1.copy_from(&b);
        curl_into(&policy, stencil, &mut scratch.e1, &b, 1.0);

        // e2 <- (alpha + beta) E + alpha beta dt curl B - beta dt J.
        for c in 0..AXES {
            let (ec, cc, jc) = (
                e.component(c).as_slice(),
                scratch.e1.component(c).as_slice(),
                j.component(c).as_slice(),
            );
            policy.update_cells(scratch.e2.component_mut(c), interior, |_, n, _| {
                (alpha + beta) * ec[n] + alpha * beta * dt * cc[n] - beta * dt * jc[n]
            });
        }
        comm.exchange_guards(&mut scratch.e2)?;

        // b2 <- B - dt curl e2.
        scratch.b2.copy_from(&b);
        curl_step(&policy, stencil, &mut scratch.b2, &scratch.e2, None, dt, -1.0);
        comm.exchange_guards(&mut scratch.b2)?;

        // (1 + beta^2 dt^2 curl curl) B' = rhs, starting from B' = rhs.
        b.copy_from(&scratch.b2);
        let weight = beta * beta * dt * dt;
        let sweeps = iterations.max(required_sweeps(weight * stencil.curl_curl_bound(), tolerance));
        let ScratchFields { e1, b2, b3, .. } = &mut *scratch;
        chebyshev_sweeps(comm, stencil, &mut b, b2, b3, e1, weight, sweeps)?;

        // E' = E + dt (curl(alpha B + beta B') - J).
        for c in 0..AXES {
            let bc = b.component(c).as_slice();
            policy.update_cells(scratch.b1.component_mut(c), full, |_, n, old| alpha * old + beta * bc[n]);
        }
        curl_step(&policy, stencil, &mut e, &scratch.b1, Some(&*j), dt, 1.0);
        comm.exchange_guards(&mut *e)?;
        policy.sync()?;

        tracing::trace!(rank = %comm.rank(), time, dt, alpha, beta, sweeps, "semi-implicit field update");
        Ok(())
    }

    /// Advance by `dt` with the configured scheme, then run every
    /// diagnostic if `step` is a multiple of `fld_output_interval`.
    ///
    /// A `dt` above [`courant_limit`](Self::courant_limit) is logged once
    /// at `warn` level and used as given.
    pub fn update(&mut self, dt: Scalar, step: u64, time: Scalar) -> Result<(), SolverError> {
        let limit = self.courant_limit();
        let (comm, state) = self.parts()?;
        if dt > limit && !state.courant_warned {
            tracing::warn!(rank = %comm.rank(), dt, limit, "time step exceeds the Courant limit");
            state.courant_warned = true;
        }
        let mode = state.config.mode;
        let interval = state.config.output_interval;
        match mode {
            UpdateMode::Explicit => self.update_explicit(dt, time)?,
            UpdateMode::SemiImplicit { alpha, beta, .. } => self.update_semi_implicit(dt, alpha, beta, time)?,
        }
        if step % interval == 0 {
            self.compute_divs_e_b()?;
            self.compute_flux()?;
            self.compute_eb_sqr()?;
        }
        Ok(())
    }
}

/// Sweeps when the semi-implicit scheme is called outside a semi-implicit
/// configuration.
const DEFAULT_SWEEPS: u32 = 5;
const DEFAULT_TOLERANCE: Scalar = 1.0e-4;

/// Chebyshev sweeps whose error bound `1 / T_m(sigma)` drops below
/// `tolerance` on a spectrum `[1, 1 + spread]`.
fn required_sweeps(spread: Scalar, tolerance: Scalar) -> u32 {
    if spread.is_nan() || spread <= 0.0 {
        return 0;
    }
    let sigma = 1.0 + 2.0 / spread;
    ((1.0 / tolerance).acosh() / sigma.acosh()).ceil() as u32
}

/// `sweeps` Chebyshev iterations for `(1 + weight curl curl) x = rhs`.
///
/// `x` enters holding the first guess with filled guards, `residual`
/// holding `rhs`. `curl curl` is positive semi-definite with eigenvalues
/// below [`Stencil::curl_curl_bound`], so the operator's spectrum lies in
/// `[1, 1 + weight * bound]` and the iteration converges for any weight
/// without global reductions. Each sweep costs one operator application.
#[allow(clippy::too_many_arguments)]
fn chebyshev_sweeps<P: ExecPolicy, T: Transport>(
    comm: &mut DomainComm<P, T>,
    stencil: &Stencil,
    x: &mut VectorField,
    residual: &mut VectorField,
    direction: &mut VectorField,
    curl: &mut VectorField,
    weight: Scalar,
    sweeps: u32,
) -> Result<(), SolverError> {
    let half_width = 0.5 * weight * stencil.curl_curl_bound();
    if sweeps == 0 || half_width <= 0.0 {
        return Ok(());
    }
    let policy = comm.policy().clone();
    let centre = 1.0 + half_width;
    let sigma = centre / half_width;

    // residual <- rhs - A x, direction <- residual / centre.
    curl_into(&policy, stencil, curl, x, 1.0);
    comm.exchange_guards(curl)?;
    subtract_shifted_curl_curl(&policy, stencil, residual, x, curl, weight);
    combine(&policy, direction, residual, 0.0, 1.0 / centre);
    comm.exchange_guards(direction)?;

    let mut rho = 1.0 / sigma;
    for sweep in 1..=sweeps {
        combine(&policy, x, direction, 1.0, 1.0);
        if sweep == sweeps {
            break;
        }
        curl_into(&policy, stencil, curl, direction, 1.0);
        comm.exchange_guards(curl)?;
        subtract_shifted_curl_curl(&policy, stencil, residual, direction, curl, weight);
        let next = 1.0 / (2.0 * sigma - rho);
        combine(&policy, direction, residual, next * rho, 2.0 * next / half_width);
        comm.exchange_guards(direction)?;
        rho = next;
    }
    comm.exchange_guards(x)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use yee_comm::Boundaries;
    use yee_core::{Params, RegistryError};
    use yee_exec::ExecSerial;

    fn solver(n: u32) -> FieldSolver<ExecSerial> {
        let grid = Arc::new(Grid::builder(1).reso(&[n]).guard(1).build().unwrap());
        FieldSolver::new(DomainComm::single(ExecSerial, grid, Boundaries::periodic()).unwrap())
    }

    #[test]
    fn updates_before_init_are_rejected() {
        let mut s = solver(8);
        assert!(!s.is_initialized());
        assert_eq!(s.update_explicit(0.1, 0.0), Err(SolverError::NotInitialized));
        assert_eq!(s.update_semi_implicit(0.1, 0.5, 0.5, 0.0), Err(SolverError::NotInitialized));
        assert_eq!(s.compute_divs_e_b(), Err(SolverError::NotInitialized));
        assert!(s.fields().is_err());
    }

    #[test]
    fn init_registers_every_field_once() {
        let mut s = solver(8);
        let mut ctx = SimContext::default();
        s.init(&mut ctx).unwrap();
        assert_eq!(ctx.registry.names().collect::<Vec<_>>(), names::ALL.to_vec());
        assert_eq!(s.init(&mut ctx), Err(SolverError::AlreadyInitialized));

        let e = ctx.registry.get::<VectorField>(names::E).unwrap();
        assert!(e.ptr_eq(&s.fields().unwrap().e));
        assert_eq!(e.read().unwrap().staggers(), FieldType::EdgeCentered.staggers());
    }

    #[test]
    fn taken_name_registers_nothing() {
        let mut ctx = SimContext::default();
        ctx.registry.register(names::FLUX, 0u8).unwrap();
        let mut s = solver(8);
        assert_eq!(
            s.init(&mut ctx),
            Err(SolverError::Registry(RegistryError::Duplicate {
                name: names::FLUX.into()
            }))
        );
        assert_eq!(ctx.registry.len(), 1);
        assert!(!s.is_initialized());
    }

    #[test]
    fn bad_configuration_fails_init() {
        let mut ctx = SimContext::new(
            Params::new()
                .with("use_implicit", true)
                .with("damping_boundary", [true, false]),
        );
        let mut s = solver(32);
        assert!(matches!(
            s.init(&mut ctx),
            Err(SolverError::Config(ConfigError::UnsupportedCombination { .. }))
        ));
        assert!(ctx.registry.is_empty());
    }

    #[test]
    fn semi_implicit_call_with_layers_is_rejected() {
        let mut ctx = SimContext::new(Params::new().with("damping_boundary", [true, false]).with("pml_length", 4));
        let mut s = solver(32);
        s.init(&mut ctx).unwrap();
        assert!(matches!(
            s.update_semi_implicit(0.1, 0.5, 0.5, 0.0),
            Err(SolverError::Config(ConfigError::UnsupportedCombination { .. }))
        ));
    }

    #[test]
    fn sweep_count_meets_tolerance() {
        assert_eq!(required_sweeps(0.0, 1e-4), 0);
        let spread: Scalar = 3.24;
        let m = required_sweeps(spread, 1e-4);
        let sigma = 1.0 + 2.0 / spread;
        let bound = |m: u32| 1.0 / (m as Scalar * sigma.acosh()).cosh();
        assert!(bound(m) <= 1e-4);
        assert!(bound(m - 1) > 1e-4);
        assert!(required_sweeps(4.0 * spread, 1e-4) > m);
    }

    #[test]
    fn courant_limit_over_active_axes() {
        assert!((solver(8).courant_limit() - 1.0).abs() < 1e-12);
        let grid = Arc::new(Grid::builder(2).reso(&[4, 4]).delta(&[1.0, 0.5]).build().unwrap());
        let s: FieldSolver<ExecSerial> =
            FieldSolver::new(DomainComm::single(ExecSerial, grid, Boundaries::periodic()).unwrap());
        assert!((s.courant_limit() - 1.0 / (5.0 as Scalar).sqrt()).abs() < 1e-12);
    }
}
