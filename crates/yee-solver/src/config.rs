//! Solver configuration read from [`Params`] at `init()`.
//!
//! | parameter | type | default |
//! |---|---|---|
//! | `use_implicit` | bool | `false` |
//! | `implicit_beta` | float in `[0, 1]` | `0.5` (`alpha = 1 - beta`) |
//! | `implicit_iterations` | int `>= 1`, minimum sweeps | `5` |
//! | `implicit_tolerance` | float in `(0, 1)` | `1e-4` |
//! | `damping_boundary` | bool array, `2 * dim` | all `false` |
//! | `pml_length` | int `>= 1` | `16` |
//! | `pml_order` | int | `3` |
//! | `pml_sigma_max` | float `> 0` | `(order + 1) ln(10^6) / (2 L delta)` per axis |
//! | `fld_output_interval` | int `>= 1` | `1` |

use yee_core::{ConfigError, Params, Scalar, Side, AXES};
use yee_grid::Grid;

// ── UpdateMode ─────────────────────────────────────────────────────

/// Time integration scheme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UpdateMode {
    /// Leapfrog: half `B`, full `E`, half `B`.
    Explicit,
    /// Weighted blend of old and new curls.
    SemiImplicit {
        /// Weight of the old state.
        alpha: Scalar,
        /// Weight of the new state.
        beta: Scalar,
        /// Minimum Chebyshev sweeps for the new magnetic field.
        iterations: u32,
        /// Bound on the relative error left by the sweeps; more sweeps
        /// than `iterations` run when the time step needs them.
        tolerance: Scalar,
    },
}

// ── PmlConfig ──────────────────────────────────────────────────────

/// Absorbing layers on a subset of the global faces.
#[derive(Clone, Debug, PartialEq)]
pub struct PmlConfig {
    /// Layer depth in cells.
    pub length: u32,
    /// Polynomial grading exponent of the conductivity.
    pub order: u32,
    /// Damped faces, indexed by [`Side::face`]; entries past `2 * dim` stay `false`.
    pub faces: [bool; 2 * AXES],
    /// Peak conductivity per axis.
    pub sigma_max: [Scalar; AXES],
}

impl PmlConfig {
    /// Depth used when `pml_length` is absent.
    pub const DEFAULT_LENGTH: u32 = 16;
    /// Grading used when `pml_order` is absent.
    pub const DEFAULT_ORDER: u32 = 3;

    /// Layers of `length` cells on `faces` with the default grading and
    /// peak conductivity for `grid`'s spacing.
    pub fn new(grid: &Grid, length: u32, faces: &[bool]) -> Self {
        let mut mask = [false; 2 * AXES];
        for (slot, &on) in mask.iter_mut().zip(faces) {
            *slot = on;
        }
        let order = Self::DEFAULT_ORDER;
        Self {
            length,
            order,
            faces: mask,
            sigma_max: std::array::from_fn(|d| default_sigma_max(order, length, grid.delta(d))),
        }
    }

    /// Whether the face `side` of `axis` is damped.
    pub fn damps(&self, axis: usize, side: Side) -> bool {
        self.faces[side.face(axis)]
    }
}

/// Peak conductivity giving a normal-incidence reflection of `1e-6`.
pub fn default_sigma_max(order: u32, length: u32, delta: Scalar) -> Scalar {
    let ln_r = (1.0e6 as Scalar).ln();
    (order as Scalar + 1.0) * ln_r / (2.0 * length as Scalar * delta)
}

// ── SolverConfig ───────────────────────────────────────────────────

/// Everything the field solver reads from the configuration provider.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Time integration scheme used by `update`.
    pub mode: UpdateMode,
    /// Absorbing layers, if any face is damped.
    pub pml: Option<PmlConfig>,
    /// Steps between diagnostic passes in `update`.
    pub output_interval: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            mode: UpdateMode::Explicit,
            pml: None,
            output_interval: 1,
        }
    }
}

impl SolverConfig {
    /// Read and validate the solver parameters for the global geometry
    /// `global`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidParameter`] for a mistyped or out-of-range
    ///   value, naming the parameter;
    /// - [`ConfigError::UnsupportedCombination`] when semi-implicit updates
    ///   are requested together with damped faces.
    pub fn from_params(params: &Params, global: &Grid) -> Result<Self, ConfigError> {
        let dim = global.dim();

        let use_implicit: bool = params.get_or("use_implicit", false)?;
        let beta: f64 = params.get_or("implicit_beta", 0.5)?;
        if !(0.0..=1.0).contains(&beta) {
            return Err(ConfigError::invalid(
                "implicit_beta",
                format!("must lie in [0, 1], got {beta}"),
            ));
        }
        let iterations: u32 = params.get_or("implicit_iterations", 5u32)?;
        if iterations == 0 {
            return Err(ConfigError::invalid("implicit_iterations", "must be at least 1"));
        }
        let tolerance: f64 = params.get_or("implicit_tolerance", 1.0e-4)?;
        if !(tolerance > 0.0 && tolerance < 1.0) {
            return Err(ConfigError::invalid(
                "implicit_tolerance",
                format!("must lie in (0, 1), got {tolerance}"),
            ));
        }
        let mode = if use_implicit {
            UpdateMode::SemiImplicit {
                alpha: (1.0 - beta) as Scalar,
                beta: beta as Scalar,
                iterations,
                tolerance: tolerance as Scalar,
            }
        } else {
            UpdateMode::Explicit
        };

        let pml = Self::pml_from_params(params, global)?;
        if use_implicit && pml.is_some() {
            return Err(ConfigError::UnsupportedCombination {
                first: "use_implicit".into(),
                second: "damping_boundary".into(),
                reason: "absorbing layers are only implemented for explicit updates".into(),
            });
        }

        let output_interval: u64 = params.get_or("fld_output_interval", 1u32)?.into();
        if output_interval == 0 {
            return Err(ConfigError::invalid("fld_output_interval", "must be at least 1"));
        }

        let config = Self {
            mode,
            pml,
            output_interval,
        };
        tracing::debug!(?config, dim, "field solver configuration");
        Ok(config)
    }

    fn pml_from_params(params: &Params, global: &Grid) -> Result<Option<PmlConfig>, ConfigError> {
        let dim = global.dim();
        let faces: Vec<bool> = params.get_or("damping_boundary", vec![false; 2 * dim])?;
        if faces.len() != 2 * dim {
            return Err(ConfigError::invalid(
                "damping_boundary",
                format!("expected {} entries, got {}", 2 * dim, faces.len()),
            ));
        }
        if !faces.iter().any(|&f| f) {
            return Ok(None);
        }

        let length: u32 = params.get_or("pml_length", PmlConfig::DEFAULT_LENGTH)?;
        if length == 0 {
            return Err(ConfigError::invalid("pml_length", "must be at least 1"));
        }
        let mut pml = PmlConfig::new(global, length, &faces);
        for axis in 0..dim {
            let (lo, hi) = (pml.damps(axis, Side::Lower), pml.damps(axis, Side::Upper));
            let needed = length * (u32::from(lo) + u32::from(hi));
            if needed > global.global_reso(axis) {
                return Err(ConfigError::invalid(
                    "pml_length",
                    format!(
                        "{needed} damped cells along axis {axis} exceed its {} cells",
                        global.global_reso(axis)
                    ),
                ));
            }
        }

        pml.order = params.get_or("pml_order", PmlConfig::DEFAULT_ORDER)?;
        match params.get::<f64>("pml_sigma_max")? {
            Some(s) if s > 0.0 && s.is_finite() => pml.sigma_max = [s as Scalar; AXES],
            Some(s) => {
                return Err(ConfigError::invalid(
                    "pml_sigma_max",
                    format!("must be finite and > 0, got {s}"),
                ))
            }
            None => {
                pml.sigma_max =
                    std::array::from_fn(|d| default_sigma_max(pml.order, length, global.delta(d)));
            }
        }
        Ok(Some(pml))
    }
}
