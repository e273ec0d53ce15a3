//! Test fixtures and mock types for Yee development.
//!
//! Provides seeded random field fills, pulse profiles, a mock
//! [`ParticleRecord`] and shorthand constructors for grids and
//! decompositions used across the workspace's tests, benches and demos.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use yee_comm::{Boundaries, Decomposition, ParticleRecord};
use yee_core::{Scalar, AXES};
use yee_field::Field;
use yee_grid::{Grid, MultiArray};

// ── Geometry shorthands ─────────────────────────────────────────────

/// A whole-domain grid with unit spacing.
pub fn unit_grid(reso: &[u32], guard: u32) -> Grid {
    Grid::builder(reso.len())
        .reso(reso)
        .guard(guard)
        .build()
        .expect("valid test grid")
}

/// A decomposition of a unit-spaced grid.
pub fn decomposition(reso: &[u32], guard: u32, ranks: &[usize], boundaries: Boundaries) -> Decomposition {
    Decomposition::new(unit_grid(reso, guard), ranks, boundaries).expect("valid test decomposition")
}

// ── Random fills ────────────────────────────────────────────────────

/// Uniform samples in `[-1, 1)` from a seeded ChaCha stream.
pub struct SeededUniform {
    rng: ChaCha8Rng,
}

impl SeededUniform {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Next sample.
    pub fn sample(&mut self) -> Scalar {
        // 53 random mantissa bits in [0, 1).
        let unit = (self.rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        (2.0 * unit - 1.0) as Scalar
    }
}

/// Overwrite every interior cell of every component with seeded noise of
/// the given amplitude. Guards are left alone.
pub fn fill_random<const N: usize>(field: &mut Field<N>, seed: u64, amplitude: Scalar) {
    let mut rng = SeededUniform::new(seed);
    let range = field.grid().interior_range();
    for c in 0..N {
        let array = field.component_mut(c);
        for idx in range.iter() {
            array.set(idx, amplitude * rng.sample());
        }
    }
}

// ── Profiles ────────────────────────────────────────────────────────

/// `exp(-((x - center) / width)^2)`.
pub fn gaussian(x: Scalar, center: Scalar, width: Scalar) -> Scalar {
    let s = (x - center) / width;
    (-s * s).exp()
}

// ── Inspection ──────────────────────────────────────────────────────

/// Interior values of `array` in linear order.
pub fn interior_values(array: &MultiArray, grid: &Grid) -> Vec<Scalar> {
    grid.interior_range().iter().map(|idx| array.get(idx)).collect()
}

/// Largest absolute interior value of `array`.
pub fn max_abs_interior(array: &MultiArray, grid: &Grid) -> Scalar {
    grid.interior_range()
        .iter()
        .map(|idx| array.get(idx).abs())
        .fold(0.0, Scalar::max)
}

// ── Mock particle ───────────────────────────────────────────────────

/// A particle carrying its cell, an identifier and a weight.
#[derive(Clone, Debug, PartialEq)]
pub struct TestParticle {
    pub cell: [i64; AXES],
    pub id: u32,
    pub weight: Scalar,
}

impl TestParticle {
    pub fn new(cell: [i64; AXES], id: u32) -> Self {
        Self {
            cell,
            id,
            weight: 1.0,
        }
    }
}

impl ParticleRecord for TestParticle {
    const WORDS: usize = AXES + 2;

    fn cell(&self) -> [i64; AXES] {
        self.cell
    }

    fn set_cell(&mut self, cell: [i64; AXES]) {
        self.cell = cell;
    }

    fn pack(&self, out: &mut Vec<Scalar>) {
        out.extend(self.cell.iter().map(|&c| c as Scalar));
        out.push(self.id as Scalar);
        out.push(self.weight);
    }

    fn unpack(words: &[Scalar]) -> Self {
        Self {
            cell: [words[0] as i64, words[1] as i64, words[2] as i64],
            id: words[3] as u32,
            weight: words[4],
        }
    }
}
