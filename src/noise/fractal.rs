//! Fractal noise from summed octaves of lattice noise.

use super::{PermutationTable, lattice_noise};
use ::noise::NoiseFn;

/// Fractal noise with a fixed number of octaves and persistence, evaluated
/// with a given permutation table.
#[derive(Clone, Copy, Debug)]
pub struct FractalNoise<'a> {
    table: &'a PermutationTable,
    octaves: u32,
    persistence: f64,
}

impl<'a> FractalNoise<'a> {
    pub fn new(table: &'a PermutationTable, octaves: u32, persistence: f64) -> Self {
        Self {
            table,
            octaves,
            persistence,
        }
    }
}

impl NoiseFn<f64, 3> for FractalNoise<'_> {
    fn get(&self, point: [f64; 3]) -> f64 {
        fractal_noise(
            self.table,
            point[0],
            point[1],
            point[2],
            self.octaves,
            self.persistence,
        )
    }
}

/// Sums `octaves` evaluations of lattice noise, doubling the frequency and
/// multiplying the amplitude by `persistence` for each successive octave, and
/// divides by the summed amplitudes. The result is a weighted average of
/// lattice noise values, so it stays in the same range. Zero octaves give
/// zero.
pub fn fractal_noise(
    table: &PermutationTable,
    x: f64,
    y: f64,
    z: f64,
    octaves: u32,
    persistence: f64,
) -> f64 {
    if octaves == 0 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut frequency = 1.0;
    let mut amplitude = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        total += lattice_noise(table, x * frequency, y * frequency, z * frequency) * amplitude;
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= 2.0;
    }

    total / max_value
}
