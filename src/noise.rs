//! Coherent gradient noise over 3D space.

mod fractal;
mod lattice;

pub use fractal::{FractalNoise, fractal_noise};
pub use lattice::{LatticeNoise, lattice_noise};

use anyhow::{Result, bail};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::LazyLock};

/// Number of distinct lattice hashes. Lattice coordinates wrap with this
/// period.
pub const PERMUTATION_SIZE: usize = 256;

/// The largest supported number of noise octaves.
pub const MAX_OCTAVES: u32 = 10;

/// The largest supported spatial noise scale.
pub const MAX_NOISE_SCALE: f64 = 0.5;

/// Table of pseudo-random lattice hashes: a permutation of `0..=255`
/// followed by a copy of itself, so that nested lookups offset by a lattice
/// coordinate never need wrapping.
#[derive(Clone, PartialEq, Eq)]
pub struct PermutationTable {
    entries: [u8; 2 * PERMUTATION_SIZE],
}

/// Parameters for fractal noise and its mapping onto the voxel grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParameters {
    /// Multiplier from voxel coordinates to noise coordinates.
    pub scale: f64,
    /// Number of summed octaves.
    pub octaves: u32,
    /// Amplitude factor between successive octaves.
    pub persistence: f64,
    /// Seed for shuffling the permutation table. The reference table is used
    /// when this is `None`.
    pub seed: Option<u64>,
}

#[rustfmt::skip]
const REFERENCE_PERMUTATION: [u8; PERMUTATION_SIZE] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225,
    140, 36, 103, 30, 69, 142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148,
    247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219, 203, 117, 35, 11, 32,
    57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122,
    60, 211, 133, 230, 220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54,
    65, 25, 63, 161, 1, 216, 80, 73, 209, 76, 132, 187, 208, 89, 18, 169,
    200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173, 186, 3, 64,
    52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212,
    207, 206, 59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213,
    119, 248, 152, 2, 44, 154, 163, 70, 221, 153, 101, 155, 167, 43, 172, 9,
    129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232, 178, 185, 112, 104,
    218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162, 241,
    81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157,
    184, 84, 204, 176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93,
    222, 114, 67, 29, 24, 72, 243, 141, 128, 195, 78, 66, 215, 61, 156, 180,
];

static REFERENCE_PERMUTATION_TABLE: LazyLock<PermutationTable> =
    LazyLock::new(|| PermutationTable::from_valid_permutation(&REFERENCE_PERMUTATION));

impl PermutationTable {
    /// Returns the table built from Ken Perlin's reference permutation.
    pub fn reference() -> &'static Self {
        &REFERENCE_PERMUTATION_TABLE
    }

    /// Creates a table from the given permutation of `0..=255`.
    ///
    /// # Errors
    /// Returns an error if any value occurs more than once.
    pub fn from_permutation(permutation: &[u8; PERMUTATION_SIZE]) -> Result<Self> {
        let mut seen = [false; PERMUTATION_SIZE];
        for &value in permutation {
            let seen_value = &mut seen[usize::from(value)];
            if *seen_value {
                bail!("Value {} occurs more than once in permutation", value);
            }
            *seen_value = true;
        }
        Ok(Self::from_valid_permutation(permutation))
    }

    /// Creates a table from a permutation of `0..=255` shuffled by a random
    /// number generator with the given seed.
    pub fn shuffled(seed: u64) -> Self {
        let mut permutation: [u8; PERMUTATION_SIZE] =
            std::array::from_fn(|idx| u8::try_from(idx).unwrap_or(u8::MAX));
        permutation.shuffle(&mut StdRng::seed_from_u64(seed));
        Self::from_valid_permutation(&permutation)
    }

    /// Creates the shuffled table for the given seed, or the reference table
    /// if there is no seed.
    pub fn for_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::shuffled(seed),
            None => Self::reference().clone(),
        }
    }

    /// Returns all 512 entries of the table.
    pub fn entries(&self) -> &[u8; 2 * PERMUTATION_SIZE] {
        &self.entries
    }

    /// Returns the entry at the given index.
    ///
    /// # Panics
    /// If the index is not below 512.
    #[inline]
    pub fn hash(&self, idx: usize) -> usize {
        usize::from(self.entries[idx])
    }

    fn from_valid_permutation(permutation: &[u8; PERMUTATION_SIZE]) -> Self {
        let entries = std::array::from_fn(|idx| permutation[idx % PERMUTATION_SIZE]);
        Self { entries }
    }
}

impl fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermutationTable")
            .field("head", &&self.entries[..8])
            .finish_non_exhaustive()
    }
}

impl NoiseParameters {
    /// Checks that the parameters are in their supported ranges.
    ///
    /// # Errors
    /// Returns an error naming the first parameter out of range.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=MAX_NOISE_SCALE).contains(&self.scale) {
            bail!(
                "Noise scale must be in [0, {}], got {}",
                MAX_NOISE_SCALE,
                self.scale
            );
        }
        if self.octaves == 0 {
            bail!("Number of noise octaves must be at least 1");
        }
        if self.octaves > MAX_OCTAVES {
            bail!(
                "Number of noise octaves must be at most {}, got {}",
                MAX_OCTAVES,
                self.octaves
            );
        }
        if !(0.0..1.0).contains(&self.persistence) {
            bail!(
                "Noise persistence must be in [0, 1), got {}",
                self.persistence
            );
        }
        Ok(())
    }

    /// Returns the fractal noise function for these parameters using the
    /// given permutation table.
    pub fn fractal_noise<'a>(&self, table: &'a PermutationTable) -> FractalNoise<'a> {
        FractalNoise::new(table, self.octaves, self.persistence)
    }
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            scale: 0.5,
            octaves: 3,
            persistence: 0.5,
            seed: None,
        }
    }
}
