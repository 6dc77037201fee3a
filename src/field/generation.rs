//! Generation of density fields from masked fractal noise.

use super::{DensityField, VoxelGrid};
use crate::{
    noise::{NoiseParameters, PermutationTable},
    shape::{EllipsoidMask, EllipsoidParameters},
};
use ::noise::NoiseFn;
use anyhow::{Result, bail};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of voxels along each axis of the grid by default.
pub const DEFAULT_GRID_SIZE: usize = 128;

/// Largest supported number of voxels along each axis. Densities lie in
/// `[0, N]`, so larger grids would not fit in a byte.
pub const MAX_GRID_SIZE: usize = 255;

/// Factor by which the noise pattern is stretched along x and z relative to
/// y.
pub const NOISE_STRETCH_XZ: f64 = 1.5;

/// Everything determining the content of a generated density field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldParameters {
    pub grid_size: usize,
    pub noise: NoiseParameters,
    pub ellipsoid: EllipsoidParameters,
}

/// Builder of density fields where each voxel inside an ellipsoid gets a
/// density from a noise function, attenuated with distance from the grid
/// center. Voxels outside the ellipsoid are empty.
#[derive(Clone, Debug)]
pub struct DensityFieldBuilder<N> {
    grid: VoxelGrid,
    noise: N,
    noise_scale: f64,
    mask: EllipsoidMask,
}

impl FieldParameters {
    /// Checks that all parameters are in their supported ranges.
    ///
    /// # Errors
    /// Returns an error describing the first invalid parameter.
    pub fn validate(&self) -> Result<()> {
        if self.grid_size < 2 {
            bail!("Grid size must be at least 2, got {}", self.grid_size);
        }
        if self.grid_size > MAX_GRID_SIZE {
            bail!(
                "Grid size must be at most {}, got {}",
                MAX_GRID_SIZE,
                self.grid_size
            );
        }
        self.noise.validate()?;
        self.ellipsoid.validate()
    }

    /// Returns the voxel grid of the field.
    ///
    /// # Panics
    /// If the grid size is zero.
    pub fn grid(&self) -> VoxelGrid {
        VoxelGrid::new(self.grid_size)
    }
}

impl Default for FieldParameters {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            noise: NoiseParameters::default(),
            ellipsoid: EllipsoidParameters::default(),
        }
    }
}

impl<N> DensityFieldBuilder<N>
where
    N: NoiseFn<f64, 3> + Sync,
{
    /// Creates a builder for the given grid, evaluating the given noise
    /// function at voxel coordinates multiplied by `noise_scale` and keeping
    /// only voxels inside the given mask.
    pub fn new(grid: VoxelGrid, noise: N, noise_scale: f64, mask: EllipsoidMask) -> Self {
        Self {
            grid,
            noise,
            noise_scale,
            mask,
        }
    }

    /// Returns the grid the built field will be defined on.
    pub fn grid(&self) -> VoxelGrid {
        self.grid
    }

    /// Computes the density of the voxel with the given indices.
    pub fn density_at(&self, x: usize, y: usize, z: usize) -> u8 {
        if !self.mask.contains(x, y, z) {
            return 0;
        }

        let size = self.grid.size() as f64;
        let half_size = self.grid.center();

        let offset_x = x as f64 - half_size;
        let offset_y = y as f64 - half_size;
        let offset_z = z as f64 - half_size;
        let distance_from_center =
            (offset_x * offset_x + offset_y * offset_y + offset_z * offset_z).sqrt();
        let falloff = 1.0 - distance_from_center / size;

        let noise = self.noise.get([
            x as f64 * self.noise_scale / NOISE_STRETCH_XZ,
            y as f64 * self.noise_scale,
            z as f64 * self.noise_scale / NOISE_STRETCH_XZ,
        ]);

        let density = (half_size + half_size * noise) * falloff * falloff;

        density.round().clamp(0.0, 255.0) as u8
    }

    /// Builds the density field, filling z-slices of the grid in parallel.
    pub fn build(&self) -> DensityField {
        let mut values = vec![0; self.grid.n_voxels()];
        let size = self.grid.size();

        values
            .par_chunks_mut(self.grid.n_voxels_per_slice())
            .enumerate()
            .for_each(|(z, slice)| {
                for (idx, value) in slice.iter_mut().enumerate() {
                    *value = self.density_at(idx % size, idx / size, z);
                }
            });

        DensityField {
            grid: self.grid,
            values,
            parameters: None,
        }
    }
}

/// Generates the density field for the given parameters from fractal noise
/// over the permutation table selected by the noise seed.
///
/// # Errors
/// Returns an error if the parameters are invalid.
pub fn generate_density_field(parameters: &FieldParameters) -> Result<DensityField> {
    parameters.validate()?;

    let grid = parameters.grid();
    let table = PermutationTable::for_seed(parameters.noise.seed);
    let noise = parameters.noise.fractal_noise(&table);
    let mask = EllipsoidMask::new(grid, &parameters.ellipsoid);

    let builder = DensityFieldBuilder::new(grid, noise, parameters.noise.scale, mask);

    let field = with_timing_info_logging!(
        "Generating density field with {} voxels along each axis", grid.size(); {
        builder.build()
    });

    Ok(field.with_parameters(parameters.clone()))
}
