//! Scalar density fields on cubic voxel grids.

mod export;
mod generation;

pub use export::{FieldMetadata, save_density_field};
pub use generation::{
    DEFAULT_GRID_SIZE, DensityFieldBuilder, FieldParameters, MAX_GRID_SIZE, NOISE_STRETCH_XZ,
    generate_density_field,
};

use anyhow::{Result, bail};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A cubic grid of voxels with the same number of voxels along each axis.
///
/// Voxels are stored in linear order with x varying fastest, then y, then z,
/// matching the layout of a single-channel 3D texture whose width runs along
/// x.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoxelGrid {
    size: usize,
}

/// Filtering used when sampling a density field at continuous coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldSampling {
    /// Value of the voxel containing the sample point.
    #[default]
    Nearest,
    /// Trilinear interpolation between the eight voxel centers surrounding
    /// the sample point.
    Trilinear,
}

/// A density value in `[0, 255]` for every voxel of a cubic grid.
#[derive(Clone, Debug, PartialEq)]
pub struct DensityField {
    grid: VoxelGrid,
    values: Vec<u8>,
    parameters: Option<FieldParameters>,
}

impl VoxelGrid {
    /// Creates a grid with the given number of voxels along each axis.
    ///
    /// # Panics
    /// If the size is zero.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "Tried to create empty voxel grid");
        Self { size }
    }

    /// Returns the number of voxels along each axis.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the total number of voxels in the grid.
    pub fn n_voxels(&self) -> usize {
        self.size.pow(3)
    }

    /// Returns the number of voxels in one z-slice of the grid.
    pub fn n_voxels_per_slice(&self) -> usize {
        self.size.pow(2)
    }

    /// Returns the coordinate of the grid center along each axis, in voxel
    /// units.
    pub fn center(&self) -> f64 {
        self.size as f64 / 2.0
    }

    /// Computes the linear storage index of the voxel with the given indices.
    #[inline]
    pub fn linear_idx(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.size + y) * self.size + x
    }

    /// Computes the x-, y- and z-index of the voxel at the given linear
    /// storage index.
    #[inline]
    pub fn voxel_indices(&self, idx: usize) -> [usize; 3] {
        let x = idx % self.size;
        let y = (idx / self.size) % self.size;
        let z = idx / (self.size * self.size);
        [x, y, z]
    }
}

impl DensityField {
    /// Wraps the given values, stored in the linear order of a grid with the
    /// given size.
    ///
    /// # Errors
    /// Returns an error if the size is zero or the number of values does not
    /// match the grid.
    pub fn from_values(size: usize, values: Vec<u8>) -> Result<Self> {
        if size == 0 {
            bail!("Density field must have at least one voxel along each axis");
        }
        let grid = VoxelGrid::new(size);
        if values.len() != grid.n_voxels() {
            bail!(
                "Density field of size {} needs {} values, got {}",
                size,
                grid.n_voxels(),
                values.len()
            );
        }
        Ok(Self {
            grid,
            values,
            parameters: None,
        })
    }

    /// Creates a field where every voxel has the given value.
    ///
    /// # Panics
    /// If the size is zero.
    pub fn uniform(size: usize, value: u8) -> Self {
        let grid = VoxelGrid::new(size);
        Self {
            grid,
            values: vec![value; grid.n_voxels()],
            parameters: None,
        }
    }

    pub(crate) fn with_parameters(mut self, parameters: FieldParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Returns the grid the field is defined on.
    pub fn grid(&self) -> VoxelGrid {
        self.grid
    }

    /// Returns the parameters the field was generated from, or [`None`] if
    /// the values were supplied directly.
    pub fn parameters(&self) -> Option<&FieldParameters> {
        self.parameters.as_ref()
    }

    /// Returns the raw density values in linear storage order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.values
    }

    /// Returns the density of the voxel with the given indices.
    ///
    /// # Panics
    /// If any index is outside the grid.
    pub fn value(&self, x: usize, y: usize, z: usize) -> u8 {
        let size = self.grid.size();
        assert!(
            x < size && y < size && z < size,
            "Voxel indices ({x}, {y}, {z}) outside grid of size {size}"
        );
        self.values[self.grid.linear_idx(x, y, z)]
    }

    /// Returns the density of the voxel with the given indices mapped to
    /// `[0, 1]`.
    pub fn normalized_value(&self, x: usize, y: usize, z: usize) -> f32 {
        normalize(self.value(x, y, z))
    }

    /// Samples the normalized density at the given texture space point,
    /// where `[0, 1]` along each axis spans the whole grid. Points outside
    /// the grid are clamped to the nearest edge voxel.
    pub fn sample(&self, texture_coords: &Point3<f32>, sampling: FieldSampling) -> f32 {
        match sampling {
            FieldSampling::Nearest => self.sample_nearest(texture_coords),
            FieldSampling::Trilinear => self.sample_trilinear(texture_coords),
        }
    }

    fn sample_nearest(&self, texture_coords: &Point3<f32>) -> f32 {
        let size = self.grid.size() as f32;
        let [x, y, z] =
            [0, 1, 2].map(|dim| self.clamp_voxel_idx((texture_coords[dim] * size).floor()));
        normalize(self.values[self.grid.linear_idx(x, y, z)])
    }

    fn sample_trilinear(&self, texture_coords: &Point3<f32>) -> f32 {
        let size = self.grid.size() as f32;

        let mut lower = [0; 3];
        let mut upper = [0; 3];
        let mut weights = [0.0; 3];

        for dim in 0..3 {
            let voxel_coord = texture_coords[dim] * size - 0.5;
            let floored = voxel_coord.floor();
            lower[dim] = self.clamp_voxel_idx(floored);
            upper[dim] = self.clamp_voxel_idx(floored + 1.0);
            weights[dim] = voxel_coord - floored;
        }

        let lerp = |t: f32, a: f32, b: f32| a + t * (b - a);
        let corner = |x: usize, y: usize, z: usize| {
            normalize(self.values[self.grid.linear_idx(x, y, z)])
        };

        let interpolate_x = |y: usize, z: usize| {
            lerp(weights[0], corner(lower[0], y, z), corner(upper[0], y, z))
        };
        let interpolate_xy = |z: usize| {
            lerp(
                weights[1],
                interpolate_x(lower[1], z),
                interpolate_x(upper[1], z),
            )
        };

        lerp(weights[2], interpolate_xy(lower[2]), interpolate_xy(upper[2]))
    }

    fn clamp_voxel_idx(&self, voxel_coord: f32) -> usize {
        // NaN maps to zero
        voxel_coord.clamp(0.0, (self.grid.size() - 1) as f32) as usize
    }
}

fn normalize(value: u8) -> f32 {
    f32::from(value) / 255.0
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::point;

    fn ramp_field(size: usize) -> DensityField {
        let grid = VoxelGrid::new(size);
        let values = (0..grid.n_voxels())
            .map(|idx| {
                let [x, _, _] = grid.voxel_indices(idx);
                u8::try_from(x * 255 / (size - 1)).unwrap()
            })
            .collect();
        DensityField::from_values(size, values).unwrap()
    }

    #[test]
    fn linear_index_has_x_varying_fastest() {
        let grid = VoxelGrid::new(4);
        assert_eq!(grid.linear_idx(1, 0, 0), 1);
        assert_eq!(grid.linear_idx(0, 1, 0), 4);
        assert_eq!(grid.linear_idx(0, 0, 1), 16);
        assert_eq!(grid.linear_idx(3, 2, 1), 16 + 8 + 3);
    }

    #[test]
    fn voxel_indices_invert_linear_index() {
        let grid = VoxelGrid::new(5);
        for idx in 0..grid.n_voxels() {
            let [x, y, z] = grid.voxel_indices(idx);
            assert_eq!(grid.linear_idx(x, y, z), idx);
        }
    }

    #[test]
    fn creating_field_with_wrong_number_of_values_fails() {
        assert!(DensityField::from_values(4, vec![0; 63]).is_err());
        assert!(DensityField::from_values(0, Vec::new()).is_err());
        assert!(DensityField::from_values(4, vec![0; 64]).is_ok());
    }

    #[test]
    fn normalized_value_maps_bytes_to_unit_interval() {
        let field = DensityField::uniform(2, 255);
        assert_eq!(field.normalized_value(1, 1, 1), 1.0);
        let field = DensityField::uniform(2, 0);
        assert_eq!(field.normalized_value(0, 1, 0), 0.0);
    }

    #[test]
    fn nearest_sampling_picks_containing_voxel() {
        let field = ramp_field(4);
        assert_eq!(
            field.sample(&point![0.1, 0.5, 0.5], FieldSampling::Nearest),
            0.0
        );
        assert_abs_diff_eq!(
            field.sample(&point![0.3, 0.5, 0.5], FieldSampling::Nearest),
            85.0 / 255.0
        );
        assert_eq!(
            field.sample(&point![0.99, 0.5, 0.5], FieldSampling::Nearest),
            1.0
        );
    }

    #[test]
    fn sampling_outside_grid_clamps_to_edge() {
        let field = ramp_field(4);
        for sampling in [FieldSampling::Nearest, FieldSampling::Trilinear] {
            assert_eq!(field.sample(&point![-0.5, 0.5, 0.5], sampling), 0.0);
            assert_eq!(field.sample(&point![1.5, 2.0, -1.0], sampling), 1.0);
        }
    }

    #[test]
    fn trilinear_sampling_interpolates_between_voxel_centers() {
        let field = ramp_field(4);
        // Halfway between the centers of voxels 1 and 2 along x
        let value = field.sample(&point![0.5, 0.5, 0.5], FieldSampling::Trilinear);
        assert_abs_diff_eq!(value, (85.0 + 170.0) / (2.0 * 255.0), epsilon = 1e-6);

        // Exactly at the center of voxel 1
        let value = field.sample(&point![0.375, 0.1, 0.9], FieldSampling::Trilinear);
        assert_abs_diff_eq!(value, 85.0 / 255.0, epsilon = 1e-6);
    }

    #[test]
    fn sampling_uniform_field_gives_uniform_value() {
        let field = DensityField::uniform(3, 51);
        for sampling in [FieldSampling::Nearest, FieldSampling::Trilinear] {
            assert_abs_diff_eq!(
                field.sample(&point![0.42, 0.17, 0.83], sampling),
                0.2,
                epsilon = 1e-6
            );
        }
    }

    #[test]
    #[should_panic]
    fn reading_value_outside_grid_panics() {
        DensityField::uniform(2, 0).value(2, 0, 0);
    }
}
