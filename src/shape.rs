//! Ellipsoidal shape masks over the voxel grid.

use crate::field::VoxelGrid;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Semi-axis of the ellipsoid along z as a fraction of the grid size.
pub const Z_SEMI_AXIS_FRACTION: f64 = 50.0 / 128.0;

/// Semi-axes of the shape ellipsoid along x and y, as fractions of half the
/// grid size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EllipsoidParameters {
    pub radius_x: f64,
    pub radius_y: f64,
}

/// Inclusion test for voxels inside an axis-aligned ellipsoid centered in the
/// voxel grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EllipsoidMask {
    center: f64,
    semi_axes: [f64; 3],
}

impl EllipsoidParameters {
    /// Checks that both radius fractions lie in `[0, 1]`.
    ///
    /// # Errors
    /// Returns an error naming the first radius out of range.
    pub fn validate(&self) -> Result<()> {
        for (name, radius) in [("x", self.radius_x), ("y", self.radius_y)] {
            if !(0.0..=1.0).contains(&radius) {
                bail!("Ellipsoid radius along {} must be in [0, 1], got {}", name, radius);
            }
        }
        Ok(())
    }
}

impl Default for EllipsoidParameters {
    fn default() -> Self {
        Self {
            radius_x: 1.0,
            radius_y: 0.3,
        }
    }
}

impl EllipsoidMask {
    /// Creates the mask for the given grid and ellipsoid parameters.
    pub fn new(grid: VoxelGrid, parameters: &EllipsoidParameters) -> Self {
        let center = grid.center();
        let semi_axes = [
            parameters.radius_x * center,
            parameters.radius_y * center,
            Z_SEMI_AXIS_FRACTION * grid.size() as f64,
        ];
        Self { center, semi_axes }
    }

    /// Returns the coordinate of the ellipsoid center along each axis.
    pub fn center(&self) -> f64 {
        self.center
    }

    /// Returns the semi-axes of the ellipsoid in voxels.
    pub fn semi_axes(&self) -> &[f64; 3] {
        &self.semi_axes
    }

    /// Whether any semi-axis is zero, in which case the mask is empty.
    pub fn is_degenerate(&self) -> bool {
        self.semi_axes.contains(&0.0)
    }

    /// Evaluates the quadratic form of the ellipsoid at the given voxel. The
    /// voxel is inside when the result does not exceed 1.
    pub fn evaluate(&self, x: usize, y: usize, z: usize) -> f64 {
        [x, y, z]
            .into_iter()
            .zip(self.semi_axes)
            .map(|(coord, semi_axis)| {
                let offset = coord as f64 - self.center;
                offset / semi_axis * offset / semi_axis
            })
            .sum()
    }

    /// Whether the given voxel lies inside the ellipsoid.
    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        !self.is_degenerate() && self.evaluate(x, y, z) <= 1.0
    }

    /// Computes the inclusion flag of every voxel in the given grid, in the
    /// grid's linear voxel order.
    pub fn compute_inclusion_mask(&self, grid: VoxelGrid) -> Vec<bool> {
        (0..grid.n_voxels())
            .map(|idx| {
                let [x, y, z] = grid.voxel_indices(idx);
                self.contains(x, y, z)
            })
            .collect()
    }
}
