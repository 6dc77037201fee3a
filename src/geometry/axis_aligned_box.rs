//! Representation of axis-aligned boxes.

use super::Ray;
use crate::num::Float;
use nalgebra::{Point3, Vector3};

/// A box with orientation aligned with the coordinate system axes. The width,
/// height and depth axes are aligned with the x-, y- and z-axis respectively.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisAlignedBox<F: Float> {
    corners: [Point3<F>; 2],
}

impl<F: Float> AxisAlignedBox<F> {
    /// Creates a new box with the given lower and upper corner points.
    pub fn new(lower_corner: Point3<F>, upper_corner: Point3<F>) -> Self {
        Self {
            corners: [lower_corner, upper_corner],
        }
    }

    /// Creates the cube spanning `[-half_extent, half_extent]` along each
    /// axis.
    pub fn centered_cube(half_extent: F) -> Self {
        let upper_corner = Point3::from(Vector3::repeat(half_extent));
        Self::new(-upper_corner, upper_corner)
    }

    /// Returns a reference to the lower corner of the box.
    pub fn lower_corner(&self) -> &Point3<F> {
        &self.corners[0]
    }

    /// Returns a reference to the upper corner of the box.
    pub fn upper_corner(&self) -> &Point3<F> {
        &self.corners[1]
    }

    /// Computes the distances along the given ray at which it enters and exits
    /// the box, using the slab method. The ray misses the box if the entry
    /// distance exceeds the exit distance. The entry distance is negative when
    /// the ray starts inside the box.
    ///
    /// Direction components of zero give infinite slab distances, which
    /// resolve to the correct finite result. A zero direction component with
    /// the ray origin exactly on a slab boundary gives a NaN slab distance,
    /// which is ignored by the min/max reduction, so a ray running exactly
    /// along a face of the box counts as a miss.
    pub fn compute_ray_entry_and_exit_distances(&self, ray: &Ray<F>) -> (F, F) {
        let mut entry_distance = -F::INFINITY;
        let mut exit_distance = F::INFINITY;

        for dim in 0..3 {
            let inverse_direction = F::ONE / ray.direction()[dim];

            let lower_distance = (self.lower_corner()[dim] - ray.origin()[dim]) * inverse_direction;
            let upper_distance = (self.upper_corner()[dim] - ray.origin()[dim]) * inverse_direction;

            entry_distance = entry_distance.max(lower_distance.min(upper_distance));
            exit_distance = exit_distance.min(lower_distance.max(upper_distance));
        }

        (entry_distance, exit_distance)
    }

    /// Computes the entry and exit distances of the given ray, or [`None`] if
    /// the ray misses the box.
    pub fn find_ray_intersection(&self, ray: &Ray<F>) -> Option<(F, F)> {
        let (entry_distance, exit_distance) = self.compute_ray_entry_and_exit_distances(ray);
        if entry_distance > exit_distance {
            None
        } else {
            Some((entry_distance, exit_distance))
        }
    }
}
