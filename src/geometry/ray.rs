//! Rays.

use crate::num::Float;
use nalgebra::{Point3, UnitVector3, Vector3};

/// A half-line starting at an origin point and extending along a unit
/// direction.
#[derive(Clone, Debug, PartialEq)]
pub struct Ray<F: Float> {
    origin: Point3<F>,
    direction: UnitVector3<F>,
}

impl<F: Float> Ray<F> {
    /// Creates a new ray with the given origin and direction. The direction
    /// is normalized, so it need not have unit length.
    ///
    /// # Panics
    /// If the direction is the zero vector.
    pub fn new(origin: Point3<F>, direction: Vector3<F>) -> Self {
        assert!(
            direction != Vector3::zeros(),
            "Tried to create ray with zero direction"
        );
        Self::new_with_unit_direction(origin, UnitVector3::new_normalize(direction))
    }

    /// Creates a new ray with the given origin and unit direction.
    pub fn new_with_unit_direction(origin: Point3<F>, direction: UnitVector3<F>) -> Self {
        Self { origin, direction }
    }

    /// Returns the origin of the ray.
    pub fn origin(&self) -> &Point3<F> {
        &self.origin
    }

    /// Returns the unit direction of the ray.
    pub fn direction(&self) -> &UnitVector3<F> {
        &self.direction
    }

    /// Returns the point at the given distance along the ray.
    pub fn point_at_distance(&self, distance: F) -> Point3<F> {
        self.origin + self.direction.into_inner() * distance
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::{point, vector};

    #[test]
    fn ray_direction_is_normalized() {
        let ray = Ray::new(point![0.0, 0.0, 0.0], vector![0.0, 3.0, 4.0]);
        assert_abs_diff_eq!(ray.direction().norm(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ray.direction().z, 0.8, epsilon = 1e-6);
    }

    #[test]
    fn point_at_distance_moves_along_direction() {
        let ray = Ray::new(point![1.0, 0.0, -5.0], vector![0.0, 0.0, 2.0]);
        assert_eq!(ray.point_at_distance(4.0), point![1.0, 0.0, -1.0]);
    }

    #[test]
    #[should_panic]
    fn creating_ray_with_zero_direction_fails() {
        Ray::new(point![0.0, 0.0, 0.0], Vector3::<f32>::zeros());
    }
}
