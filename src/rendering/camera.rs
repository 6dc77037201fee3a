//! Camera and object placement for rendering frames.

use crate::geometry::{Angle, Degrees, Radians, Ray};
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};

/// Default vertical field of view of [`Camera`], in degrees.
pub const DEFAULT_VERTICAL_FIELD_OF_VIEW: f32 = 100.0;

/// Time in milliseconds for a spinning object to rotate one radian about
/// each axis.
const SPIN_PERIODS_MS: [f64; 3] = [40_000.0, 20_000.0, 100_000.0];

/// Perspective camera looking from a position towards a target point.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    position: Point3<f32>,
    vertical_field_of_view: Radians<f32>,
    camera_to_world_transform: Isometry3<f32>,
}

/// Placement of the rendered object in the world.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectPose {
    position: Vector3<f32>,
    rotation: UnitQuaternion<f32>,
}

impl Camera {
    /// Creates a camera at `position` looking towards `target`, with `up`
    /// defining the upward direction of the image.
    ///
    /// # Panics
    /// - If the field of view is not between 0 and 180 degrees.
    /// - If the position equals the target or the view direction is parallel
    ///   to `up`.
    pub fn new<A: Angle<f32>>(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        vertical_field_of_view: A,
    ) -> Self {
        let vertical_field_of_view = vertical_field_of_view.as_radians();
        assert!(
            vertical_field_of_view.0 > 0.0 && vertical_field_of_view.0 < std::f32::consts::PI,
            "Vertical field of view must be between 0 and 180 degrees"
        );

        let view_direction = target - position;
        assert!(
            view_direction.cross(&up).norm_squared() > 0.0,
            "Camera view direction must be non-zero and not parallel to up direction"
        );

        let camera_to_world_transform = Isometry3::look_at_rh(&position, &target, &up).inverse();

        Self {
            position,
            vertical_field_of_view,
            camera_to_world_transform,
        }
    }

    pub fn position(&self) -> &Point3<f32> {
        &self.position
    }

    pub fn vertical_field_of_view(&self) -> Radians<f32> {
        self.vertical_field_of_view
    }

    /// Computes the world space ray from the camera through the given point
    /// on an image with the given dimensions. Image coordinates have their
    /// origin in the upper left corner, with pixel centers at half-integer
    /// coordinates.
    pub fn primary_ray(&self, width: u32, height: u32, image_coords: [f32; 2]) -> Ray<f32> {
        let width = width as f32;
        let height = height as f32;

        let half_view_height = (0.5 * self.vertical_field_of_view.0).tan();
        let aspect_ratio = width / height;

        let direction_in_camera_space = Vector3::new(
            (2.0 * image_coords[0] / width - 1.0) * aspect_ratio * half_view_height,
            (1.0 - 2.0 * image_coords[1] / height) * half_view_height,
            -1.0,
        );

        Ray::new(
            self.position,
            self.camera_to_world_transform
                .transform_vector(&direction_in_camera_space),
        )
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Point3::new(0.0, 0.0, 1.0),
            Point3::origin(),
            Vector3::y(),
            Degrees(DEFAULT_VERTICAL_FIELD_OF_VIEW),
        )
    }
}

impl ObjectPose {
    pub fn new(position: Vector3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self { position, rotation }
    }

    /// Creates an unrotated pose at the world origin.
    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity())
    }

    /// Creates a pose at the given position, rotated as an object that has
    /// been spinning steadily about all three axes for the given number of
    /// milliseconds.
    pub fn spinning(position: Vector3<f32>, time_ms: f64) -> Self {
        let [angle_x, angle_y, angle_z] = SPIN_PERIODS_MS.map(|period| (time_ms / period) as f32);
        Self::new(position, euler_xyz_rotation(angle_x, angle_y, angle_z))
    }

    pub fn position(&self) -> &Vector3<f32> {
        &self.position
    }

    pub fn rotation(&self) -> &UnitQuaternion<f32> {
        &self.rotation
    }

    /// Returns the transform from object space to world space.
    pub fn model_transform(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.position), self.rotation)
    }

    /// Transforms the given world space ray into the object space of the
    /// pose.
    pub fn transform_ray_to_object_space(&self, ray: &Ray<f32>) -> Ray<f32> {
        let world_to_object_transform = self.model_transform().inverse();
        Ray::new_with_unit_direction(
            world_to_object_transform.transform_point(ray.origin()),
            world_to_object_transform.rotation * *ray.direction(),
        )
    }
}

impl Default for ObjectPose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Creates the rotation given by Euler angles applied in XYZ order, meaning
/// the rotation matrix is `R_x * R_y * R_z`.
pub fn euler_xyz_rotation(angle_x: f32, angle_y: f32, angle_z: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angle_x)
        * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angle_y)
        * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle_z)
}
