//! Geometrical objects.

mod angle;
mod axis_aligned_box;
mod ray;

pub use angle::{Angle, Degrees, Radians};
pub use axis_aligned_box::AxisAlignedBox;
pub use ray::Ray;
