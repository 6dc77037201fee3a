//! Representations of angles.

use crate::num::Float;
use nalgebra as na;

/// Represents an angle.
pub trait Angle<F>: Copy {
    /// Returns the angle as radians.
    fn as_radians(self) -> Radians<F>;

    /// Returns the value of the angle in radians.
    fn radians(self) -> F;
}

// An angle in degrees.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Degrees<F>(pub F);

// An angle in radians.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Radians<F>(pub F);

impl<F: Float> Angle<F> for Degrees<F> {
    fn as_radians(self) -> Radians<F> {
        Radians::from(self)
    }

    fn radians(self) -> F {
        Radians::from(self).0
    }
}

impl<F: Float> Angle<F> for Radians<F> {
    fn as_radians(self) -> Radians<F> {
        self
    }

    fn radians(self) -> F {
        self.0
    }
}

impl<F: Float> From<Radians<F>> for Degrees<F> {
    fn from(rad: Radians<F>) -> Self {
        Self(rad.0 * na::convert::<f64, F>(180.0) * F::FRAC_1_PI())
    }
}

impl<F: Float> From<Degrees<F>> for Radians<F> {
    fn from(deg: Degrees<F>) -> Self {
        Self(deg.0 * F::PI() / na::convert::<f64, F>(180.0))
    }
}
