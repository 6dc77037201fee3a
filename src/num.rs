//! Numbers and numerics.

use nalgebra as na;
use num_traits as nt;

/// Gathers traits useful for working with generic floating point types.
pub trait Float: Copy + nt::FloatConst + nt::FromPrimitive + na::RealField + na::Scalar {
    const ONE: Self;
    const INFINITY: Self;
}

macro_rules! impl_float {
    ($f:ty) => {
        impl Float for $f {
            const ONE: Self = 1.0;
            const INFINITY: Self = <$f>::INFINITY;
        }
    };
}

impl_float!(f32);
impl_float!(f64);

/// Hermite interpolation between 0 and 1 as `x` goes from `edge0` to `edge1`,
/// with the same definition as the GLSL `smoothstep` function.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Returns the fractional part of `x` with the same definition as the GLSL
/// `fract` function (`x - floor(x)`, so the result is non-negative).
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}
