//! Raymarching with front-to-back compositing through density fields.

use crate::{
    field::{DensityField, FieldSampling},
    geometry::{AxisAlignedBox, Ray},
    num::{fract, smoothstep},
};
use anyhow::{Result, bail};
use nalgebra::{Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STEPS: u32 = 100;
pub const DEFAULT_OPACITY: f32 = 0.25;
pub const DEFAULT_BASE_COLOR: u32 = 0x4f4464;

/// Accumulated opacity above which marching stops.
pub const ALPHA_CUTOFF: f32 = 0.95;

/// Normalized densities between which the sample opacity ramps from zero to
/// full.
pub const DENSITY_THRESHOLDS: (f32, f32) = (0.15, 0.65);

/// Largest supported number of raymarching steps. Shorter steps would no
/// longer advance the distance along rays starting a few units away.
pub const MAX_STEPS: u32 = 10_000;

/// Half extent of the cube bounding the marched volume in object space.
pub const BOUNDING_BOX_HALF_EXTENT: f32 = 1.0;

/// Configuration options for raymarching.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaymarchingConfig {
    /// Number of steps needed to traverse the bounding box along its
    /// shortest path for the ray direction.
    pub steps: u32,
    /// Multiplier for the opacity of each sample.
    pub opacity: f32,
    /// Color the accumulated color starts from, as `0xRRGGBB`.
    pub base_color: u32,
    pub sampling: FieldSampling,
    /// Whether to offset the start of each ray by a pseudo-random fraction of
    /// a voxel to break up stepping artifacts.
    pub jitter: bool,
}

/// Computes the brightness factor for a sample along a ray.
pub trait SampleShading: Send + Sync {
    /// Returns the factor the sample opacity is multiplied with before being
    /// added to the accumulated color. `texture_coords` is the sample point
    /// in the texture space of the field and `position` the same point in
    /// object space.
    fn shade(
        &self,
        field: &DensityField,
        sampling: FieldSampling,
        texture_coords: &Point3<f32>,
        position: &Point3<f32>,
    ) -> f32;
}

/// Shading from the density difference across a small diagonal offset,
/// brightened linearly with the object space x- and y-coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientShading {
    pub offset: f32,
    pub gradient_weight: f32,
    pub position_weight: f32,
    pub ambient: f32,
}

/// Marches rays through a density field inside the cube `[-1, 1]^3` and
/// composites the samples front to back.
#[derive(Clone, Debug)]
pub struct VolumeRaymarcher<S = GradientShading> {
    steps: u32,
    opacity: f32,
    base_color: Vector3<f32>,
    sampling: FieldSampling,
    jitter: bool,
    shading: S,
    bounding_box: AxisAlignedBox<f32>,
}

/// State after taking one sample along a ray.
#[derive(Clone, Debug, PartialEq)]
pub struct MarchStep {
    pub distance: f32,
    pub position: Point3<f32>,
    pub density: f32,
    pub sample_opacity: f32,
    pub shade: f32,
    pub color: Vector4<f32>,
}

/// Result of marching a single ray.
#[derive(Clone, Debug, PartialEq)]
pub struct RayMarchOutcome {
    /// Accumulated color and opacity.
    pub color: Vector4<f32>,
    pub n_samples: u32,
    /// Whether marching stopped because the accumulated opacity exceeded
    /// [`ALPHA_CUTOFF`].
    pub terminated_early: bool,
    /// Whether the ray intersected the bounding box.
    pub hit: bool,
}

impl RaymarchingConfig {
    /// Checks that the options are in their supported ranges.
    ///
    /// # Errors
    /// Returns an error naming the first invalid option.
    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            bail!("Number of raymarching steps must be at least 1");
        }
        if self.steps > MAX_STEPS {
            bail!(
                "Number of raymarching steps must be at most {}, got {}",
                MAX_STEPS,
                self.steps
            );
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            bail!("Opacity must be in [0, 1], got {}", self.opacity);
        }
        if self.base_color > 0xFF_FFFF {
            bail!(
                "Base color must be a 24-bit RGB value, got {:#x}",
                self.base_color
            );
        }
        Ok(())
    }

    /// Returns the base color with each channel in `[0, 1]`.
    pub fn base_color_rgb(&self) -> Vector3<f32> {
        rgb_from_hex(self.base_color)
    }
}

impl Default for RaymarchingConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            opacity: DEFAULT_OPACITY,
            base_color: DEFAULT_BASE_COLOR,
            sampling: FieldSampling::default(),
            jitter: true,
        }
    }
}

impl Default for GradientShading {
    fn default() -> Self {
        Self {
            offset: 0.02,
            gradient_weight: 2.0,
            position_weight: 0.25,
            ambient: 0.2,
        }
    }
}

impl SampleShading for GradientShading {
    fn shade(
        &self,
        field: &DensityField,
        sampling: FieldSampling,
        texture_coords: &Point3<f32>,
        position: &Point3<f32>,
    ) -> f32 {
        let offset = Vector3::repeat(self.offset);
        let gradient = field.sample(&(texture_coords - offset), sampling)
            - field.sample(&(texture_coords + offset), sampling);

        gradient * self.gradient_weight
            + (position.x + position.y) * self.position_weight
            + self.ambient
    }
}

impl VolumeRaymarcher {
    /// Creates a raymarcher with gradient shading from the given
    /// configuration.
    pub fn new(config: &RaymarchingConfig) -> Self {
        Self {
            steps: config.steps.max(1),
            opacity: config.opacity,
            base_color: config.base_color_rgb(),
            sampling: config.sampling,
            jitter: config.jitter,
            shading: GradientShading::default(),
            bounding_box: AxisAlignedBox::centered_cube(BOUNDING_BOX_HALF_EXTENT),
        }
    }
}

impl<S: SampleShading> VolumeRaymarcher<S> {
    /// Replaces the shading of the raymarcher.
    pub fn with_shading<T: SampleShading>(self, shading: T) -> VolumeRaymarcher<T> {
        VolumeRaymarcher {
            steps: self.steps,
            opacity: self.opacity,
            base_color: self.base_color,
            sampling: self.sampling,
            jitter: self.jitter,
            shading,
            bounding_box: self.bounding_box,
        }
    }

    pub fn base_color(&self) -> &Vector3<f32> {
        &self.base_color
    }

    pub fn bounding_box(&self) -> &AxisAlignedBox<f32> {
        &self.bounding_box
    }

    pub fn shading(&self) -> &S {
        &self.shading
    }

    /// Marches the given object space ray through the field and returns the
    /// composited color. `pixel_coords` seeds the jitter of the start
    /// position.
    pub fn march(
        &self,
        field: &DensityField,
        ray: &Ray<f32>,
        pixel_coords: [f32; 2],
    ) -> RayMarchOutcome {
        self.march_with_observer(field, ray, pixel_coords, |_| {})
    }

    /// Like [`Self::march`], but calls the given closure with the state after
    /// each sample.
    pub fn march_with_observer(
        &self,
        field: &DensityField,
        ray: &Ray<f32>,
        pixel_coords: [f32; 2],
        mut observer: impl FnMut(&MarchStep),
    ) -> RayMarchOutcome {
        let mut color = Vector4::new(self.base_color.x, self.base_color.y, self.base_color.z, 0.0);

        let Some((near, far)) = self.bounding_box.find_ray_intersection(ray) else {
            return RayMarchOutcome {
                color,
                n_samples: 0,
                terminated_early: false,
                hit: false,
            };
        };

        let direction = ray.direction().into_inner();
        let delta = compute_step_length(&direction, self.steps);

        let mut position = ray.point_at_distance(near);
        if self.jitter {
            let voxel_fraction = 2.0 * pixel_hash(pixel_coords) - 1.0;
            position += direction * (voxel_fraction / field.grid().size() as f32);
        }

        let texture_offset = Vector3::repeat(0.5);

        let mut distance = near;
        let mut n_samples = 0;
        let mut terminated_early = false;

        while distance < far {
            let texture_coords = position + texture_offset;

            let density = field.sample(&texture_coords, self.sampling);
            let sample_opacity =
                smoothstep(DENSITY_THRESHOLDS.0, DENSITY_THRESHOLDS.1, density) * self.opacity;
            let shade = self
                .shading
                .shade(field, self.sampling, &texture_coords, &position);

            let transmittance = 1.0 - color.w;
            color.x += transmittance * sample_opacity * shade;
            color.y += transmittance * sample_opacity * shade;
            color.z += transmittance * sample_opacity * shade;
            color.w += transmittance * sample_opacity;

            n_samples += 1;

            observer(&MarchStep {
                distance,
                position,
                density,
                sample_opacity,
                shade,
                color,
            });

            if color.w > ALPHA_CUTOFF {
                terminated_early = true;
                break;
            }

            position += direction * delta;

            let next_distance = distance + delta;
            if next_distance <= distance {
                // Step too small to advance at this distance
                break;
            }
            distance = next_distance;
        }

        RayMarchOutcome {
            color,
            n_samples,
            terminated_early,
            hit: true,
        }
    }
}

/// Deterministic pseudo-random value in `[0, 1]` for the given pixel
/// coordinates, using the common sine-based shader hash.
pub fn pixel_hash(pixel_coords: [f32; 2]) -> f32 {
    let dot = pixel_coords[0] * 12.9898 + pixel_coords[1] * 78.233;
    fract(dot.sin() * 43_758.547)
}

/// Converts a `0xRRGGBB` color to RGB channels in `[0, 1]`.
pub fn rgb_from_hex(hex: u32) -> Vector3<f32> {
    let channel = |shift: u32| f32::from(((hex >> shift) & 0xFF) as u8) / 255.0;
    Vector3::new(channel(16), channel(8), channel(0))
}

fn compute_step_length(direction: &Vector3<f32>, steps: u32) -> f32 {
    let shortest_traversal = direction
        .iter()
        .map(|component| 1.0 / component.abs())
        .fold(f32::INFINITY, f32::min);
    shortest_traversal / steps as f32
}
