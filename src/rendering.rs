//! Rendering of raymarched frames on the CPU.

mod camera;

pub use camera::{Camera, DEFAULT_VERTICAL_FIELD_OF_VIEW, ObjectPose, euler_xyz_rotation};

use crate::{
    field::DensityField,
    raymarch::{SampleShading, VolumeRaymarcher, rgb_from_hex},
};
use anyhow::{Result, bail};
use nalgebra::{Vector3, Vector4};
use rayon::prelude::*;
use std::path::Path;

/// Renders frames of a density field by marching one ray per pixel and
/// blending the result over a solid background.
#[derive(Clone, Debug)]
pub struct FrameRenderer {
    width: u32,
    height: u32,
    camera: Camera,
    pose: ObjectPose,
    background_color: Vector3<f32>,
}

/// A rendered RGBA8 image stored row by row from the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameRenderer {
    /// Creates a renderer for frames with the given dimensions.
    ///
    /// # Errors
    /// Returns an error if the width or height is zero.
    pub fn new(width: u32, height: u32, camera: Camera, pose: ObjectPose) -> Result<Self> {
        if width == 0 || height == 0 {
            bail!("Frame dimensions must be non-zero, got {}x{}", width, height);
        }
        Ok(Self {
            width,
            height,
            camera,
            pose,
            background_color: Vector3::zeros(),
        })
    }

    /// Uses the given `0xRRGGBB` color as background.
    pub fn with_background_color(mut self, hex: u32) -> Self {
        self.background_color = rgb_from_hex(hex);
        self
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn pose(&self) -> &ObjectPose {
        &self.pose
    }

    /// Renders a frame of the given field, with rows rendered in parallel.
    pub fn render<S: SampleShading>(
        &self,
        field: &DensityField,
        raymarcher: &VolumeRaymarcher<S>,
    ) -> Frame {
        let width = self.width as usize;
        let mut pixels = vec![0; 4 * width * self.height as usize];

        with_timing_info_logging!("Rendering {}x{} frame", self.width, self.height; {
            pixels
                .par_chunks_mut(4 * width)
                .enumerate()
                .for_each(|(row, row_pixels)| {
                    for (column, pixel) in row_pixels.chunks_exact_mut(4).enumerate() {
                        let color = self.render_pixel(field, raymarcher, column, row);
                        pixel.copy_from_slice(&color);
                    }
                });
        });

        Frame {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    fn render_pixel<S: SampleShading>(
        &self,
        field: &DensityField,
        raymarcher: &VolumeRaymarcher<S>,
        column: usize,
        row: usize,
    ) -> [u8; 4] {
        let image_coords = [column as f32 + 0.5, row as f32 + 0.5];

        let world_ray = self
            .camera
            .primary_ray(self.width, self.height, image_coords);
        let object_ray = self.pose.transform_ray_to_object_space(&world_ray);

        // Window coordinates have their origin in the lower left corner
        let window_coords = [image_coords[0], self.height as f32 - image_coords[1]];

        let outcome = raymarcher.march(field, &object_ray, window_coords);

        blend_over_background(&outcome.color, &self.background_color)
    }
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the RGBA8 pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the RGBA8 color of the pixel in the given column and row.
    ///
    /// # Panics
    /// If the pixel is outside the frame.
    pub fn pixel(&self, column: u32, row: u32) -> [u8; 4] {
        assert!(column < self.width && row < self.height);
        let start = 4 * (row as usize * self.width as usize + column as usize);
        [
            self.pixels[start],
            self.pixels[start + 1],
            self.pixels[start + 2],
            self.pixels[start + 3],
        ]
    }

    /// Saves the frame as a PNG file.
    ///
    /// # Errors
    /// Returns an error if the file could not be written.
    pub fn save_png(&self, output_file_path: impl AsRef<Path>) -> Result<()> {
        nebula_io::image::save_rgba8_as_png(
            output_file_path,
            self.width,
            self.height,
            &self.pixels,
        )
    }
}

/// Blends the given color with non-premultiplied alpha over an opaque
/// background and quantizes the result to RGBA8.
fn blend_over_background(color: &Vector4<f32>, background_color: &Vector3<f32>) -> [u8; 4] {
    let alpha = color.w.clamp(0.0, 1.0);
    let blended = color.xyz() * alpha + background_color * (1.0 - alpha);
    let quantize = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    [
        quantize(blended.x),
        quantize(blended.y),
        quantize(blended.z),
        u8::MAX,
    ]
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::raymarch::RaymarchingConfig;
    use nalgebra::vector;

    fn renderer(width: u32, height: u32) -> FrameRenderer {
        FrameRenderer::new(width, height, Camera::default(), ObjectPose::identity()).unwrap()
    }

    #[test]
    fn creating_renderer_for_empty_frame_fails() {
        assert!(FrameRenderer::new(0, 4, Camera::default(), ObjectPose::identity()).is_err());
        assert!(FrameRenderer::new(4, 0, Camera::default(), ObjectPose::identity()).is_err());
    }

    #[test]
    fn blending_transparent_color_gives_background() {
        let blended =
            blend_over_background(&Vector4::new(1.0, 1.0, 1.0, 0.0), &vector![0.0, 1.0, 0.0]);
        assert_eq!(blended, [0, 255, 0, 255]);
    }

    #[test]
    fn blending_opaque_color_hides_background() {
        let blended =
            blend_over_background(&Vector4::new(1.0, 0.0, 0.0, 1.0), &vector![0.0, 1.0, 0.0]);
        assert_eq!(blended, [255, 0, 0, 255]);
    }

    #[test]
    fn blending_clamps_overbright_colors() {
        let blended =
            blend_over_background(&Vector4::new(3.0, -1.0, 0.5, 1.0), &Vector3::zeros());
        assert_eq!(blended, [255, 0, 128, 255]);
    }

    #[test]
    fn frame_of_empty_field_shows_only_background() {
        let field = DensityField::uniform(4, 0);
        let raymarcher = VolumeRaymarcher::new(&RaymarchingConfig::default());
        let frame = renderer(6, 4)
            .with_background_color(0x102030)
            .render(&field, &raymarcher);

        assert_eq!(frame.pixels().len(), 4 * 6 * 4);
        for pixel in frame.pixels().chunks_exact(4) {
            assert_eq!(pixel, &[0x10, 0x20, 0x30, 0xFF]);
        }
    }

    #[test]
    fn frame_of_opaque_field_covers_background() {
        let field = DensityField::uniform(4, 255);
        let raymarcher = VolumeRaymarcher::new(&RaymarchingConfig {
            opacity: 1.0,
            ..RaymarchingConfig::default()
        });
        let frame = renderer(5, 5)
            .with_background_color(0x0000FF)
            .render(&field, &raymarcher);

        // Every ray from the default camera starts inside the volume, and the
        // first sample of each is fully opaque
        let base = raymarcher.base_color();
        let center = frame.pixel(2, 2);
        assert_eq!(center[3], 255);
        assert!(center[2] < 255);
        assert!(center[0] >= (base.x * 255.0) as u8);
        assert_ne!(frame.pixel(0, 0), [0, 0, 255, 255]);
    }

    #[test]
    fn saving_frame_writes_png_with_frame_dimensions() {
        let frame = renderer(3, 2).render(
            &DensityField::uniform(4, 0),
            &VolumeRaymarcher::new(&RaymarchingConfig::default()),
        );
        let path = std::env::temp_dir()
            .join(format!("nebula_frame_{}", std::process::id()))
            .join("frame.png");

        frame.save_png(&path).unwrap();

        let (width, height) = ::image::image_dimensions(&path).unwrap();
        assert_eq!((width, height), (3, 2));
    }

    #[test]
    fn pixel_accessor_reads_row_major_rgba() {
        let frame = Frame {
            width: 2,
            height: 2,
            pixels: (0..16).collect(),
        };
        assert_eq!(frame.pixel(0, 0), [0, 1, 2, 3]);
        assert_eq!(frame.pixel(1, 0), [4, 5, 6, 7]);
        assert_eq!(frame.pixel(0, 1), [8, 9, 10, 11]);
    }
}
