//! Saving rendered frames as images.

use crate::create_directory_if_missing;
use anyhow::{Context, Result, bail};
use ::image::{ExtendedColorType, ImageFormat};
use std::path::Path;

/// Saves the given RGBA8 pixel data, laid out row by row starting at the top
/// row, as a PNG file at the given path.
///
/// # Errors
/// Returns an error if the pixel data does not match the given dimensions or
/// if the image could not be encoded or written.
pub fn save_rgba8_as_png(
    output_file_path: impl AsRef<Path>,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<()> {
    let output_file_path = output_file_path.as_ref();

    let expected_len = 4 * (width as usize) * (height as usize);
    if pixels.len() != expected_len {
        bail!(
            "Pixel buffer has {} bytes, expected {} for a {}x{} RGBA8 image",
            pixels.len(),
            expected_len,
            width,
            height
        );
    }

    create_directory_if_missing(output_file_path).with_context(|| {
        format!(
            "Could not create directory for {}",
            output_file_path.display()
        )
    })?;

    ::image::save_buffer_with_format(
        output_file_path,
        pixels,
        width,
        height,
        ExtendedColorType::Rgba8,
        ImageFormat::Png,
    )
    .with_context(|| format!("Could not save image to {}", output_file_path.display()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn saving_png_with_mismatched_buffer_fails() {
        let path = std::env::temp_dir().join("nebula_io_mismatched.png");
        assert!(save_rgba8_as_png(path, 2, 2, &[0; 15]).is_err());
    }

    #[test]
    fn saving_png_creates_file() {
        let path = std::env::temp_dir()
            .join(format!("nebula_io_png_{}", std::process::id()))
            .join("frame.png");
        save_rgba8_as_png(&path, 2, 1, &[255, 0, 0, 255, 0, 0, 255, 128]).unwrap();
        assert!(path.exists());
    }
}
