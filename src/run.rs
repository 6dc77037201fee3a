//! Running the generation and rendering pipeline.

use crate::{
    config::NebulaConfig,
    field::save_density_field,
    rendering::{Camera, Frame, FrameRenderer, ObjectPose},
    volume::NebulaVolume,
};
use anyhow::{Context, Result};
use std::{num::NonZeroUsize, path::PathBuf};

/// What to render and where to write the results.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    /// Milliseconds the volume has been spinning for.
    pub time_ms: f64,
    pub image_output_path: PathBuf,
    /// Where to write the raw density field, if anywhere.
    pub field_output_path: Option<PathBuf>,
}

pub fn init_logging() -> Result<()> {
    env_logger::try_init()?;
    Ok(())
}

/// Sets the number of worker threads used for generating fields and
/// rendering frames. Must be called before any parallel work is done.
///
/// # Errors
/// Returns an error if the global thread pool has already been initialized.
pub fn configure_thread_pool(n_threads: NonZeroUsize) -> Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads.get())
        .build_global()
        .context("Could not configure worker threads")
}

/// Generates the volume for the given configuration, renders a frame of it
/// and writes the requested output files.
///
/// # Errors
/// Returns an error if the configuration is invalid or any output could not
/// be written.
pub fn run(config: NebulaConfig, options: &RenderOptions) -> Result<()> {
    let volume = NebulaVolume::new(config)?;

    if let Some(field_output_path) = &options.field_output_path {
        save_density_field(&volume.field(), field_output_path)?;
        log::info!("Saved density field to {}", field_output_path.display());
    }

    let frame = render_volume(&volume, options)?;
    frame.save_png(&options.image_output_path)?;
    log::info!("Saved frame to {}", options.image_output_path.display());

    Ok(())
}

/// Renders a frame of the current field of the given volume from the
/// default camera.
///
/// # Errors
/// Returns an error if the frame dimensions are zero.
pub fn render_volume(volume: &NebulaVolume, options: &RenderOptions) -> Result<Frame> {
    let config = volume.config();

    let renderer = FrameRenderer::new(
        options.width,
        options.height,
        Camera::default(),
        ObjectPose::spinning(config.position(), options.time_ms),
    )?
    .with_background_color(config.background.color);

    Ok(renderer.render(&volume.field(), &volume.raymarcher()))
}
