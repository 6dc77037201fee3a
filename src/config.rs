//! Configuration of the nebula volume and its rendering.

use crate::{field::FieldParameters, raymarch::RaymarchingConfig};
use anyhow::{Context, Result, bail};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::{ops::RangeInclusive, path::Path};

/// Supported range for each component of the volume position.
pub const POSITION_RANGE: RangeInclusive<f32> = -0.5..=0.5;

/// Available background choices.
pub const BACKGROUND_CHOICES: RangeInclusive<u8> = 1..=6;

/// Configuration for generating and rendering a nebula.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NebulaConfig {
    pub field: FieldParameters,
    pub raymarching: RaymarchingConfig,
    /// World space position of the center of the volume.
    pub position: [f32; 3],
    pub background: BackgroundConfig,
}

/// Configuration of what the volume is rendered in front of.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Which of the available background images to show. Only passed on to
    /// hosts that display background images.
    pub choice: u8,
    /// Solid color as `0xRRGGBB`, used when rendering frames directly.
    pub color: u32,
}

impl NebulaConfig {
    /// Reads and validates the configuration in the given RON file.
    ///
    /// # Errors
    /// Returns an error if the file could not be read or parsed, or if the
    /// configuration is invalid.
    pub fn from_ron_file(file_path: impl AsRef<Path>) -> Result<Self> {
        let file_path = file_path.as_ref();
        let config: Self = nebula_io::parse_ron_file(file_path)?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", file_path.display()))?;
        Ok(config)
    }

    /// Writes the configuration to a RON file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file could not be written.
    pub fn save_ron_file(&self, output_file_path: impl AsRef<Path>) -> Result<()> {
        nebula_io::write_ron_file(self, output_file_path)
    }

    /// Checks that every option is in its supported range.
    ///
    /// # Errors
    /// Returns an error describing the first invalid option.
    pub fn validate(&self) -> Result<()> {
        self.field.validate().context("Invalid field parameters")?;
        self.raymarching
            .validate()
            .context("Invalid raymarching configuration")?;

        for (axis, component) in ["x", "y", "z"].into_iter().zip(self.position) {
            if !POSITION_RANGE.contains(&component) {
                bail!(
                    "Position {} component must be in [{}, {}], got {}",
                    axis,
                    POSITION_RANGE.start(),
                    POSITION_RANGE.end(),
                    component
                );
            }
        }

        self.background.validate()
    }

    pub fn position(&self) -> Vector3<f32> {
        Vector3::from(self.position)
    }
}

impl BackgroundConfig {
    /// Checks that the choice is available and the color is a 24-bit RGB
    /// value.
    ///
    /// # Errors
    /// Returns an error describing the first invalid option.
    pub fn validate(&self) -> Result<()> {
        if !BACKGROUND_CHOICES.contains(&self.choice) {
            bail!(
                "Background choice must be in {}..={}, got {}",
                BACKGROUND_CHOICES.start(),
                BACKGROUND_CHOICES.end(),
                self.choice
            );
        }
        if self.color > 0xFF_FFFF {
            bail!(
                "Background color must be a 24-bit RGB value, got {:#x}",
                self.color
            );
        }
        Ok(())
    }
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            choice: *BACKGROUND_CHOICES.start(),
            color: 0x000000,
        }
    }
}
