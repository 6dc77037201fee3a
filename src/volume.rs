//! Shared nebula volume with explicit, atomic rebuilding of its field.

use crate::{
    config::NebulaConfig,
    field::{DensityField, generate_density_field},
    raymarch::VolumeRaymarcher,
};
use anyhow::Result;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// A density field together with the configuration it is generated and
/// rendered with.
///
/// Changing the configuration never rebuilds the field by itself. The host
/// calls [`Self::rebuild_field`] when it wants the field to reflect the
/// current configuration. Readers get a snapshot of the field, which stays
/// valid and unchanged while a rebuild runs and after the new field has been
/// swapped in.
#[derive(Debug)]
pub struct NebulaVolume {
    config: RwLock<NebulaConfig>,
    field: RwLock<Arc<DensityField>>,
    rebuild_lock: Mutex<()>,
}

impl NebulaVolume {
    /// Validates the given configuration and builds the initial field.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: NebulaConfig) -> Result<Self> {
        config.validate()?;
        let field = generate_density_field(&config.field)?;
        Ok(Self {
            config: RwLock::new(config),
            field: RwLock::new(Arc::new(field)),
            rebuild_lock: Mutex::new(()),
        })
    }

    /// Returns a copy of the current configuration.
    pub fn config(&self) -> NebulaConfig {
        self.config.read().clone()
    }

    /// Replaces the configuration if the new one is valid.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid, in which case the
    /// current configuration is kept.
    pub fn set_config(&self, config: NebulaConfig) -> Result<()> {
        config.validate()?;
        *self.config.write() = config;
        Ok(())
    }

    /// Applies the given modification to a copy of the configuration and
    /// keeps the result if it is valid.
    ///
    /// # Errors
    /// Returns an error if the modified configuration is invalid, in which
    /// case the current configuration is kept.
    pub fn modify_config(&self, modify: impl FnOnce(&mut NebulaConfig)) -> Result<()> {
        let mut config = self.config.write();
        let mut modified = config.clone();
        modify(&mut modified);
        modified.validate()?;
        *config = modified;
        Ok(())
    }

    /// Returns a snapshot of the current field.
    pub fn field(&self) -> Arc<DensityField> {
        Arc::clone(&self.field.read())
    }

    /// Whether the current field was built from other parameters than those
    /// in the current configuration.
    pub fn field_is_stale(&self) -> bool {
        let config = self.config.read();
        self.field.read().parameters() != Some(&config.field)
    }

    /// Builds a new field from the current configuration and swaps it in
    /// once it is complete. Returns the new field.
    ///
    /// # Errors
    /// Returns an error if the field could not be generated.
    pub fn rebuild_field(&self) -> Result<Arc<DensityField>> {
        let _rebuild_guard = self.rebuild_lock.lock();

        let parameters = self.config.read().field.clone();
        let field = Arc::new(with_debug_logging!("Rebuilding density field"; {
            generate_density_field(&parameters)
        })?);

        *self.field.write() = Arc::clone(&field);

        Ok(field)
    }

    /// Rebuilds the field if it is stale. Returns whether it was rebuilt.
    ///
    /// # Errors
    /// Returns an error if the field could not be generated.
    pub fn rebuild_field_if_stale(&self) -> Result<bool> {
        if self.field_is_stale() {
            self.rebuild_field()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Creates a raymarcher for the current raymarching configuration.
    pub fn raymarcher(&self) -> VolumeRaymarcher {
        VolumeRaymarcher::new(&self.config.read().raymarching)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::field::FieldParameters;
    use std::thread;

    fn small_config(grid_size: usize) -> NebulaConfig {
        NebulaConfig {
            field: FieldParameters {
                grid_size,
                ..FieldParameters::default()
            },
            ..NebulaConfig::default()
        }
    }

    #[test]
    fn new_volume_has_field_matching_config() {
        let volume = NebulaVolume::new(small_config(8)).unwrap();
        assert_eq!(volume.field().grid().size(), 8);
        assert!(!volume.field_is_stale());
    }

    #[test]
    fn creating_volume_with_invalid_config_fails() {
        let mut config = small_config(8);
        config.field.noise.octaves = 0;
        assert!(NebulaVolume::new(config).is_err());
    }

    #[test]
    fn changing_field_parameters_makes_field_stale_without_rebuilding() {
        let volume = NebulaVolume::new(small_config(8)).unwrap();
        let before = volume.field();

        volume
            .modify_config(|config| config.field.noise.persistence = 0.7)
            .unwrap();

        assert!(volume.field_is_stale());
        assert!(Arc::ptr_eq(&before, &volume.field()));
    }

    #[test]
    fn changing_only_raymarching_options_does_not_make_field_stale() {
        let volume = NebulaVolume::new(small_config(8)).unwrap();
        volume
            .modify_config(|config| config.raymarching.opacity = 0.9)
            .unwrap();
        assert!(!volume.field_is_stale());
    }

    #[test]
    fn invalid_modification_keeps_current_config() {
        let volume = NebulaVolume::new(small_config(8)).unwrap();
        let result = volume.modify_config(|config| config.field.ellipsoid.radius_x = 2.0);
        assert!(result.is_err());
        assert_eq!(volume.config(), small_config(8));

        let mut invalid = small_config(8);
        invalid.raymarching.steps = 0;
        assert!(volume.set_config(invalid).is_err());
        assert_eq!(volume.config(), small_config(8));
    }

    #[test]
    fn rebuild_swaps_in_new_field_and_keeps_old_snapshot_valid() {
        let volume = NebulaVolume::new(small_config(8)).unwrap();
        let old_field = volume.field();
        let old_bytes = old_field.as_bytes().to_vec();

        volume.set_config(small_config(12)).unwrap();
        let new_field = volume.rebuild_field().unwrap();

        assert_eq!(new_field.grid().size(), 12);
        assert!(Arc::ptr_eq(&new_field, &volume.field()));
        assert_eq!(old_field.grid().size(), 8);
        assert_eq!(old_field.as_bytes(), old_bytes.as_slice());
        assert!(!volume.field_is_stale());
    }

    #[test]
    fn rebuild_if_stale_only_rebuilds_when_needed() {
        let volume = NebulaVolume::new(small_config(8)).unwrap();
        assert!(!volume.rebuild_field_if_stale().unwrap());

        volume
            .modify_config(|config| config.field.noise.seed = Some(3))
            .unwrap();
        assert!(volume.rebuild_field_if_stale().unwrap());
        assert!(!volume.field_is_stale());
    }

    #[test]
    fn readers_see_complete_fields_during_rebuilds() {
        let volume = NebulaVolume::new(small_config(8)).unwrap();

        thread::scope(|scope| {
            scope.spawn(|| {
                for grid_size in [10, 6, 14, 8] {
                    volume.set_config(small_config(grid_size)).unwrap();
                    volume.rebuild_field().unwrap();
                }
            });
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        let field = volume.field();
                        assert_eq!(field.as_bytes().len(), field.grid().n_voxels());
                        let parameters = field.parameters().unwrap();
                        assert_eq!(parameters.grid_size, field.grid().size());
                    }
                });
            }
        });

        assert_eq!(volume.field().grid().size(), 8);
    }

    #[test]
    fn raymarcher_uses_current_raymarching_config() {
        let volume = NebulaVolume::new(small_config(8)).unwrap();
        volume
            .modify_config(|config| config.raymarching.base_color = 0xFF0000)
            .unwrap();
        assert_eq!(volume.raymarcher().base_color().x, 1.0);
        assert_eq!(volume.raymarcher().base_color().y, 0.0);
    }
}
