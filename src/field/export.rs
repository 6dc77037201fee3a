//! Writing density fields to file.

use super::{DensityField, FieldParameters};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Description of a raw density field file, written alongside it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Number of voxels along x, y and z.
    pub dimensions: [usize; 3],
    /// Number of bytes per voxel.
    pub bytes_per_voxel: usize,
    /// Order of the voxels in the raw file, from fastest to slowest varying
    /// axis.
    pub axis_order: [char; 3],
    pub parameters: Option<FieldParameters>,
}

impl FieldMetadata {
    pub fn for_field(field: &DensityField) -> Self {
        let size = field.grid().size();
        Self {
            dimensions: [size; 3],
            bytes_per_voxel: 1,
            axis_order: ['x', 'y', 'z'],
            parameters: field.parameters().cloned(),
        }
    }
}

/// Writes the values of the given field as raw bytes to the given path, and
/// its [`FieldMetadata`] to a RON file with the same path but a `.ron`
/// extension.
///
/// # Errors
/// Returns an error if any of the files could not be written.
pub fn save_density_field(field: &DensityField, output_file_path: impl AsRef<Path>) -> Result<()> {
    let output_file_path = output_file_path.as_ref();

    with_debug_logging!("Saving density field to {}", output_file_path.display(); {
        nebula_io::save_volume_as_raw(output_file_path, field.grid().size(), field.as_bytes())?;
        nebula_io::write_ron_file(
            &FieldMetadata::for_field(field),
            nebula_io::volume_metadata_path(output_file_path),
        )
    })
}
