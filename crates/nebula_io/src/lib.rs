//! Utilities for input/output of configuration files, volume data and
//! rendered frames.

#[cfg(feature = "png")]
pub mod image;

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{self, BufReader, Read, Write},
    path::{Path, PathBuf},
};

/// Creates any directories missing in order for the given path to be valid.
pub fn create_directory_if_missing(path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if path.extension().is_some() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
        } else {
            Ok(())
        }
    } else {
        fs::create_dir_all(path)
    }
}

/// Creates the file at the given path, as well as any missing parent
/// directories.
pub fn create_file_and_required_directories(file_path: impl AsRef<Path>) -> io::Result<File> {
    create_directory_if_missing(&file_path)?;
    File::create(file_path)
}

/// Reads and returns the content of the specified text file.
pub fn read_text_file(file_path: impl AsRef<Path>) -> io::Result<String> {
    let file = File::open(file_path)?;
    let mut text = String::new();
    let _ = BufReader::new(file).read_to_string(&mut text)?;
    Ok(text)
}

/// Writes the given string as a text file with the specified path, regardless
/// of whether the file already exists.
pub fn write_text_file(text: &str, output_file_path: impl AsRef<Path>) -> io::Result<()> {
    let mut file = create_file_and_required_directories(output_file_path)?;
    write!(&mut file, "{text}")
}

/// Writes the given bytes of a cubic single-channel volume to a raw file at
/// the given path. The bytes are written as-is, so the caller decides the
/// memory layout.
///
/// # Errors
/// Returns an error if the number of bytes does not match the given cube
/// side length, or if the file could not be written.
pub fn save_volume_as_raw(
    output_file_path: impl AsRef<Path>,
    side_length: usize,
    bytes: &[u8],
) -> Result<()> {
    let output_file_path = output_file_path.as_ref();

    let expected_len = side_length.pow(3);
    anyhow::ensure!(
        bytes.len() == expected_len,
        "Volume has {} bytes, expected {} for side length {}",
        bytes.len(),
        expected_len,
        side_length
    );

    let mut file = create_file_and_required_directories(output_file_path)
        .with_context(|| format!("Could not create {}", output_file_path.display()))?;

    file.write_all(bytes)
        .with_context(|| format!("Could not write volume to {}", output_file_path.display()))
}

/// Returns the path of the metadata file accompanying the raw volume file at
/// the given path (the same path with a `.ron` extension).
pub fn volume_metadata_path(raw_file_path: impl AsRef<Path>) -> PathBuf {
    raw_file_path.as_ref().with_extension("ron")
}

/// Reads the RON (Rusty Object Notation) file at the given path and
/// deserializes the contents into an object of type `T`.
#[cfg(feature = "ron")]
pub fn parse_ron_file<T>(file_path: impl AsRef<Path>) -> Result<T>
where
    T: for<'de> serde::de::Deserialize<'de>,
{
    let file_path = file_path.as_ref();

    let text = read_text_file(file_path)
        .map_err(anyhow::Error::from)
        .with_context(|| format!("Could not open {}", file_path.display()))?;

    ron::from_str::<T>(&text)
        .map_err(anyhow::Error::from)
        .with_context(|| format!("Invalid syntax in {}", file_path.display()))
}

/// Serializes the given value of type `T` to RON (Rusty Object Notation)
/// and writes it to the given path.
#[cfg(feature = "ron")]
pub fn write_ron_file<T>(value: &T, output_file_path: impl AsRef<Path>) -> Result<()>
where
    T: serde::ser::Serialize,
{
    let output_file_path = output_file_path.as_ref();
    let text = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())?;
    write_text_file(&text, output_file_path)
        .with_context(|| format!("Could not write {}", output_file_path.display()))
}
