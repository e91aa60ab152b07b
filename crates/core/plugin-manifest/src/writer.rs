//! Manifest serialization and output.
//!
//! The manifest is written as 2-space indented JSON to `<name>.jquery.json`, where
//! `<name>` is the manifest's `name` field.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::manifest::OutputManifest;

/// Suffix appended to the plugin name to form the manifest file name.
pub const MANIFEST_FILE_SUFFIX: &str = ".jquery.json";

/// Errors that occur while writing the manifest.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The manifest `name` cannot be used as a file name.
    #[error("invalid plugin name for manifest file: {reason}")]
    InvalidName {
        /// Why the name was rejected.
        reason: String,
    },

    /// The manifest could not be serialized.
    #[error("failed to serialize manifest to JSON")]
    Serialize(#[source] serde_json::Error),

    /// The manifest file could not be written.
    #[error("failed to write manifest file '{}'", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Returns the manifest file name, `<name>.jquery.json`.
///
/// # Errors
///
/// Returns [`WriteError::InvalidName`] if `name` is missing, not a string, empty,
/// `.`/`..`, or contains a path separator.
pub fn manifest_file_name(manifest: &OutputManifest) -> Result<String, WriteError> {
    let name = manifest.name().ok_or_else(|| WriteError::InvalidName {
        reason: "`name` must be a string".to_string(),
    })?;

    if name.is_empty() {
        return Err(WriteError::InvalidName {
            reason: "`name` must not be empty".to_string(),
        });
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(WriteError::InvalidName {
            reason: format!("`{name}` must not contain path components"),
        });
    }

    Ok(format!("{name}{MANIFEST_FILE_SUFFIX}"))
}

/// Renders the manifest as 2-space indented JSON with a trailing newline.
///
/// # Errors
///
/// Returns [`WriteError::Serialize`] if serialization fails.
pub fn render_manifest(manifest: &OutputManifest) -> Result<String, WriteError> {
    let mut json = serde_json::to_string_pretty(manifest).map_err(WriteError::Serialize)?;
    json.push('\n');
    Ok(json)
}

/// Writes the manifest to `<out_dir>/<name>.jquery.json` and returns the path.
///
/// The manifest is left untouched on failure and can be written again.
///
/// # Errors
///
/// Returns [`WriteError`] if the name is unusable, serialization fails, or the file
/// cannot be written.
pub fn write_manifest(manifest: &OutputManifest, out_dir: &Path) -> Result<PathBuf, WriteError> {
    let path = out_dir.join(manifest_file_name(manifest)?);
    let json = render_manifest(manifest)?;

    fs::write(&path, json).map_err(|source| WriteError::Write {
        path: path.clone(),
        source,
    })?;

    tracing::debug!(path = %path.display(), "wrote plugin manifest");
    Ok(path)
}
