//! One manifest generation run.
//!
//! [`ManifestTask`] ties the steps together: load the descriptor, build the
//! manifest, write `<name>.jquery.json`. The descriptor and the manifest are
//! computed on first access and reused for the rest of the run.

use std::path::{Path, PathBuf};

use crate::{
    builder::{self, BuildError},
    manifest::{OutputManifest, OverrideMap},
    options::ManifestOptions,
    source::{SourceDescriptor, SourceError, SourceLoader},
    writer::{self, WriteError},
};

/// Errors that abort a manifest generation run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The package descriptor could not be loaded.
    #[error("cannot read source file")]
    UnreadableSource(#[source] SourceError),

    /// A required manifest field has no value.
    #[error(transparent)]
    MissingRequiredField(BuildError),

    /// The manifest file could not be written.
    #[error("failed to write manifest")]
    WriteFailure(#[source] WriteError),
}

/// A single manifest generation run.
#[derive(Debug)]
pub struct ManifestTask {
    loader: SourceLoader,
    overrides: Option<OverrideMap>,
    output: Option<OutputManifest>,
}

impl ManifestTask {
    /// Creates a run for the given options.
    ///
    /// Relative source paths and the default `package.json` resolve against `base_dir`.
    pub fn new(options: &ManifestOptions, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            loader: SourceLoader::new(options.source_spec(), base_dir),
            overrides: options.overrides().cloned(),
            output: None,
        }
    }

    /// Returns the package descriptor, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnreadableSource`] if the descriptor cannot be loaded.
    pub fn source_values(&mut self) -> Result<&SourceDescriptor, Error> {
        self.loader.load().map_err(Error::UnreadableSource)
    }

    /// Returns the plugin manifest, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnreadableSource`] if the descriptor cannot be loaded and
    /// [`Error::MissingRequiredField`] if a required field has no value.
    #[tracing::instrument(skip_all)]
    pub fn output_values(&mut self) -> Result<&OutputManifest, Error> {
        let manifest = match self.output.take() {
            Some(manifest) => manifest,
            None => {
                let source = self.loader.load().map_err(Error::UnreadableSource)?;
                builder::build_manifest(source, self.overrides.as_ref())
                    .map_err(Error::MissingRequiredField)?
            }
        };
        Ok(self.output.insert(manifest))
    }

    /// Builds the manifest if needed and writes it into `out_dir`.
    ///
    /// Returns the path of the written file. No file is written when loading or
    /// building fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnreadableSource`] or [`Error::MissingRequiredField`] from
    /// [`output_values`](Self::output_values), and [`Error::WriteFailure`] if the
    /// file cannot be written. The built manifest stays cached after a write failure.
    #[tracing::instrument(skip_all, fields(out_dir = %out_dir.display()))]
    pub fn write_manifest(&mut self, out_dir: &Path) -> Result<PathBuf, Error> {
        let manifest = self.output_values()?;
        writer::write_manifest(manifest, out_dir).map_err(Error::WriteFailure)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn options(yaml: &str) -> ManifestOptions {
        ManifestOptions::from_yaml(yaml).expect("test options must parse")
    }

    fn write_package_json(dir: &Path, value: serde_json::Value) {
        fs::write(
            dir.join("package.json"),
            serde_json::to_string(&value).expect("serialize"),
        )
        .expect("should write package.json");
    }

    #[test]
    fn output_values_is_computed_once() {
        //* Given
        let dir = TempDir::new().expect("should create temp dir");
        write_package_json(
            dir.path(),
            json!({ "name": "slider", "version": "1.0.0", "author": "Jane", "license": "MIT" }),
        );
        let mut task = ManifestTask::new(&ManifestOptions::default(), dir.path());
        let first = task.output_values().expect("first build").clone();
        fs::remove_file(dir.path().join("package.json")).expect("should remove package.json");

        //* When
        let second = task.output_values().expect("cached build").clone();

        //* Then
        assert_eq!(first, second);
    }

    #[test]
    fn source_values_share_the_loader_cache() {
        //* Given
        let dir = TempDir::new().expect("should create temp dir");
        let mut task = ManifestTask::new(
            &options("source:\n  name: inline\n  version: 1.0.0\n"),
            dir.path(),
        );

        //* When
        let source = task.source_values().expect("inline source").clone();

        //* Then
        assert_eq!(source.get("name"), Some(&json!("inline")));
    }

    #[test]
    fn missing_default_source_is_unreadable() {
        //* Given
        let dir = TempDir::new().expect("should create temp dir");
        let mut task = ManifestTask::new(&ManifestOptions::default(), dir.path());

        //* When
        let result = task.write_manifest(dir.path());

        //* Then
        let err = result.expect_err("run should fail without package.json");
        assert!(matches!(err, Error::UnreadableSource(_)), "unexpected error: {err:?}");
        assert_eq!(err.to_string(), "cannot read source file");
        assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }

    #[test]
    fn missing_required_field_prevents_write() {
        //* Given
        let dir = TempDir::new().expect("should create temp dir");
        let mut task = ManifestTask::new(
            &options("source:\n  version: 1.0.0\n  author: Jane\n  license: MIT\n"),
            dir.path(),
        );

        //* When
        let result = task.write_manifest(dir.path());

        //* Then
        let err = result.expect_err("run should fail without name");
        assert!(
            matches!(
                err,
                Error::MissingRequiredField(BuildError::MissingRequiredField { field: "name" })
            ),
            "unexpected error: {err:?}"
        );
        assert_eq!(err.to_string(), "missing required field: `name`");
        assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }

    #[test]
    fn write_manifest_applies_overrides() {
        //* Given
        let dir = TempDir::new().expect("should create temp dir");
        write_package_json(
            dir.path(),
            json!({ "name": "slider", "version": "1.0.0", "author": "Jane", "license": "MIT" }),
        );
        let mut task = ManifestTask::new(&options("overrides:\n  version: 9.9.9\n"), dir.path());

        //* When
        let path = task.write_manifest(dir.path()).expect("run should succeed");

        //* Then
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).expect("read manifest"))
                .expect("valid JSON");
        assert_eq!(written["version"], json!("9.9.9"));
    }
}
