//! Task options for manifest generation.
//!
//! Options are read from `jquerymanifest.yaml` (or `jquerymanifest.yml`) in the
//! project directory. The file is optional; without it the descriptor is read from
//! `package.json` and no overrides apply. Since YAML is a superset of JSON, a JSON
//! options file works as well.
//!
//! ```yaml
//! # string path, inline mapping, or omitted
//! source: package.json
//! overrides:
//!   version: "2.0"
//!   homepage: https://example.com/my-plugin
//! ```
//!
//! Override values keep their YAML types. Quote versions: an unquoted `2.0` is a
//! number and is written to the manifest as `2.0`, not `"2.0"`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::{manifest::OverrideMap, source::SourceSpec};

const OPTIONS_YAML_FILE: &str = "jquerymanifest.yaml";
const OPTIONS_YML_FILE: &str = "jquerymanifest.yml";

/// Options for a single manifest generation run.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestOptions {
    /// Raw `source` option: a path string, an inline descriptor mapping, or absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    /// Values replacing derived manifest fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Value>,
}

impl ManifestOptions {
    /// Parses options from a YAML (or JSON) string.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::Parse`] if the text is not valid YAML or has unknown
    /// keys, and [`OptionsError::InvalidOverrides`] if `overrides` is not a mapping.
    pub fn from_yaml(yaml: &str) -> Result<Self, OptionsError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let options: Self =
            serde_yaml::from_str(yaml).map_err(|source| OptionsError::Parse { source })?;
        options.validate()?;
        Ok(options)
    }

    fn validate(&self) -> Result<(), OptionsError> {
        match &self.overrides {
            None | Some(Value::Object(_)) => Ok(()),
            Some(other) => Err(OptionsError::InvalidOverrides {
                found: crate::source::json_value_type(other),
            }),
        }
    }

    /// Returns the classified descriptor source.
    pub fn source_spec(&self) -> SourceSpec {
        SourceSpec::from_option(self.source.as_ref())
    }

    /// Returns the override mapping, if one is configured.
    pub fn overrides(&self) -> Option<&OverrideMap> {
        match &self.overrides {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Sets the descriptor source to a file path.
    pub fn set_source_path(&mut self, path: impl Into<PathBuf>) {
        let path: PathBuf = path.into();
        self.source = Some(Value::String(path.to_string_lossy().into_owned()));
    }

    /// Adds an override, replacing any configured value for the same field.
    pub fn set_override(&mut self, field: impl Into<String>, value: Value) {
        if !matches!(self.overrides, Some(Value::Object(_))) {
            self.overrides = Some(Value::Object(OverrideMap::new()));
        }
        if let Some(Value::Object(map)) = &mut self.overrides {
            map.insert(field.into(), value);
        }
    }
}

/// Errors that occur while parsing task options.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    /// YAML parsing failed or the structure does not match the options schema.
    #[error("failed to parse manifest options")]
    Parse {
        /// The underlying YAML parsing error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The `overrides` option is not a mapping.
    #[error("invalid 'overrides' option: expected mapping, got {found}")]
    InvalidOverrides {
        /// The JSON type that was provided.
        found: &'static str,
    },
}

/// Errors that occur while locating or loading the options file.
#[derive(Debug, thiserror::Error)]
pub enum OptionsLoadError {
    /// Both option file spellings were found, creating ambiguity.
    #[error(
        "both jquerymanifest.yaml and jquerymanifest.yml found in {}; remove one to continue",
        dir.display()
    )]
    Ambiguous {
        /// Directory containing the files.
        dir: PathBuf,
    },

    /// Failed to read the options file.
    #[error("failed to read options at {}", path.display())]
    Read {
        /// Path to the options file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the options file.
    #[error("failed to parse options at {}", path.display())]
    Parse {
        /// Path to the options file.
        path: PathBuf,
        /// The underlying options error.
        #[source]
        source: OptionsError,
    },
}

/// Locates the options file in a directory.
///
/// Returns `Ok(None)` when neither `jquerymanifest.yaml` nor `jquerymanifest.yml`
/// exists.
///
/// # Errors
///
/// Returns [`OptionsLoadError::Ambiguous`] if both files exist.
pub fn find_options_path(dir: &Path) -> Result<Option<PathBuf>, OptionsLoadError> {
    let yaml_path = dir.join(OPTIONS_YAML_FILE);
    let yml_path = dir.join(OPTIONS_YML_FILE);

    match (yaml_path.is_file(), yml_path.is_file()) {
        (true, true) => Err(OptionsLoadError::Ambiguous {
            dir: dir.to_path_buf(),
        }),
        (true, false) => Ok(Some(yaml_path)),
        (false, true) => Ok(Some(yml_path)),
        (false, false) => Ok(None),
    }
}

/// Loads and parses an options file.
///
/// # Errors
///
/// Returns [`OptionsLoadError`] if the file cannot be read or parsed.
pub fn load_from_path(path: &Path) -> Result<ManifestOptions, OptionsLoadError> {
    let contents = fs::read_to_string(path).map_err(|source| OptionsLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ManifestOptions::from_yaml(&contents).map_err(|source| OptionsLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the options file from a directory, or default options if there is none.
///
/// Returns the path of the file that was loaded, if any.
///
/// # Errors
///
/// Returns [`OptionsLoadError`] if the file is ambiguous, unreadable, or invalid.
pub fn load_from_dir(dir: &Path) -> Result<(Option<PathBuf>, ManifestOptions), OptionsLoadError> {
    match find_options_path(dir)? {
        Some(path) => {
            let options = load_from_path(&path)?;
            tracing::debug!(path = %path.display(), "loaded manifest options");
            Ok((Some(path), options))
        }
        None => Ok((None, ManifestOptions::default())),
    }
}
