//! Package descriptor loading.
//!
//! The descriptor (normally `package.json`) is resolved from the task's `source`
//! option:
//!
//! - a string is a path to a JSON file, relative to the run's base directory
//! - a mapping is used as the descriptor directly
//! - anything else falls back to `package.json` in the base directory
//!
//! A [`SourceLoader`] reads its descriptor at most once; later calls return the
//! cached value.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};

/// Descriptor file used when no `source` option is configured.
pub const DEFAULT_SOURCE_FILE: &str = "package.json";

/// A parsed package descriptor.
///
/// Wraps the top-level JSON object of the descriptor. Keys keep their file order.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SourceDescriptor(Map<String, Value>);

impl SourceDescriptor {
    /// Creates a descriptor from a JSON object.
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    /// Creates a descriptor from a JSON value.
    ///
    /// Returns `None` unless the value is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(values) => Some(Self(values)),
            _ => None,
        }
    }

    /// Returns the descriptor value for `field`, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Where the descriptor comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    /// JSON file on disk.
    Path(PathBuf),
    /// Descriptor supplied inline by the caller.
    Inline(SourceDescriptor),
    /// [`DEFAULT_SOURCE_FILE`] in the base directory.
    Default,
}

impl SourceSpec {
    /// Classifies the raw `source` option.
    pub fn from_option(source: Option<&Value>) -> Self {
        match source {
            Some(Value::String(path)) => Self::Path(PathBuf::from(path)),
            Some(Value::Object(values)) => Self::Inline(SourceDescriptor::new(values.clone())),
            Some(Value::Null | Value::Bool(_) | Value::Number(_) | Value::Array(_)) | None => {
                Self::Default
            }
        }
    }
}

/// Loads the package descriptor once per run.
#[derive(Debug)]
pub struct SourceLoader {
    spec: SourceSpec,
    base_dir: PathBuf,
    cached: Option<SourceDescriptor>,
}

impl SourceLoader {
    /// Creates a loader resolving relative paths against `base_dir`.
    pub fn new(spec: SourceSpec, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            spec,
            base_dir: base_dir.into(),
            cached: None,
        }
    }

    /// Returns the descriptor, reading it on the first call only.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the descriptor file is missing, unreadable, not valid
    /// JSON, or not a JSON object. A failed load is not cached.
    pub fn load(&mut self) -> Result<&SourceDescriptor, SourceError> {
        let descriptor = match self.cached.take() {
            Some(descriptor) => descriptor,
            None => self.read()?,
        };
        Ok(self.cached.insert(descriptor))
    }

    /// Returns `true` once a descriptor has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.cached.is_some()
    }

    fn read(&self) -> Result<SourceDescriptor, SourceError> {
        match &self.spec {
            SourceSpec::Path(path) => read_descriptor_file(&self.base_dir.join(path)),
            SourceSpec::Inline(descriptor) => {
                tracing::debug!("using inline package descriptor");
                Ok(descriptor.clone())
            }
            SourceSpec::Default => {
                let path = self.base_dir.join(DEFAULT_SOURCE_FILE);
                if !path.is_file() {
                    return Err(SourceError::DefaultMissing { path });
                }
                read_descriptor_file(&path)
            }
        }
    }
}

/// Reads and parses a descriptor file.
///
/// # Errors
///
/// Returns [`SourceError::Read`] if the file cannot be read,
/// [`SourceError::Parse`] if it is not valid JSON, and
/// [`SourceError::NotAnObject`] if the top-level value is not an object.
pub fn read_descriptor_file(path: &Path) -> Result<SourceDescriptor, SourceError> {
    tracing::debug!(path = %path.display(), "reading package descriptor");

    let contents = fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&contents).map_err(|source| SourceError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let found = json_value_type(&value);
    SourceDescriptor::from_value(value).ok_or_else(|| SourceError::NotAnObject {
        path: path.to_path_buf(),
        found,
    })
}

pub(crate) fn json_value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Errors that occur while loading the package descriptor.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The descriptor file could not be read.
    #[error("failed to read source file '{}'", path.display())]
    Read {
        /// Path to the descriptor file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The descriptor file is not valid JSON.
    #[error("failed to parse source file '{}'", path.display())]
    Parse {
        /// Path to the descriptor file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The descriptor file holds valid JSON that is not an object.
    #[error("source file '{}' must contain a JSON object, found {found}", path.display())]
    NotAnObject {
        /// Path to the descriptor file.
        path: PathBuf,
        /// JSON type found at the top level.
        found: &'static str,
    },

    /// No source was configured and the default descriptor does not exist.
    #[error("no source configured and '{}' does not exist", path.display())]
    DefaultMissing {
        /// Path where the default descriptor was expected.
        path: PathBuf,
    },
}
