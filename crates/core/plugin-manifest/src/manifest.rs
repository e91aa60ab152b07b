//! The generated plugin manifest.

use serde_json::{Map, Value};

/// Caller-supplied values that replace derived manifest values, keyed by field name.
pub type OverrideMap = Map<String, Value>;

/// A jQuery plugin manifest ready to be written as `<name>.jquery.json`.
///
/// Keys appear in field-table order and only when a value was produced.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct OutputManifest(Map<String, Value>);

impl OutputManifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Returns the value of `field`, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the plugin name when it is a string.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Iterates over the manifest field names in output order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of fields in the manifest.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the manifest has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub(crate) fn insert(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }
}

impl From<OutputManifest> for Value {
    fn from(manifest: OutputManifest) -> Self {
        Value::Object(manifest.0)
    }
}
