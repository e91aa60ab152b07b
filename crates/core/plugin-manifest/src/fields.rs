//! Field rules for the jQuery plugin manifest.
//!
//! The table is the single source of truth for which manifest fields exist, which of
//! them are required, and how each one is derived from the package descriptor. Field
//! order in the table is the key order of the generated manifest.
//!
//! | Field          | Required | Derived from                                   |
//! |----------------|----------|------------------------------------------------|
//! | `name`         | yes      | `name`                                         |
//! | `version`      | yes      | `version`                                      |
//! | `title`        | yes      | `name`                                         |
//! | `author`       | yes      | `author` (a string is wrapped as `{ name }`)   |
//! | `licenses`     | yes      | `licenses`, or synthesized from `license`      |
//! | `dependencies` | yes      | `dependencies` merged over `{ "jquery": "*" }` |
//! | `description`, `keywords`, `homepage`, `docs`, `demo`, `download`, `bugs`, `maintainers` | no | verbatim |

use serde_json::{Map, Value, json};

use crate::source::SourceDescriptor;

/// Package every plugin manifest depends on.
pub const HOST_LIBRARY: &str = "jquery";

/// Version requirement added for [`HOST_LIBRARY`] when the descriptor does not pin one.
pub const HOST_LIBRARY_VERSION: &str = "*";

/// Prefix used to synthesize a license URL from an SPDX-style license name.
pub const LICENSE_URL_BASE: &str = "http://opensource.org/licenses/";

/// Derives a manifest value from the package descriptor.
///
/// Returns `None` when the descriptor has nothing to derive the value from.
pub type Mapping = fn(&SourceDescriptor) -> Option<Value>;

/// How a single manifest field is produced.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// Manifest key.
    pub name: &'static str,
    /// Whether a run must fail when no value can be produced.
    pub required: bool,
    /// Transformation from the descriptor. `None` copies the descriptor key verbatim.
    pub mapping: Option<Mapping>,
}

impl FieldRule {
    const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            mapping: None,
        }
    }

    const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            mapping: None,
        }
    }

    const fn mapped(name: &'static str, mapping: Mapping) -> Self {
        Self {
            name,
            required: true,
            mapping: Some(mapping),
        }
    }

    /// Derives this field's value from the descriptor.
    ///
    /// Applies the mapping when the rule has one, otherwise reads the key of the same
    /// name. Overrides are not considered here; see [`crate::builder`].
    pub fn resolve(&self, source: &SourceDescriptor) -> Option<Value> {
        match self.mapping {
            Some(mapping) => mapping(source),
            None => source.get(self.name).cloned(),
        }
    }
}

static FIELDS: &[FieldRule] = &[
    FieldRule::required("name"),
    FieldRule::required("version"),
    FieldRule::mapped("title", map_title),
    FieldRule::mapped("author", map_author),
    FieldRule::mapped("licenses", map_licenses),
    FieldRule::mapped("dependencies", map_dependencies),
    FieldRule::optional("description"),
    FieldRule::optional("keywords"),
    FieldRule::optional("homepage"),
    FieldRule::optional("docs"),
    FieldRule::optional("demo"),
    FieldRule::optional("download"),
    FieldRule::optional("bugs"),
    FieldRule::optional("maintainers"),
];

/// Returns the field rules in manifest order.
pub fn table() -> &'static [FieldRule] {
    FIELDS
}

/// Looks up the rule for a manifest field.
pub fn lookup(name: &str) -> Option<&'static FieldRule> {
    FIELDS.iter().find(|rule| rule.name == name)
}

fn map_title(source: &SourceDescriptor) -> Option<Value> {
    source.get("name").cloned()
}

fn map_author(source: &SourceDescriptor) -> Option<Value> {
    match source.get("author")? {
        Value::String(name) => Some(json!({ "name": name })),
        other => Some(other.clone()),
    }
}

fn map_licenses(source: &SourceDescriptor) -> Option<Value> {
    if let Some(licenses @ Value::Array(_)) = source.get("licenses") {
        return Some(licenses.clone());
    }

    match source.get("license")? {
        Value::String(license) => Some(json!([{
            "type": license,
            "url": format!("{LICENSE_URL_BASE}{license}")
        }])),
        // Legacy npm form: `"license": { "type": "MIT", "url": "..." }`
        license @ Value::Object(_) => Some(Value::Array(vec![license.clone()])),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::Array(_) => None,
    }
}

fn map_dependencies(source: &SourceDescriptor) -> Option<Value> {
    let mut dependencies = Map::new();
    dependencies.insert(
        HOST_LIBRARY.to_string(),
        Value::String(HOST_LIBRARY_VERSION.to_string()),
    );

    if let Some(Value::Object(declared)) = source.get("dependencies") {
        for (package, requirement) in declared {
            dependencies.insert(package.clone(), requirement.clone());
        }
    }

    Some(Value::Object(dependencies))
}
