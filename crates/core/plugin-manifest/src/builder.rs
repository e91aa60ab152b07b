//! Manifest construction from a package descriptor.
//!
//! Walks the field table in order. For every field the value is chosen as follows:
//!
//! 1. an override for the field, used as-is
//! 2. otherwise the field's mapping applied to the descriptor
//! 3. otherwise the descriptor value under the same key
//!
//! A required field without a value fails the build; an optional one is left out.
//! Building performs no I/O.

use crate::{
    fields,
    manifest::{OutputManifest, OverrideMap},
    source::SourceDescriptor,
};

/// Errors that occur while building the manifest.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A required field has no value after overrides and mappings were applied.
    #[error("missing required field: `{field}`")]
    MissingRequiredField {
        /// Name of the missing manifest field.
        field: &'static str,
    },
}

/// Builds the plugin manifest for `source`.
///
/// Override keys that are not manifest fields are accepted and ignored; they are
/// reported at `warn` level.
///
/// # Errors
///
/// Returns [`BuildError::MissingRequiredField`] for the first required field, in table
/// order, that resolves to no value.
pub fn build_manifest(
    source: &SourceDescriptor,
    overrides: Option<&OverrideMap>,
) -> Result<OutputManifest, BuildError> {
    if let Some(overrides) = overrides {
        warn_unknown_overrides(overrides);
    }

    let mut manifest = OutputManifest::new();

    for rule in fields::table() {
        let value = match overrides.and_then(|overrides| overrides.get(rule.name)) {
            Some(value) => {
                tracing::debug!(field = rule.name, "using override value");
                Some(value.clone())
            }
            None => rule.resolve(source),
        };

        match value {
            Some(value) => manifest.insert(rule.name, value),
            None if rule.required => {
                return Err(BuildError::MissingRequiredField { field: rule.name });
            }
            None => tracing::trace!(field = rule.name, "optional field absent"),
        }
    }

    tracing::debug!(fields = manifest.len(), "built plugin manifest");
    Ok(manifest)
}

fn warn_unknown_overrides(overrides: &OverrideMap) {
    let unknown: Vec<&str> = overrides
        .keys()
        .map(String::as_str)
        .filter(|key| fields::lookup(key).is_none())
        .collect();

    if !unknown.is_empty() {
        tracing::warn!(
            fields = ?unknown,
            "ignoring overrides for fields that are not part of the plugin manifest"
        );
    }
}
