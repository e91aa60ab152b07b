//! jQuery plugin manifest generation.
//!
//! Derives a `<name>.jquery.json` plugin registry manifest from a package descriptor
//! (normally `package.json`):
//!
//! - **Field rules**: required/optional manifest fields and their transformations ([`fields`])
//! - **Descriptor loading**: path, inline, or default `package.json` source ([`source`])
//! - **Manifest building**: overrides, mappings, and required-field checks ([`builder`])
//! - **Manifest output**: 2-space indented JSON file writing ([`writer`])
//! - **Task options**: `jquerymanifest.yaml` parsing ([`options`])
//! - **Runs**: load-once orchestration of the steps above ([`task`])
//!
//! ## Workflow
//!
//! 1. Load task options (`source`, `overrides`)
//! 2. Load the package descriptor
//! 3. Build the manifest from the field table
//! 4. Write `<name>.jquery.json`
//!
//! ```no_run
//! use std::path::Path;
//!
//! use plugin_manifest::{ManifestTask, options};
//!
//! let (_, opts) = options::load_from_dir(Path::new("."))?;
//! let path = ManifestTask::new(&opts, ".").write_manifest(Path::new("."))?;
//! println!("wrote {}", path.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod fields;
pub mod manifest;
pub mod options;
pub mod source;
pub mod task;
pub mod writer;

pub use self::{
    manifest::{OutputManifest, OverrideMap},
    options::ManifestOptions,
    source::SourceDescriptor,
    task::{Error, ManifestTask},
};
