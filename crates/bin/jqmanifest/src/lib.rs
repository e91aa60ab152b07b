//! The `jqmanifest` build step: writes `<name>.jquery.json` for a jQuery plugin.

pub mod cmd;
pub mod ui;
