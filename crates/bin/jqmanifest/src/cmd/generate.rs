//! Manifest generation command.
//!
//! Generates a jQuery plugin manifest by:
//! 1. Loading task options from `jquerymanifest.yaml`/`.yml` (or `--options`)
//! 2. Applying `--source` and `--override` on top of the options
//! 3. Loading the package descriptor and building the manifest
//! 4. Writing `<name>.jquery.json` to the output directory (or stdout with `--dry-run`)
//!
//! # Configuration
//!
//! - Project directory: `--dir` flag (default: current directory)
//! - Output directory: `--out` flag or `JQM_OUT` env var (default: current directory)
//! - Logging: `JQM_LOG` env var (`error`, `warn`, `info`, `debug`, `trace`)

use std::{
    io::{self, Write as _},
    path::PathBuf,
};

use monitoring::logging;
use plugin_manifest::{
    ManifestTask,
    options::{self, OptionsLoadError},
    writer::{self, WriteError},
};
use serde_json::Value;

/// Command-line arguments for manifest generation.
#[derive(Debug, clap::Args)]
pub struct Args {
    /// Project directory containing package.json and the optional options file.
    #[arg(long, short = 'd', default_value = ".")]
    pub dir: PathBuf,

    /// Options file, relative to --dir, to use instead of discovering
    /// jquerymanifest.yaml.
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Package descriptor to read, relative to --dir. Replaces the `source` option.
    #[arg(long, short = 's')]
    pub source: Option<PathBuf>,

    /// Manifest field override in the form FIELD=VALUE.
    ///
    /// VALUE is parsed as JSON when it is `null`, `true`, `false`, or starts with `{`,
    /// `[` or `"`; anything else, numbers included, is used as a string so that
    /// `version=1.0` stays `"1.0"`. Takes precedence over overrides from the options
    /// file.
    #[arg(long = "override", short = 'O', value_parser = parse_override)]
    pub overrides: Vec<(String, Value)>,

    /// Directory receiving <name>.jquery.json.
    #[arg(long, short = 'o', env = "JQM_OUT", default_value = ".")]
    pub out: PathBuf,

    /// Print the manifest to stdout instead of writing it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Generates the manifest described by `args`.
///
/// # Errors
///
/// Returns [`Error`] for an invalid project directory, options errors, descriptor
/// or build failures, and write failures.
#[tracing::instrument(skip_all, fields(dir = %args.dir.display()))]
pub fn run(args: Args) -> Result<(), Error> {
    let Args {
        dir,
        options: options_path,
        source,
        overrides,
        out,
        dry_run,
    } = args;

    if !dir.is_dir() {
        return Err(Error::InvalidDirectory { path: dir });
    }

    let mut opts = match options_path {
        Some(path) => options::load_from_path(&dir.join(path))?,
        None => options::load_from_dir(&dir)?.1,
    };
    if let Some(source) = source {
        opts.set_source_path(source);
    }
    for (field, value) in overrides {
        opts.set_override(field, value);
    }

    let mut task = ManifestTask::new(&opts, &dir);

    if dry_run {
        let manifest = task.output_values().inspect_err(log_failure)?;
        writer::manifest_file_name(manifest)
            .map_err(plugin_manifest::Error::WriteFailure)
            .inspect_err(log_failure)?;
        let json = writer::render_manifest(manifest).map_err(Error::Render)?;
        io::stdout()
            .lock()
            .write_all(json.as_bytes())
            .map_err(Error::Stdout)?;
        return Ok(());
    }

    let path = task.write_manifest(&out).inspect_err(log_failure)?;
    crate::success!("Wrote {}", path.display());

    Ok(())
}

fn log_failure(err: &plugin_manifest::Error) {
    tracing::warn!(
        error = %err,
        error_source = %logging::error_source(err),
        "manifest generation failed"
    );
}

/// Parse a FIELD=VALUE string into a field name and JSON value.
fn parse_override(s: &str) -> Result<(String, Value), String> {
    let (field, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid override format: expected FIELD=VALUE, got '{s}'"))?;
    if field.is_empty() {
        return Err(format!("invalid override '{s}': field name must not be empty"));
    }

    let value = match raw {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ if raw.starts_with(['{', '[', '"']) => serde_json::from_str(raw)
            .map_err(|err| format!("invalid JSON value for override '{field}': {err}"))?,
        _ => Value::String(raw.to_string()),
    };

    Ok((field.to_string(), value))
}

/// Errors that occur during manifest generation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid directory specified.
    #[error("not a directory: {}", path.display())]
    InvalidDirectory { path: PathBuf },

    /// Failed to locate, read, or parse the options file.
    #[error(transparent)]
    OptionsLoad(#[from] OptionsLoadError),

    /// Loading, building, or writing the manifest failed.
    #[error(transparent)]
    Run(#[from] plugin_manifest::Error),

    /// Failed to render the manifest for `--dry-run`.
    #[error("failed to render manifest")]
    Render(#[source] WriteError),

    /// Failed to print the manifest for `--dry-run`.
    #[error("failed to write manifest to stdout")]
    Stdout(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn args(dir: &Path, out: &Path) -> Args {
        Args {
            dir: dir.to_path_buf(),
            options: None,
            source: None,
            overrides: vec![],
            out: out.to_path_buf(),
            dry_run: false,
        }
    }

    fn write_package_json(dir: &Path, value: Value) {
        fs::write(
            dir.join("package.json"),
            serde_json::to_string(&value).expect("serialize"),
        )
        .expect("should write package.json");
    }

    #[test]
    fn parse_override_keeps_plain_values_as_strings() {
        //* When
        let version = parse_override("version=1.0");
        let flag = parse_override("homepage=https://example.com/a=b");

        //* Then
        assert_eq!(
            version.expect("valid override"),
            ("version".to_string(), json!("1.0"))
        );
        assert_eq!(
            flag.expect("valid override"),
            ("homepage".to_string(), json!("https://example.com/a=b"))
        );
    }

    #[test]
    fn parse_override_reads_json_values() {
        //* When
        let result = parse_override(r#"author={"name":"Jane Doe"}"#);

        //* Then
        assert_eq!(
            result.expect("valid override"),
            ("author".to_string(), json!({ "name": "Jane Doe" }))
        );
    }

    #[test]
    fn parse_override_reads_null_and_boolean_literals() {
        //* When
        let homepage = parse_override("homepage=null");
        let demo = parse_override("demo=true");
        let docs = parse_override("docs=2.5");

        //* Then
        assert_eq!(
            homepage.expect("valid override"),
            ("homepage".to_string(), Value::Null)
        );
        assert_eq!(demo.expect("valid override"), ("demo".to_string(), json!(true)));
        assert_eq!(docs.expect("valid override"), ("docs".to_string(), json!("2.5")));
    }

    #[test]
    fn parse_override_rejects_malformed_input() {
        //* Then
        assert!(parse_override("version").is_err());
        assert!(parse_override("=1.0").is_err());
        assert!(parse_override("keywords=[ui").is_err());
    }

    #[test]
    fn run_writes_manifest_with_cli_overrides() {
        //* Given
        let project = TempDir::new().expect("should create project dir");
        let out = TempDir::new().expect("should create output dir");
        write_package_json(
            project.path(),
            json!({ "name": "slider", "version": "1.0.0", "author": "Jane", "license": "MIT" }),
        );
        fs::write(
            project.path().join("jquerymanifest.yaml"),
            "overrides:\n  version: 2.0.0\n",
        )
        .expect("should write options");
        let mut args = args(project.path(), out.path());
        args.overrides = vec![("version".to_string(), json!("3.0.0"))];

        //* When
        let result = run(args);

        //* Then
        result.expect("run should succeed");
        let written: Value = serde_json::from_str(
            &fs::read_to_string(out.path().join("slider.jquery.json")).expect("read manifest"),
        )
        .expect("valid JSON");
        assert_eq!(written["version"], json!("3.0.0"));
    }

    #[test]
    fn run_with_explicit_source_and_options_file() {
        //* Given
        let project = TempDir::new().expect("should create project dir");
        fs::write(
            project.path().join("plugin.json"),
            r#"{ "name": "tabs", "version": "0.1.0", "author": "Jane", "license": "MIT" }"#,
        )
        .expect("should write descriptor");
        fs::write(project.path().join("custom.yaml"), "overrides:\n  docs: docs/\n")
            .expect("should write options");
        let mut args = args(project.path(), project.path());
        args.options = Some(PathBuf::from("custom.yaml"));
        args.source = Some(PathBuf::from("plugin.json"));

        //* When
        let result = run(args);

        //* Then
        result.expect("run should succeed");
        let written: Value = serde_json::from_str(
            &fs::read_to_string(project.path().join("tabs.jquery.json")).expect("read manifest"),
        )
        .expect("valid JSON");
        assert_eq!(written["docs"], json!("docs/"));
    }

    #[test]
    fn dry_run_writes_no_file() {
        //* Given
        let project = TempDir::new().expect("should create project dir");
        write_package_json(
            project.path(),
            json!({ "name": "slider", "version": "1.0.0", "author": "Jane", "license": "MIT" }),
        );
        let mut args = args(project.path(), project.path());
        args.dry_run = true;

        //* When
        let result = run(args);

        //* Then
        result.expect("dry run should succeed");
        assert!(!project.path().join("slider.jquery.json").exists());
    }

    #[test]
    fn dry_run_rejects_unusable_manifest_name() {
        //* Given
        let project = TempDir::new().expect("should create project dir");
        write_package_json(
            project.path(),
            json!({ "name": "../escape", "version": "1.0.0", "author": "Jane", "license": "MIT" }),
        );
        let mut args = args(project.path(), project.path());
        args.dry_run = true;

        //* When
        let result = run(args);

        //* Then
        let err = result.expect_err("dry run should reject the name like a real run");
        assert!(
            matches!(
                err,
                Error::Run(plugin_manifest::Error::WriteFailure(WriteError::InvalidName { .. }))
            ),
            "unexpected error: {err:?}"
        );
        assert_eq!(err.to_string(), "failed to write manifest");
    }

    #[test]
    fn options_path_resolves_against_project_dir() {
        //* Given
        let project = TempDir::new().expect("should create project dir");
        fs::create_dir(project.path().join("conf")).expect("should create conf dir");
        write_package_json(
            project.path(),
            json!({ "name": "slider", "version": "1.0.0", "author": "Jane", "license": "MIT" }),
        );
        fs::write(project.path().join("conf/jqm.yaml"), "overrides:\n  docs: docs/\n")
            .expect("should write options");
        let mut args = args(project.path(), project.path());
        args.options = Some(PathBuf::from("conf/jqm.yaml"));

        //* When
        let result = run(args);

        //* Then
        result.expect("run should succeed");
        let written: Value = serde_json::from_str(
            &fs::read_to_string(project.path().join("slider.jquery.json")).expect("read manifest"),
        )
        .expect("valid JSON");
        assert_eq!(written["docs"], json!("docs/"));
    }

    #[test]
    fn run_rejects_missing_directory() {
        //* Given
        let project = TempDir::new().expect("should create project dir");
        let missing = project.path().join("missing");

        //* When
        let result = run(args(&missing, project.path()));

        //* Then
        assert!(matches!(result, Err(Error::InvalidDirectory { .. })));
    }

    #[test]
    fn run_reports_missing_required_field() {
        //* Given
        let project = TempDir::new().expect("should create project dir");
        write_package_json(
            project.path(),
            json!({ "name": "slider", "author": "Jane", "license": "MIT" }),
        );

        //* When
        let result = run(args(project.path(), project.path()));

        //* Then
        let err = result.expect_err("run should fail without version");
        assert_eq!(err.to_string(), "missing required field: `version`");
    }
}
