//! A set of utilities to enable logging configuration using tracing_subscriber.

use std::{error::Error, io::IsTerminal, sync::Once};

use tracing_subscriber::{
    EnvFilter,
    filter::{Directive, LevelFilter},
};

static JQM_LOG_ENV_VAR: &str = "JQM_LOG";

/// Log level applied to the workspace crates when `JQM_LOG` is unset.
const DEFAULT_LOG_LEVEL: &str = "info";

/// Initializes a tracing subscriber for logging.
///
/// Events are written to stderr so that stdout stays free for command output
/// (e.g. a `--dry-run` manifest).
pub fn init() {
    // Since we also use this function to enable logging in tests, wrap it in `Once` to prevent
    // multiple initializations.
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let (env_filter, log_level) = env_filter_and_log_level();

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .init();

        tracing::debug!("log level: {}", log_level);
    });
}

/// List of crates in the workspace.
const JQM_CRATES: &[&str] = &["jqmanifest", "monitoring", "plugin_manifest"];

fn env_filter_and_log_level() -> (EnvFilter, String) {
    let directive_string = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let log_level =
        std::env::var(JQM_LOG_ENV_VAR).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

    (build_env_filter(&directive_string, &log_level), log_level)
}

/// Parses `RUST_LOG`-style directives and adds a `<crate>=<level>` directive for every
/// workspace crate the directives do not already mention.
///
/// Invalid directives are skipped rather than aborting logging setup.
fn build_env_filter(directive_string: &str, log_level: &str) -> EnvFilter {
    let mut env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::ERROR.into())
        .parse_lossy(directive_string);

    for crate_name in JQM_CRATES {
        if directive_string.contains(&format!("{crate_name}=")) {
            continue;
        }
        if let Ok(directive) = format!("{crate_name}={log_level}").parse::<Directive>() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    env_filter
}

/// Renders the cause chain of an error (excluding the error itself) for use as a
/// structured log field.
///
/// Causes are joined with ` -> `. Returns an empty string when the error has no source.
///
/// ```
/// # use std::io;
/// let err = io::Error::other("disk full");
/// assert_eq!(monitoring::logging::error_source(&err), "");
/// ```
pub fn error_source(err: &dyn Error) -> String {
    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    causes.join(" -> ")
}
