use clap::Parser as _;
use jqmanifest::cmd;

fn main() {
    // Initialize tracing for debug logs
    monitoring::init();

    if let Err(err) = run() {
        jqmanifest::error!(err);
        std::process::exit(1);
    }
}

/// Generate a jQuery plugin manifest from a package descriptor
#[derive(Debug, clap::Parser)]
#[command(name = "jqmanifest")]
#[command(about = "Generate <name>.jquery.json for the jQuery plugin registry")]
#[command(long_about = include_str!("root__long_about.md"))]
#[command(version)]
struct Cli {
    #[command(flatten)]
    args: cmd::generate::Args,
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cmd::generate::run(cli.args)?;
    Ok(())
}
