use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the declgraph binary.
#[derive(Parser, Debug, Default)]
#[command(
    name = "declgraph",
    version,
    about = "Compose parsed Swift declarations into a resolved declaration graph"
)]
pub struct CliArgs {
    /// Parse-result JSON files, or directories searched recursively for `*.json`.
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Write the composed model to this file instead of stdout.
    #[arg(short = 'o', long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Path to declgraph.json or a directory containing it.
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Annotate on the calling thread instead of the worker pool.
    #[arg(long)]
    pub serial: bool,

    /// Pretty-print the composed model.
    #[arg(long)]
    pub pretty: bool,

    /// Disable colored diagnostics.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Do not print diagnostics.
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Exit with status 1 when composition produced any diagnostic.
    #[arg(long = "fail-on-warnings")]
    pub fail_on_warnings: bool,
}
