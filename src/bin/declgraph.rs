#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{IsTerminal, Write};

use declgraph::cli::args::CliArgs;
use declgraph::cli::driver::{self, EXIT_SUCCESS};
use declgraph::cli::reporter::Reporter;

fn main() -> Result<()> {
    // No-op unless DECLGRAPH_LOG or RUST_LOG is set (see src/tracing_config.rs).
    declgraph::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let result = driver::run(&args, &cwd)?;

    let diagnostics = &result.model.diagnostics;
    if !args.quiet && !diagnostics.is_empty() {
        let color = !args.no_color && std::io::stderr().is_terminal();
        let reporter = Reporter::new(color);
        eprintln!("{}", reporter.render(diagnostics));
        eprintln!();
        eprintln!("{}", reporter.format_summary(diagnostics.len()));
    }

    if result.output.is_none() {
        let json = driver::render_model(&result.model, result.pretty)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{json}").context("failed to write composed model")?;
    }

    let code = result.exit_code();
    if code != EXIT_SUCCESS {
        std::process::exit(code);
    }
    Ok(())
}
