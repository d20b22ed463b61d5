//! # OccuCalc CLI
//!
//! Command-line front end for `occu_core`: list code sets, edit factor
//! overrides, calculate occupant loads for spreadsheets or project files,
//! and export the results.

use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    let global = cli.global;

    match cli.command {
        Commands::Codes => cli::commands::codes::run(),
        Commands::Factors(cmd) => cli::commands::factors::run(cmd, &global),
        Commands::Calc(args) => cli::commands::calc::run(args, &global),
        Commands::Project(cmd) => cli::commands::project::run(cmd, &global),
    }
}

/// Log to stderr. `-v` flags win over `RUST_LOG`; the default is `warn`.
fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
