//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use occu_core::CodeSetId;

use crate::cli::commands::{calc::CalcArgs, factors::FactorsCommands, project::ProjectCommands};

#[derive(Parser)]
#[command(name = "occucalc")]
#[command(author, version, about = "Occupant load calculator")]
#[command(
    long_about = "Calculates building occupant loads (area divided by the occupancy factor, rounded up) \
                  from spreadsheets or project files, with per-code-set factor tables."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Factor override store (default: store.json in the user config directory)
    #[arg(long, global = true, env = "OCCUCALC_STORE")]
    pub store: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the built-in code sets
    Codes,

    /// Show and edit occupancy factors
    #[command(subcommand)]
    Factors(FactorsCommands),

    /// Calculate occupant loads for a spreadsheet or project file
    Calc(CalcArgs),

    /// Create and edit project files
    #[command(subcommand)]
    Project(ProjectCommands),
}

/// clap value parser for code set ids (`IBC_2024`, `EU_Guidance`, ...)
pub fn parse_code_set(s: &str) -> Result<CodeSetId, String> {
    s.parse::<CodeSetId>().map_err(|e| {
        let known = CodeSetId::ALL.iter().map(|c| c.id()).collect::<Vec<_>>().join(", ");
        format!("{e} (expected one of: {known})")
    })
}
