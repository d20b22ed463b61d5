//! `occucalc factors` command - Show and edit occupancy factors
//!
//! Edits are stored per code set in the override store and apply to every
//! later calculation against that code set. Base types can be re-valued but
//! not deleted; types added here can be deleted again.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use occu_core::factors::overrides::NEW_TYPE_FACTOR;
use occu_core::{CodeSetId, OccuError};

use crate::cli::args::parse_code_set;
use crate::cli::helpers::open_store;
use crate::cli::GlobalOpts;

#[derive(Subcommand, Debug)]
pub enum FactorsCommands {
    /// Show the active factor table
    Show {
        /// Code set (default: IBC_2024)
        #[arg(long, value_parser = parse_code_set, default_value_t = CodeSetId::default())]
        code: CodeSetId,
    },

    /// Set the factor (m² per person) for an occupancy type
    Set {
        /// Occupancy type
        occupancy_type: String,

        /// Area per occupant in m² (must be > 0)
        #[arg(allow_negative_numbers = true)]
        factor: f64,

        /// Code set (default: IBC_2024)
        #[arg(long, value_parser = parse_code_set, default_value_t = CodeSetId::default())]
        code: CodeSetId,
    },

    /// Add a new occupancy type (starts at 10 m² per person)
    Add {
        /// Name of the new type
        name: String,

        /// Code set (default: IBC_2024)
        #[arg(long, value_parser = parse_code_set, default_value_t = CodeSetId::default())]
        code: CodeSetId,
    },

    /// Delete a user-added occupancy type
    Delete {
        /// Occupancy type
        occupancy_type: String,

        /// Code set (default: IBC_2024)
        #[arg(long, value_parser = parse_code_set, default_value_t = CodeSetId::default())]
        code: CodeSetId,
    },

    /// Drop all overrides for a code set
    Reset {
        /// Code set (default: IBC_2024)
        #[arg(long, value_parser = parse_code_set, default_value_t = CodeSetId::default())]
        code: CodeSetId,
    },
}

pub fn run(cmd: FactorsCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        FactorsCommands::Show { code } => run_show(code, global),
        FactorsCommands::Set {
            occupancy_type,
            factor,
            code,
        } => run_set(code, &occupancy_type, factor, global),
        FactorsCommands::Add { name, code } => run_add(code, &name, global),
        FactorsCommands::Delete { occupancy_type, code } => run_delete(code, &occupancy_type, global),
        FactorsCommands::Reset { code } => run_reset(code, global),
    }
}

fn run_show(code: CodeSetId, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let table = store.active_table(code);

    println!("{}", style(code.label()).bold().underlined());

    let mut builder = Builder::default();
    builder.push_record(["Occupancy Type", "Factor (m²/person)", ""]);
    for entry in table.entries() {
        let marker = if store.overrides().is_custom_type(code, &entry.occupancy_type) {
            "custom"
        } else {
            ""
        };
        builder.push_record([
            entry.occupancy_type.clone(),
            format_factor(entry.factor),
            marker.to_string(),
        ]);
    }
    let mut rendered = builder.build();
    rendered.with(Style::rounded());
    println!("{rendered}");
    Ok(())
}

fn run_set(code: CodeSetId, occupancy_type: &str, factor: f64, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let occupancy_type = occupancy_type.trim();

    if !store.active_table(code).contains(occupancy_type) {
        return Err(OccuError::invalid_input(
            "occupancy_type",
            occupancy_type,
            format!("not defined for {}; add it with `factors add` first", code.id()),
        ))
        .into_diagnostic();
    }

    if !store.set_factor(code, occupancy_type, factor).into_diagnostic()? {
        return Err(OccuError::invalid_input(
            "factor",
            factor.to_string(),
            "must be a finite number greater than zero",
        ))
        .into_diagnostic();
    }

    println!(
        "{} {} {} {} m²/person ({})",
        style("✓").green(),
        style(occupancy_type).cyan(),
        style("→").dim(),
        format_factor(factor),
        code.id()
    );
    Ok(())
}

fn run_add(code: CodeSetId, name: &str, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;

    if !store.add_type(code, name).into_diagnostic()? {
        return Err(OccuError::invalid_input(
            "name",
            name,
            "name is empty or the type already exists",
        ))
        .into_diagnostic();
    }

    println!(
        "{} Added {} at {} m²/person ({})",
        style("✓").green(),
        style(name.trim()).cyan(),
        format_factor(NEW_TYPE_FACTOR),
        code.id()
    );
    Ok(())
}

fn run_delete(code: CodeSetId, occupancy_type: &str, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;

    if !store.delete_type(code, occupancy_type).into_diagnostic()? {
        let reason = if code.is_base_type(occupancy_type) {
            "built-in types cannot be deleted"
        } else {
            "no such user-added type"
        };
        return Err(OccuError::invalid_input("occupancy_type", occupancy_type, reason)).into_diagnostic();
    }

    println!(
        "{} Deleted {} ({})",
        style("✓").green(),
        style(occupancy_type).cyan(),
        code.id()
    );
    Ok(())
}

fn run_reset(code: CodeSetId, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;

    if store.reset(code).into_diagnostic()? {
        println!("{} Reset {} to its built-in factors", style("✓").green(), code.id());
    } else {
        println!("{} {} has no overrides", style("·").dim(), code.id());
    }
    Ok(())
}

/// `2.8`, `28`, `0.65`: no trailing zeros
fn format_factor(factor: f64) -> String {
    let text = format!("{factor:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_factor() {
        assert_eq!(format_factor(2.8), "2.8");
        assert_eq!(format_factor(28.0), "28");
        assert_eq!(format_factor(9.3), "9.3");
        assert_eq!(format_factor(0.65), "0.65");
    }
}
