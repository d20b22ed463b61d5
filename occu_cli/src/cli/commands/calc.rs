//! `occucalc calc` command - Calculate occupant loads and export results
//!
//! INPUT is either a spreadsheet (`.xlsx`, `.xls`, `.ods`, `.csv`) whose
//! first sheet is imported as rows, or an `.occ` project file. The project
//! file is not modified.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tracing::info;

use occu_core::calculations::{aggregate, Row, Totals};
use occu_core::file_io::{is_project_path, load_project};
use occu_core::pdf::{render_detailed_pdf, render_summary_pdf, ReportContext};
use occu_core::spreadsheet::{import_rows, write_csv, write_xlsx};
use occu_core::{CodeSetId, FactorTable, Project};

use crate::cli::args::parse_code_set;
use crate::cli::helpers::{open_store, write_export};
use crate::cli::table::{rows_table, totals_table};
use crate::cli::GlobalOpts;

#[derive(Args, Debug)]
pub struct CalcArgs {
    /// Spreadsheet to import, or an .occ project file
    pub input: PathBuf,

    /// Code set (default: the project's, or IBC_2024 for spreadsheets)
    #[arg(long, value_parser = parse_code_set)]
    pub code: Option<CodeSetId>,

    /// Export rows to an .xlsx workbook
    #[arg(long, value_name = "PATH")]
    pub xlsx: Option<PathBuf>,

    /// Export rows to CSV
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Write the summary report PDF
    #[arg(long, value_name = "PATH")]
    pub summary_pdf: Option<PathBuf>,

    /// Write the detailed report PDF
    #[arg(long, value_name = "PATH")]
    pub detailed_pdf: Option<PathBuf>,

    /// Print rows and totals as JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

/// JSON shape printed by `--json`
#[derive(Serialize)]
struct CalcOutput<'a> {
    code_set: CodeSetId,
    rows: &'a [Row],
    totals: &'a Totals,
}

pub fn run(args: CalcArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let (project, table) = load_input(&args.input, args.code, |code| store.active_table(code))?;

    let aggregation = aggregate(&project.rows, &table);
    info!(
        rows = aggregation.rows.len(),
        grand_total = aggregation.totals.grand_total,
        code = project.settings.code_set.id(),
        "calculated occupant loads"
    );

    if args.json {
        let output = CalcOutput {
            code_set: project.settings.code_set,
            rows: &aggregation.rows,
            totals: &aggregation.totals,
        };
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    } else {
        println!(
            "{} ({} rows)",
            style(project.settings.code_set.label()).bold().underlined(),
            aggregation.rows.len()
        );
        println!("{}", rows_table(&aggregation.rows));
        println!("{}", totals_table(&aggregation.totals));
    }

    let context = ReportContext::from_project(&project);
    let mut written = Vec::new();

    if let Some(path) = &args.xlsx {
        write_xlsx(&aggregation.rows, path).into_diagnostic()?;
        written.push(path);
    }
    if let Some(path) = &args.csv {
        write_csv(&aggregation.rows, path).into_diagnostic()?;
        written.push(path);
    }
    if let Some(path) = &args.summary_pdf {
        let bytes = render_summary_pdf(&context, &aggregation.totals).into_diagnostic()?;
        write_export(path, &bytes)?;
        written.push(path);
    }
    if let Some(path) = &args.detailed_pdf {
        let bytes = render_detailed_pdf(&context, &aggregation).into_diagnostic()?;
        write_export(path, &bytes)?;
        written.push(path);
    }

    // Keep stdout clean for --json consumers
    for path in written {
        eprintln!("{} Wrote {}", style("✓").green(), path.display());
    }

    Ok(())
}

/// Load INPUT as a project, normalized against the active table of the
/// requested (or stored) code set.
fn load_input(
    input: &Path,
    code: Option<CodeSetId>,
    active_table: impl Fn(CodeSetId) -> FactorTable,
) -> Result<(Project, FactorTable)> {
    if is_project_path(input) {
        let mut project = load_project(input).into_diagnostic()?;
        let code = code.unwrap_or(project.settings.code_set);
        let table = active_table(code);
        project.set_code_set(code, &table);
        Ok((project, table))
    } else {
        let code = code.unwrap_or_default();
        let table = active_table(code);
        let rows = import_rows(input, &table).into_diagnostic()?;
        Ok((Project::from_rows(rows, code), table))
    }
}
