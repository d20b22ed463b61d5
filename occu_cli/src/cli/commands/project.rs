//! `occucalc project` command - Create and edit `.occ` project files
//!
//! Each subcommand loads the project, applies one change against the active
//! factor table of the project's code set, and saves it back atomically.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use miette::{IntoDiagnostic, Result};

use occu_core::file_io::{load_project, save_project};
use occu_core::store::{JsonFileStore, OverrideStore};
use occu_core::{CodeSetId, OccuError, Project, RowEdit};

use crate::cli::args::parse_code_set;
use crate::cli::helpers::open_store;
use crate::cli::table::{grand_total_line, rows_table};
use crate::cli::GlobalOpts;

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a new project file with one blank row
    New {
        /// Project file to create (.occ)
        path: PathBuf,

        /// Code set (default: IBC_2024)
        #[arg(long, value_parser = parse_code_set)]
        code: Option<CodeSetId>,

        /// Name of the person preparing the schedule
        #[arg(long, default_value = "")]
        prepared_by: String,

        /// Job or project number
        #[arg(long, default_value = "")]
        job_id: String,

        /// Building or tenancy name
        #[arg(long, default_value = "")]
        building: String,
    },

    /// Append a row (blank unless fields are given)
    Add {
        /// Project file (.occ)
        path: PathBuf,

        #[command(flatten)]
        fields: RowFields,
    },

    /// Edit a row by id
    Edit {
        /// Project file (.occ)
        path: PathBuf,

        /// Row id
        id: u32,

        #[command(flatten)]
        fields: RowFields,
    },

    /// Remove a row by id
    Remove {
        /// Project file (.occ)
        path: PathBuf,

        /// Row id
        id: u32,
    },

    /// Remove all rows
    Clear {
        /// Project file (.occ)
        path: PathBuf,

        /// Leave a single blank starter row instead of an empty table
        #[arg(long)]
        reset: bool,
    },

    /// Switch the project's code set and re-evaluate every row
    Code {
        /// Project file (.occ)
        path: PathBuf,

        /// New code set id
        #[arg(value_parser = parse_code_set)]
        code: CodeSetId,
    },
}

/// Row fields settable from the command line
#[derive(Args, Debug, Default)]
pub struct RowFields {
    /// Room number
    #[arg(long)]
    pub number: Option<String>,

    /// Room name
    #[arg(long)]
    pub name: Option<String>,

    /// Area in m² (free text; unparseable values count as zero)
    #[arg(long, allow_hyphen_values = true)]
    pub area: Option<String>,

    /// Occupancy type (unknown types fall back to the default type)
    #[arg(long = "type")]
    pub occupancy_type: Option<String>,
}

impl RowFields {
    fn into_edit(self) -> RowEdit {
        RowEdit {
            number: self.number,
            name: self.name,
            area: self.area,
            occupancy_type: self.occupancy_type,
        }
    }
}

pub fn run(cmd: ProjectCommands, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    match cmd {
        ProjectCommands::New {
            path,
            code,
            prepared_by,
            job_id,
            building,
        } => run_new(&path, code, &prepared_by, &job_id, &building, &store),
        ProjectCommands::Add { path, fields } => run_add(&path, fields, &store),
        ProjectCommands::Edit { path, id, fields } => run_edit(&path, id, fields, &store),
        ProjectCommands::Remove { path, id } => run_remove(&path, id, &store),
        ProjectCommands::Clear { path, reset } => run_clear(&path, reset, &store),
        ProjectCommands::Code { path, code } => run_code(&path, code, &store),
    }
}

fn run_new(
    path: &Path,
    code: Option<CodeSetId>,
    prepared_by: &str,
    job_id: &str,
    building: &str,
    store: &OverrideStore<JsonFileStore>,
) -> Result<()> {
    if path.exists() {
        return Err(miette::miette!("{} already exists", path.display()));
    }

    let mut project = Project::new(prepared_by, job_id, building);
    let code = code.unwrap_or_default();
    project.set_code_set(code, &store.active_table(code));
    save_project(&project, path).into_diagnostic()?;

    println!(
        "{} Created {} ({})",
        style("✓").green(),
        style(path.display()).cyan(),
        code.label()
    );
    Ok(())
}

fn run_add(path: &Path, fields: RowFields, store: &OverrideStore<JsonFileStore>) -> Result<()> {
    let mut project = load_project(path).into_diagnostic()?;
    let table = store.active_table(project.settings.code_set);

    let id = project.add_row(&table);
    let edit = fields.into_edit();
    if !edit.is_empty() {
        project.update_row(id, edit, &table).into_diagnostic()?;
    }
    let totals = project.recompute(&table);
    save_project(&project, path).into_diagnostic()?;

    println!("{} Added row {}", style("✓").green(), style(id).cyan());
    println!("{}", grand_total_line(&totals));
    Ok(())
}

fn run_edit(path: &Path, id: u32, fields: RowFields, store: &OverrideStore<JsonFileStore>) -> Result<()> {
    let edit = fields.into_edit();
    if edit.is_empty() {
        return Err(miette::miette!(
            "Nothing to change; pass --number, --name, --area or --type"
        ));
    }

    let mut project = load_project(path).into_diagnostic()?;
    let table = store.active_table(project.settings.code_set);

    let row = project.update_row(id, edit, &table).into_diagnostic()?.clone();
    let totals = project.recompute(&table);
    save_project(&project, path).into_diagnostic()?;

    println!("{} Updated row {}", style("✓").green(), style(id).cyan());
    println!("{}", rows_table(std::slice::from_ref(&row)));
    println!("{}", grand_total_line(&totals));
    Ok(())
}

fn run_remove(path: &Path, id: u32, store: &OverrideStore<JsonFileStore>) -> Result<()> {
    let mut project = load_project(path).into_diagnostic()?;
    let table = store.active_table(project.settings.code_set);

    project
        .remove_row(id)
        .ok_or(OccuError::RowNotFound { id })
        .into_diagnostic()?;
    let totals = project.recompute(&table);
    save_project(&project, path).into_diagnostic()?;

    println!("{} Removed row {}", style("✓").green(), style(id).cyan());
    println!("{}", grand_total_line(&totals));
    Ok(())
}

fn run_clear(path: &Path, reset: bool, store: &OverrideStore<JsonFileStore>) -> Result<()> {
    let mut project = load_project(path).into_diagnostic()?;
    let table = store.active_table(project.settings.code_set);

    if reset {
        project.reset_rows(&table);
    } else {
        project.clear_rows();
    }
    save_project(&project, path).into_diagnostic()?;

    println!(
        "{} Cleared {} ({} rows left)",
        style("✓").green(),
        style(path.display()).cyan(),
        project.row_count()
    );
    Ok(())
}

fn run_code(path: &Path, code: CodeSetId, store: &OverrideStore<JsonFileStore>) -> Result<()> {
    let mut project = load_project(path).into_diagnostic()?;

    let totals = project.set_code_set(code, &store.active_table(code));
    save_project(&project, path).into_diagnostic()?;

    println!("{} Switched to {}", style("✓").green(), style(code.label()).cyan());
    println!("{}", grand_total_line(&totals));
    Ok(())
}
