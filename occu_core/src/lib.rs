//! # occu_core - Occupant Load Calculation Engine
//!
//! `occu_core` computes occupant loads for a list of spaces: each space's
//! area is divided by the density factor (m² per person) of its occupancy
//! type and rounded up, then loads are totalled per type.
//!
//! ## Design Philosophy
//!
//! - **Permissive engine**: malformed areas count as zero occupants and
//!   unknown types fall back to the table's default type; the engine never
//!   returns an error
//! - **Explicit recomputation**: rows and factor tables are plain data, and
//!   [`calculations::aggregate`] is called after every change
//! - **JSON-First**: projects, overrides and errors all serialize with serde
//!
//! ## Quick Start
//!
//! ```rust
//! use occu_core::calculations::{aggregate, Row};
//! use occu_core::factors::{CodeSetId, FactorOverrides};
//!
//! let overrides = FactorOverrides::default();
//! let table = overrides.active_table(CodeSetId::Ibc2024);
//!
//! let rows = vec![
//!     Row::new(1, "101", "Shop", "6", "Retail"),
//!     Row::new(2, "102", "Cafe", "4.2", "Restaurant"),
//! ];
//! let result = aggregate(&rows, &table);
//! assert_eq!(result.totals.grand_total, 6);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - The occupant load engine
//! - [`factors`] - Code sets, factor tables and user overrides
//! - [`store`] - Persistence of factor overrides in a key-value store
//! - [`project`] - Project container, rows and settings
//! - [`file_io`] - Project files with atomic saves
//! - [`spreadsheet`] - Spreadsheet/CSV import and export
//! - [`pdf`] - Summary and detailed PDF reports
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod errors;
pub mod factors;
pub mod file_io;
pub mod pdf;
pub mod project;
pub mod spreadsheet;
pub mod store;

// Re-export commonly used types at crate root for convenience
pub use calculations::{aggregate, compute_load, Aggregation, Row, Totals};
pub use errors::{OccuError, OccuResult};
pub use factors::{CodeSetId, FactorOverrides, FactorTable};
pub use file_io::{load_project, save_project};
pub use project::{Project, ProjectMetadata, ProjectSettings, RowEdit};
