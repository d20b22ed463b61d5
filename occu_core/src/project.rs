//! # Project Data Structures
//!
//! A `Project` is the unit a user edits and saves: a list of spaces (rows),
//! the code set they are evaluated against, and some header information for
//! reports. Projects serialize to `.occ` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (version, preparer, job info, timestamps)
//! ├── settings: ProjectSettings (active code set)
//! └── rows: Vec<Row> (one per space, in display order)
//! ```
//!
//! Row loads are derived. Every mutating method that takes a
//! [`FactorTable`] leaves the rows normalized against it; call
//! [`Project::recompute`] after switching tables by other means.
//!
//! ## Example
//!
//! ```rust
//! use occu_core::factors::{CodeSetId, FactorTable};
//! use occu_core::project::{Project, RowEdit};
//!
//! let table = FactorTable::for_code_set(CodeSetId::Ibc2024);
//! let mut project = Project::new("J. Planner", "25-114", "Harbour Mall");
//!
//! project.update_row(1, RowEdit::area("56"), &table).unwrap();
//! let id = project.add_row(&table);
//! project.update_row(id, RowEdit::area("14").with_type("Restaurant"), &table).unwrap();
//!
//! let totals = project.recompute(&table);
//! assert_eq!(totals.grand_total, 20 + 10);
//! ```

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calculations::{aggregate, Row, Totals};
use crate::errors::{OccuError, OccuResult};
use crate::factors::{CodeSetId, FactorTable};

/// Current schema version for .occ files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project metadata (version, preparer, job info)
    pub meta: ProjectMetadata,

    /// Project-wide settings
    pub settings: ProjectSettings,

    /// Spaces in display order
    pub rows: Vec<Row>,
}

impl Project {
    /// Create a project holding a single blank starter row.
    ///
    /// # Example
    ///
    /// ```rust
    /// use occu_core::project::Project;
    ///
    /// let project = Project::new("J. Planner", "25-114", "Harbour Mall");
    /// assert_eq!(project.rows.len(), 1);
    /// assert_eq!(project.rows[0].name, "Space 1");
    /// ```
    pub fn new(prepared_by: impl Into<String>, job_id: impl Into<String>, building: impl Into<String>) -> Self {
        let now = Utc::now();
        let settings = ProjectSettings::default();
        let table = FactorTable::for_code_set(settings.code_set);
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                prepared_by: prepared_by.into(),
                job_id: job_id.into(),
                building: building.into(),
                created: now,
                modified: now,
            },
            settings,
            rows: vec![starter_row(1, &table)],
        }
    }

    /// Create a project around rows read from elsewhere (e.g. a spreadsheet).
    pub fn from_rows(rows: Vec<Row>, code_set: CodeSetId) -> Self {
        let mut project = Project::new("", "", "");
        project.settings.code_set = code_set;
        project.rows = rows;
        project
    }

    /// Append a blank row and return its id (max id + 1, or 1 when empty).
    ///
    /// If the largest id is already `u32::MAX`, the lowest unused id is taken.
    pub fn add_row(&mut self, table: &FactorTable) -> u32 {
        let id = self.next_row_id();
        self.rows.push(starter_row(id, table));
        self.touch();
        id
    }

    fn next_row_id(&self) -> u32 {
        match self.rows.iter().map(|r| r.id).max() {
            None => 1,
            Some(max) => max.checked_add(1).unwrap_or_else(|| {
                let used: BTreeSet<u32> = self.rows.iter().map(|r| r.id).collect();
                (1..u32::MAX).find(|id| !used.contains(id)).unwrap_or(0)
            }),
        }
    }

    /// Remove a row by id. Returns the removed row if it existed.
    pub fn remove_row(&mut self, id: u32) -> Option<Row> {
        let index = self.rows.iter().position(|r| r.id == id)?;
        let row = self.rows.remove(index);
        self.touch();
        Some(row)
    }

    /// Get a row by id.
    pub fn get_row(&self, id: u32) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Apply an edit to one row, normalizing its type and refreshing its load.
    pub fn update_row(&mut self, id: u32, edit: RowEdit, table: &FactorTable) -> OccuResult<&Row> {
        let index = self
            .rows
            .iter()
            .position(|r| r.id == id)
            .ok_or(OccuError::RowNotFound { id })?;

        let row = &mut self.rows[index];
        edit.apply(row);
        row.refresh(table);
        self.touch();
        Ok(&self.rows[index])
    }

    /// Remove every row.
    pub fn clear_rows(&mut self) {
        self.rows.clear();
        self.touch();
    }

    /// Replace all rows with a single blank starter row.
    pub fn reset_rows(&mut self, table: &FactorTable) {
        self.rows = vec![starter_row(1, table)];
        self.touch();
    }

    /// Switch to another code set and re-evaluate every row against `table`,
    /// which should be that code set's active table.
    pub fn set_code_set(&mut self, code_set: CodeSetId, table: &FactorTable) -> Totals {
        self.settings.code_set = code_set;
        self.touch();
        self.recompute(table)
    }

    /// Refresh every row against `table` and return the totals.
    pub fn recompute(&mut self, table: &FactorTable) -> Totals {
        let result = aggregate(&self.rows, table);
        self.rows = result.rows;
        result.totals
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", "")
    }
}

fn starter_row(id: u32, table: &FactorTable) -> Row {
    Row::new(id, id.to_string(), format!("Space {id}"), "", table.default_type())
}

/// A partial update to a row. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowEdit {
    pub number: Option<String>,
    pub name: Option<String>,
    pub area: Option<String>,
    pub occupancy_type: Option<String>,
}

impl RowEdit {
    pub fn area(area: impl Into<String>) -> Self {
        RowEdit {
            area: Some(area.into()),
            ..Default::default()
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    pub fn with_type(mut self, occupancy_type: impl Into<String>) -> Self {
        self.occupancy_type = Some(occupancy_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.number.is_none() && self.name.is_none() && self.area.is_none() && self.occupancy_type.is_none()
    }

    fn apply(self, row: &mut Row) {
        if let Some(number) = self.number {
            row.number = number;
        }
        if let Some(name) = self.name {
            row.name = name;
        }
        if let Some(area) = self.area {
            row.area = area;
        }
        if let Some(occupancy_type) = self.occupancy_type {
            row.occupancy_type = occupancy_type;
        }
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Who prepared the occupant load schedule
    pub prepared_by: String,

    /// Job/project number
    pub job_id: String,

    /// Building or tenancy name
    pub building: String,

    /// When the project was created
    pub created: DateTime<Utc>,

    /// When the project was last modified
    pub modified: DateTime<Utc>,
}

/// Project-wide settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Code set whose factor table the rows are evaluated against
    pub code_set: CodeSetId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ibc() -> FactorTable {
        FactorTable::for_code_set(CodeSetId::Ibc2024)
    }

    #[test]
    fn test_project_creation() {
        let project = Project::new("Jane", "25-001", "Depot");
        assert_eq!(project.meta.prepared_by, "Jane");
        assert_eq!(project.meta.version, SCHEMA_VERSION);
        assert_eq!(project.settings.code_set, CodeSetId::Ibc2024);

        let row = &project.rows[0];
        assert_eq!((row.id, row.number.as_str(), row.name.as_str()), (1, "1", "Space 1"));
        assert_eq!(row.area, "");
        assert_eq!(row.occupancy_type, "Retail");
    }

    #[test]
    fn test_add_row_uses_next_id() {
        let mut project = Project::default();
        let table = ibc();
        assert_eq!(project.add_row(&table), 2);
        project.remove_row(1);
        assert_eq!(project.add_row(&table), 3);

        project.clear_rows();
        assert_eq!(project.add_row(&table), 1);
        assert_eq!(project.rows[0].name, "Space 1");
    }

    #[test]
    fn test_update_row_normalizes_type() {
        let mut project = Project::default();
        let table = ibc();
        let row = project
            .update_row(1, RowEdit::area("14").with_type("Ballroom").with_name("Hall"), &table)
            .unwrap();
        assert_eq!(row.occupancy_type, "Retail");
        assert_eq!(row.name, "Hall");
        assert_eq!(row.occupant_load, 5);
    }

    #[test]
    fn test_add_row_after_max_id() {
        let mut project = Project::default();
        let table = ibc();
        project.rows.push(Row::new(u32::MAX, "X", "Imported", "10", "Retail"));

        assert_eq!(project.add_row(&table), 2);
        assert_eq!(project.add_row(&table), 3);
        assert_eq!(project.row_count(), 4);
    }

    #[test]
    fn test_update_row_touches_modified() {
        let mut project = Project::default();
        let stale = project.meta.created - chrono::Duration::days(1);
        project.meta.modified = stale;

        project.update_row(1, RowEdit::area("5"), &ibc()).unwrap();
        assert!(project.meta.modified > stale);
    }

    #[test]
    fn test_update_missing_row() {
        let mut project = Project::default();
        let err = project.update_row(42, RowEdit::area("1"), &ibc()).unwrap_err();
        assert_eq!(err, OccuError::RowNotFound { id: 42 });
    }

    #[test]
    fn test_reset_rows() {
        let mut project = Project::default();
        let table = ibc();
        project.add_row(&table);
        project.add_row(&table);
        project.reset_rows(&table);
        assert_eq!(project.row_count(), 1);
        assert_eq!(project.rows[0].id, 1);
    }

    #[test]
    fn test_set_code_set_renormalizes() {
        let mut custom = ibc();
        custom.set("Gym", 5.0);

        let mut project = Project::default();
        project.update_row(1, RowEdit::area("50").with_type("Gym"), &custom).unwrap();
        assert_eq!(project.rows[0].occupant_load, 10);

        let table = FactorTable::for_code_set(CodeSetId::EuGuidance);
        let totals = project.set_code_set(CodeSetId::EuGuidance, &table);
        assert_eq!(project.settings.code_set, CodeSetId::EuGuidance);
        assert_eq!(project.rows[0].occupancy_type, "Retail");
        assert_eq!(totals.grand_total, 18);
    }

    #[test]
    fn test_project_serialization() {
        let mut project = Project::new("Jane", "25-042", "Terminal");
        project.settings.code_set = CodeSetId::UkAdb2023;
        let json = serde_json::to_string_pretty(&project).unwrap();
        assert!(json.contains("UK_ADB_2023"));
        assert!(json.contains("25-042"));

        let roundtrip: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.rows, project.rows);
        assert_eq!(roundtrip.settings.code_set, CodeSetId::UkAdb2023);
    }
}
