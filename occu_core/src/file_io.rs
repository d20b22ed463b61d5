//! # File I/O Module
//!
//! Project file operations:
//! - **Atomic saves**: write to a sibling `.tmp`, fsync, rename over the target
//! - **Version validation**: refuse files written by an incompatible schema
//!
//! ## File Format
//!
//! Projects are saved as `.occ` files containing pretty-printed JSON.
//!
//! ## Example
//!
//! ```rust,no_run
//! use occu_core::file_io::{load_project, save_project};
//! use occu_core::project::Project;
//! use std::path::Path;
//!
//! let project = Project::new("J. Planner", "25-114", "Harbour Mall");
//! save_project(&project, Path::new("mall.occ"))?;
//!
//! let loaded = load_project(Path::new("mall.occ"))?;
//! assert_eq!(loaded.meta.job_id, "25-114");
//! # Ok::<(), occu_core::errors::OccuError>(())
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{OccuError, OccuResult};
use crate::project::{Project, SCHEMA_VERSION};

/// Conventional extension for project files
pub const PROJECT_EXTENSION: &str = "occ";

/// Write `bytes` to `path` so that readers see either the old or the new
/// contents, never a partial file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> OccuResult<()> {
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        OccuError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(bytes).map_err(|e| {
        OccuError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        OccuError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        OccuError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// `<path>.tmp`, keeping the original extension visible
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Save a project with atomic write semantics.
pub fn save_project(project: &Project, path: &Path) -> OccuResult<()> {
    let json = serde_json::to_string_pretty(project)?;
    write_atomic(path, json.as_bytes())?;
    debug!(path = %path.display(), rows = project.rows.len(), "saved project");
    Ok(())
}

/// Load a project from a file.
///
/// # Returns
///
/// * `Ok(Project)` - Successfully loaded project
/// * `Err(OccuError::VersionMismatch)` - File version is incompatible
/// * `Err(OccuError::SerializationError)` - Invalid JSON
/// * `Err(OccuError::FileError)` - I/O error
pub fn load_project(path: &Path) -> OccuResult<Project> {
    let contents = fs::read_to_string(path)
        .map_err(|e| OccuError::file_error("read", path.display().to_string(), e.to_string()))?;

    let project: Project = serde_json::from_str(&contents)
        .map_err(|e| OccuError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    validate_version(&project.meta.version)?;

    debug!(path = %path.display(), rows = project.rows.len(), "loaded project");
    Ok(project)
}

/// Whether `path` looks like a project file (by extension)
pub fn is_project_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(PROJECT_EXTENSION))
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> OccuResult<()> {
    let mismatch = || OccuError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // While in 0.x, a newer minor may carry breaking changes
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(mismatch());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::{CodeSetId, FactorTable};
    use crate::project::RowEdit;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.occ");

        let table = FactorTable::for_code_set(CodeSetId::Ibc2024);
        let mut project = Project::new("Tester", "TEST-001", "Lab");
        project.update_row(1, RowEdit::area("93").with_type("Administrative"), &table).unwrap();
        save_project(&project, &path).unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.job_id, "TEST-001");
        assert_eq!(loaded.rows, project.rows);
        assert_eq!(loaded.rows[0].occupant_load, 10);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atomic.occ");

        save_project(&Project::default(), &path).unwrap();

        assert!(!tmp_path_for(&path).exists());
        assert!(path.exists());
    }

    #[test]
    fn test_tmp_path_keeps_extension() {
        assert_eq!(tmp_path_for(Path::new("/a/b.occ")), Path::new("/a/b.occ.tmp"));
        assert_eq!(tmp_path_for(Path::new("store.json")), Path::new("store.json.tmp"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_project(&dir.path().join("nope.occ")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.occ");
        fs::write(&path, "{ \"meta\": ").unwrap();
        let err = load_project(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_load_rejects_newer_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.occ");
        let mut project = Project::default();
        project.meta.version = "0.9.0".to_string();
        fs::write(&path, serde_json::to_string(&project).unwrap()).unwrap();

        let err = load_project(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.3").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_is_project_path() {
        assert!(is_project_path(Path::new("mall.occ")));
        assert!(is_project_path(Path::new("MALL.OCC")));
        assert!(!is_project_path(Path::new("mall.xlsx")));
        assert!(!is_project_path(Path::new("occ")));
    }
}
