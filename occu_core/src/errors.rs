//! # Error Types
//!
//! Structured error types for occu_core. The load engine itself never fails;
//! these errors come from the adapters around it (project files, spreadsheets,
//! PDF rendering, the override store).
//!
//! ## Example
//!
//! ```rust
//! use occu_core::errors::{OccuError, OccuResult};
//! use occu_core::factors::CodeSetId;
//!
//! fn pick_code(id: &str) -> OccuResult<CodeSetId> {
//!     id.parse()
//! }
//!
//! let err = pick_code("IBC_1999").unwrap_err();
//! assert_eq!(err.error_code(), "UNKNOWN_CODE_SET");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for occu_core operations
pub type OccuResult<T> = Result<T, OccuError>;

/// Structured error type for everything outside the pure engine.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum OccuError {
    /// An input value is invalid (non-positive factor, empty name, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Code set identifier is not one of the built-in sets
    #[error("Unknown code set: {id}")]
    UnknownCodeSet { id: String },

    /// No row with the given id exists in the project
    #[error("Row not found: {id}")]
    RowNotFound { id: u32 },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Spreadsheet could not be read or written
    #[error("Spreadsheet error: {operation} on '{path}' - {reason}")]
    Spreadsheet {
        operation: String,
        path: String,
        reason: String,
    },

    /// Typst compilation or PDF export failed
    #[error("PDF rendering failed: {reason}")]
    PdfRender { reason: String },
}

impl OccuError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        OccuError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownCodeSet error
    pub fn unknown_code_set(id: impl Into<String>) -> Self {
        OccuError::UnknownCodeSet { id: id.into() }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        OccuError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a Spreadsheet error
    pub fn spreadsheet(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        OccuError::Spreadsheet {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        OccuError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            OccuError::InvalidInput { .. } => "INVALID_INPUT",
            OccuError::UnknownCodeSet { .. } => "UNKNOWN_CODE_SET",
            OccuError::RowNotFound { .. } => "ROW_NOT_FOUND",
            OccuError::FileError { .. } => "FILE_ERROR",
            OccuError::SerializationError { .. } => "SERIALIZATION_ERROR",
            OccuError::VersionMismatch { .. } => "VERSION_MISMATCH",
            OccuError::Spreadsheet { .. } => "SPREADSHEET_ERROR",
            OccuError::PdfRender { .. } => "PDF_RENDER_ERROR",
        }
    }
}

impl From<serde_json::Error> for OccuError {
    fn from(e: serde_json::Error) -> Self {
        OccuError::serialization(e.to_string())
    }
}
