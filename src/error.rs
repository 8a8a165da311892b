use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool walks, reads, or emits grade data.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading directories or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the first header row is too narrow to hold the metadata cells.
    #[error("Row 1 must have at least 4 columns")]
    HeaderTooNarrow,

    /// Raised when one of the fixed header cells holds an unexpected value.
    #[error("Cell {cell} should be '{expected}', found '{found}'")]
    HeaderCell {
        cell: &'static str,
        expected: &'static str,
        found: String,
    },

    /// Raised when a sheet listed by the workbook cannot be loaded.
    #[error("missing sheet '{0}'")]
    MissingSheet(String),

    /// Raised when the data directory or a previous output does not exist.
    #[error("input not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ToolError {
    /// Returns true for failures that only invalidate a single worksheet.
    pub fn is_sheet_level(&self) -> bool {
        matches!(self, ToolError::HeaderTooNarrow | ToolError::HeaderCell { .. })
    }
}
