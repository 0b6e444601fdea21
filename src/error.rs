use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenience result type for conversion operations.
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Error type returned by detection, extraction, artifact and summary functions.
///
/// One enum is shared across both vendor formats so callers (e.g. a web layer) can match on
/// the failure kind and pick the right view.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook could not be opened or a worksheet could not be read.
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// Writing or reading the intermediate CSV artifact failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Engine configuration could not be parsed.
    #[error("config error: {0}")]
    Json(#[from] serde_json::Error),

    /// The workbook matches neither the Live Optics nor the RVTools layout. `path` is `None`
    /// for in-memory sources.
    #[error("unsupported workbook format{}", path_suffix(.path.as_deref()))]
    UnsupportedFormat { path: Option<PathBuf> },

    /// A worksheet required by the detected format is absent.
    #[error("missing required sheet '{sheet}'")]
    MissingRequiredSheet { sheet: String },

    /// A worksheet lacks the columns the extractor needs (including both unit variants).
    #[error("sheet '{sheet}': {message}")]
    MissingRequiredColumns { sheet: String, message: String },

    /// The same VM identifier appears more than once in a primary sheet.
    #[error("sheet '{sheet}': duplicate vm id '{vm_id}'")]
    DuplicateVmId { sheet: String, vm_id: String },

    /// A cell could not be read as the column's [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

fn path_suffix(path: Option<&Path>) -> String {
    path.map(|p| format!(" ({})", p.display())).unwrap_or_default()
}
