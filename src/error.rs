//! Error types for Bitacora
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Bitacora error types
#[derive(Error, Debug)]
pub enum Error {
    /// Auto-export interval was not a positive number of runs
    #[error("invalid auto-export interval: {0}\nThe interval must be a positive number of appended runs")]
    InvalidExportInterval(usize),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error
    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    /// SQLite export error
    #[error("SQLite export error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
