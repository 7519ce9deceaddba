//! Unified application error type.
//! Every module (db, core, source, export, cli) returns AppError so that the
//! pipeline can tell per-entity source failures apart from fatal ones.

use chrono::NaiveDate;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Persistence
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    // ---------------------------
    // Range / analysis errors
    // ---------------------------
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    // ---------------------------
    // Remote source errors
    // ---------------------------
    #[error("Event source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Entity not found on remote source: {0}")]
    EntityNotFound(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),
}

impl AppError {
    /// Errors raised by the remote source for a single entity.
    /// The run logs them and moves on to the next entity.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            AppError::SourceUnavailable(_) | AppError::EntityNotFound(_)
        )
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::SourceUnavailable(e.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Export(format!("CSV error: {e}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Export(format!("JSON serialization error: {e}"))
    }
}

pub type AppResult<T> = Result<T, AppError>;
