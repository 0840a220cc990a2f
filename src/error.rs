//! Errors surfaced by the ingestion pipeline, history store and renderer.
//!
//! Every variant carries a message meant for the person who uploaded the
//! file or asked for the report. Nothing here is retried internally.

use crate::types::SummaryId;
use thiserror::Error;

/// Broad classification of an [`Error`], for callers that map failures to
/// responses or exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The upload is missing required columns or is not a CSV file
    Schema,
    /// A cell could not be read as a finite number, or the CSV is malformed
    Parse,
    /// The requested summary does not exist for this owner
    NotFound,
    /// Blob storage or persisted history could not be read or written
    Storage,
    /// The document backend failed
    Render,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("CSV is missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("line {line}: {column} value '{value}' is not a number")]
    Parse { line: u64, column: String, value: String },

    #[error("malformed CSV: {0}")]
    Malformed(#[from] csv::Error),

    #[error("'{0}' is not a CSV file")]
    UnsupportedFile(String),

    #[error("dataset {0} not found")]
    NotFound(SummaryId),

    #[error("no dataset matches '{0}'")]
    UnknownId(String),

    #[error("'{0}' matches more than one dataset, use more of the id")]
    AmbiguousId(String),

    #[error("storage failure: {0}")]
    Storage(#[from] std::io::Error),

    #[error("history state: {0}")]
    State(String),

    #[error("report rendering failed: {0}")]
    Render(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Schema { .. } | Error::UnsupportedFile(_) => ErrorKind::Schema,
            Error::Parse { .. } | Error::Malformed(_) => ErrorKind::Parse,
            Error::NotFound(_) | Error::UnknownId(_) | Error::AmbiguousId(_) => ErrorKind::NotFound,
            Error::Storage(_) | Error::State(_) => ErrorKind::Storage,
            Error::Render(_) => ErrorKind::Render,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
