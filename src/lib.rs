//! Chemical equipment upload summaries.
//!
//! An upload is a CSV file with `Equipment Name`, `Type`, `Flowrate`,
//! `Pressure` and `Temperature` columns. It is validated into typed rows,
//! reduced to a summary (count, averages, type distribution), and filed
//! in its owner's history, which keeps only the most recent
//! [`HISTORY_LIMIT`] summaries. Any retained summary can be rendered as a
//! PDF (or Markdown) report.
//!
//! # Module Organization
//!
//! - `validate` - CSV schema and numeric checks
//! - `summary` - Aggregate statistics over validated rows
//! - `history` - Bounded per-owner history with eviction
//! - `storage` - Raw upload retention behind the `BlobStore` trait
//! - `pipeline` - Upload ingestion tying the above together
//! - `report` - Report layout and PDF / Markdown / JSON output
//! - `state` - Locked on-disk persistence for the CLI
//! - `cli`, `config`, `console_format`, `ui` - Command-line front end

pub mod cli;
pub mod config;
pub mod console_format;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod report;
pub mod state;
pub mod storage;
pub mod summary;
pub mod types;
pub mod ui;
pub mod validate;

pub use error::{Error, ErrorKind, Result};
pub use history::{Appended, HistorySnapshot, HistoryStore};
pub use pipeline::{UploadOutcome, ingest, stage};
pub use storage::{BlobStore, DirStore, MemoryStore};
pub use summary::summarize;
pub use types::{
    EquipmentRow, HISTORY_LIMIT, OwnerId, REQUIRED_COLUMNS, StorageToken, Summary, SummaryFields, SummaryId,
    TypeDistribution,
};
pub use validate::validate;
