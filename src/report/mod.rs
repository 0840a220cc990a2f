//! Report generation module.
//!
//! This module handles:
//! - Converting a stored Summary into a fixed report layout
//! - Drawing that layout as PDF
//! - Markdown rendering of the same layout
//! - JSON export of history listings
//!
//! # Module Organization
//!
//! - `types` - Layout model (title block, statistics block, distribution table)
//! - `pdf` - PDF backend
//! - `export` - Format selection, Markdown and JSON output, file export

mod export;
mod pdf;
mod types;

use crate::types::Summary;

// Re-export layout types
pub use types::{
    DISTRIBUTION_HEADER, DistributionTable, REPORT_TITLE, ReportDocument, StatLine, StatsBlock, TitleBlock,
};

// Re-export export functions
pub use export::{
    HistoryRecord, ReportFormat, export_history_json, export_report, export_summary_json, render_markdown,
    render_pdf, render_report, report_filename,
};

/// Build the report layout for a summary. Pure; never mutates the summary.
pub fn render(summary: &Summary) -> ReportDocument {
    ReportDocument::from_summary(summary)
}
