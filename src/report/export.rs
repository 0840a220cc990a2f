//! Report export functions for Markdown, JSON and PDF formats.
//!
//! This module handles turning stored summaries into bytes for the
//! history and report collaborators, and writing those bytes to disk.

use super::pdf::write_pdf;
use super::types::ReportDocument;
use crate::error::Result;
use crate::types::{Summary, SummaryId, TypeDistribution};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Output format for a rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Pdf,
    Markdown,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Markdown => "md",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "application/pdf",
            ReportFormat::Markdown => "text/markdown",
        }
    }
}

/// Attachment filename for a summary's report, e.g. `report_<id>.pdf`
pub fn report_filename(summary: &Summary, format: ReportFormat) -> String {
    format!("report_{}.{}", summary.id, format.extension())
}

/// Render a summary as PDF bytes.
pub fn render_pdf(summary: &Summary) -> Result<Vec<u8>> {
    write_pdf(&ReportDocument::from_summary(summary))
}

/// Render a summary as a Markdown report.
///
/// Same blocks and ordering as the PDF: title, statistics, then the
/// distribution table.
pub fn render_markdown(summary: &Summary) -> String {
    let doc = ReportDocument::from_summary(summary);
    let mut out = String::new();

    // String formatting cannot fail
    let _ = writeln!(out, "# {}\n", doc.title.title);
    let _ = writeln!(out, "**File**: {}", doc.title.filename);
    let _ = writeln!(out, "{}\n", doc.title.context);

    let _ = writeln!(out, "## {}\n", doc.statistics.heading);
    for line in &doc.statistics.lines {
        let _ = writeln!(out, "- {}", line.format());
    }
    out.push('\n');

    let _ = writeln!(out, "## {}\n", doc.distribution.heading);
    let _ = writeln!(out, "| {} | {} |", doc.distribution.header[0], doc.distribution.header[1]);
    out.push_str("|---|---:|\n");
    for [equipment_type, count] in &doc.distribution.rows {
        let _ = writeln!(out, "| {} | {} |", escape_cell(equipment_type), count);
    }

    out
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Render a summary in the requested format.
pub fn render_report(summary: &Summary, format: ReportFormat) -> Result<Vec<u8>> {
    match format {
        ReportFormat::Pdf => render_pdf(summary),
        ReportFormat::Markdown => Ok(render_markdown(summary).into_bytes()),
    }
}

/// Render and write a report to `output_path`.
///
/// # Returns
/// Number of bytes written.
pub fn export_report(summary: &Summary, format: ReportFormat, output_path: &Path) -> Result<usize> {
    let bytes = render_report(summary, format)?;
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(output_path, &bytes)?;
    Ok(bytes.len())
}

/// History entry as exposed to clients (no owner, no storage token)
#[derive(Debug, serde::Serialize)]
pub struct HistoryRecord<'a> {
    pub id: SummaryId,
    pub filename: &'a str,
    pub uploaded_at: DateTime<Utc>,
    pub total_count: u64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub type_distribution: &'a TypeDistribution,
}

impl<'a> From<&'a Summary> for HistoryRecord<'a> {
    fn from(summary: &'a Summary) -> Self {
        HistoryRecord {
            id: summary.id,
            filename: &summary.filename,
            uploaded_at: summary.uploaded_at,
            total_count: summary.total_count,
            avg_flowrate: summary.avg_flowrate,
            avg_pressure: summary.avg_pressure,
            avg_temperature: summary.avg_temperature,
            type_distribution: &summary.type_distribution,
        }
    }
}

impl HistoryRecord<'_> {
    /// Averages rounded to two decimals, as in the upload response
    pub fn rounded(self) -> Self {
        HistoryRecord {
            avg_flowrate: round2(self.avg_flowrate),
            avg_pressure: round2(self.avg_pressure),
            avg_temperature: round2(self.avg_temperature),
            ..self
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Serialize a history listing as pretty JSON, preserving list and key order.
pub fn export_history_json(summaries: &[Arc<Summary>]) -> serde_json::Result<String> {
    let records: Vec<HistoryRecord<'_>> = summaries.iter().map(|s| HistoryRecord::from(s.as_ref())).collect();
    serde_json::to_string_pretty(&records)
}

/// Serialize one summary as pretty JSON.
pub fn export_summary_json(summary: &Summary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&HistoryRecord::from(summary))
}
