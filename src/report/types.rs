//! Report layout model.
//!
//! A `ReportDocument` is the backend-independent description of a report:
//! every string that will appear on the page, in order. Backends (PDF,
//! Markdown) only decide how to draw it, so two renders of the same
//! summary always show the same content.

use crate::types::Summary;

/// Report title shown at the top of every report
pub const REPORT_TITLE: &str = "Chemical Equipment Report";

/// Header row of the distribution table
pub const DISTRIBUTION_HEADER: [&str; 2] = ["Equipment Type", "Count"];

/// Title block: report name, source file and generation context.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleBlock {
    pub title: String,
    pub filename: String,
    /// Which dataset and owner the report was produced for
    pub context: String,
}

/// One "Label: value" line of the statistics block.
#[derive(Debug, Clone, PartialEq)]
pub struct StatLine {
    pub label: String,
    pub value: String,
}

impl StatLine {
    fn new(label: &str, value: String) -> Self {
        Self { label: label.to_string(), value }
    }

    /// Format as displayed: "Label: value"
    pub fn format(&self) -> String {
        format!("{}: {}", self.label, self.value)
    }
}

/// Statistics block: heading plus upload date, count and averages.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsBlock {
    pub heading: String,
    pub lines: Vec<StatLine>,
}

/// Type distribution table: fixed header then one row per type.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionTable {
    pub heading: String,
    pub header: [String; 2],
    pub rows: Vec<[String; 2]>,
}

/// Complete report content, ready for a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: TitleBlock,
    pub statistics: StatsBlock,
    pub distribution: DistributionTable,
}

impl ReportDocument {
    /// Convert a stored summary into the report layout (summary → rendering model).
    pub fn from_summary(summary: &Summary) -> Self {
        let title = TitleBlock {
            title: REPORT_TITLE.to_string(),
            filename: summary.filename.clone(),
            context: format!("Dataset {} | owner {}", summary.id, summary.owner),
        };

        let statistics = StatsBlock {
            heading: "Summary Statistics".to_string(),
            lines: vec![
                StatLine::new("Upload Date", summary.uploaded_display()),
                StatLine::new("Total Equipment Count", summary.total_count.to_string()),
                StatLine::new("Average Flowrate", format!("{:.2}", summary.avg_flowrate)),
                StatLine::new("Average Pressure", format!("{:.2}", summary.avg_pressure)),
                StatLine::new("Average Temperature", format!("{:.2}", summary.avg_temperature)),
            ],
        };

        let distribution = DistributionTable {
            heading: "Equipment Type Distribution".to_string(),
            header: DISTRIBUTION_HEADER.map(String::from),
            rows: summary
                .type_distribution
                .iter()
                .map(|(equipment_type, count)| [equipment_type.clone(), count.to_string()])
                .collect(),
        };

        ReportDocument { title, statistics, distribution }
    }

    /// The table including its header row, as drawn.
    pub fn table_rows(&self) -> Vec<[String; 2]> {
        std::iter::once(self.distribution.header.clone()).chain(self.distribution.rows.iter().cloned()).collect()
    }
}
