/// Console formatting module - Pure rendering concerns
///
/// This module handles all console output formatting including:
/// - Table layout and borders
/// - Color terminal output
/// - Text truncation and padding
///
/// It accepts summaries and rows from the library and renders them to the console.
///
/// ## Output Flexibility
///
/// This module supports writing to any `std::io::Write` destination:
/// - Console (stdout/stderr) with optional colors
/// - String buffers (for tests)
/// - Files
use crate::types::{EquipmentRow, Summary, TypeDistribution};
use std::io::{self, Write};
use std::sync::{Arc, OnceLock};
use term::color::Color;
use terminal_size::{Width, terminal_size};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Writer for table output - configurable for color/plain text
pub struct TableWriter<W: Write> {
    writer: W,
    use_colors: bool,
}

impl<W: Write> TableWriter<W> {
    /// Create a new table writer
    pub fn new(writer: W, use_colors: bool) -> Self {
        Self { writer, use_colors }
    }

    /// Write formatted text, optionally with color
    fn write_colored(&mut self, text: &str, color: Color) -> io::Result<()> {
        if self.use_colors {
            if let Some(ref mut t) = term::stdout() {
                let _ = t.fg(color);
                let _ = t.write_all(text.as_bytes());
                let _ = t.reset();
                Ok(())
            } else {
                write!(self.writer, "{}", text)
            }
        } else {
            write!(self.writer, "{}", text)
        }
    }

    fn write_rule(&mut self, left: &str, mid: &str, right: &str, widths: &[usize]) -> io::Result<()> {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        writeln!(self.writer, "{}{}{}", left, segments.join(mid), right)
    }

    /// Write one bordered row; cells are truncated/padded to `widths - 2`
    fn write_cells(&mut self, cells: &[String], widths: &[usize], align_right: &[bool]) -> io::Result<()> {
        let displays: Vec<String> = cells
            .iter()
            .zip(widths)
            .zip(align_right)
            .map(|((cell, width), right)| {
                if *right {
                    pad_left(cell, width.saturating_sub(2))
                } else {
                    truncate_with_padding(cell, width.saturating_sub(2))
                }
            })
            .collect();
        writeln!(self.writer, "│ {} │", displays.join(" │ "))
    }

    /// Write a complete bordered table with a header row
    pub fn write_table(
        &mut self,
        header: &[&str],
        rows: &[Vec<String>],
        widths: &[usize],
        align_right: &[bool],
    ) -> io::Result<()> {
        let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
        self.write_rule("┌", "┬", "┐", widths)?;
        self.write_cells(&header, widths, align_right)?;
        self.write_rule("├", "┼", "┤", widths)?;
        for row in rows {
            self.write_cells(row, widths, align_right)?;
        }
        self.write_rule("└", "┴", "┘", widths)
    }

    /// Write the history listing, newest first
    pub fn write_history_table(&mut self, summaries: &[Arc<Summary>]) -> io::Result<()> {
        if summaries.is_empty() {
            return writeln!(self.writer, "No uploads yet.");
        }

        let widths = HistoryWidths::new(get_console_width());
        let rows: Vec<Vec<String>> = summaries
            .iter()
            .map(|s| {
                vec![
                    s.id.short(),
                    s.filename.clone(),
                    s.uploaded_display(),
                    s.total_count.to_string(),
                    format!("{:.2}", s.avg_flowrate),
                    format!("{:.2}", s.avg_pressure),
                    format!("{:.2}", s.avg_temperature),
                ]
            })
            .collect();

        self.write_table(
            &["ID", "Filename", "Uploaded", "Count", "Avg Flow", "Avg Press", "Avg Temp"],
            &rows,
            &widths.as_array(),
            &[false, false, false, true, true, true, true],
        )
    }

    /// Write a summary's statistics block followed by its type distribution
    pub fn write_summary(&mut self, summary: &Summary) -> io::Result<()> {
        self.write_colored(&format!("{}\n", summary), term::color::BRIGHT_GREEN)?;
        writeln!(self.writer, "  ID:                  {}", summary.id)?;
        writeln!(self.writer, "  Total equipment:     {}", summary.total_count)?;
        writeln!(self.writer, "  Average flowrate:    {:.2}", summary.avg_flowrate)?;
        writeln!(self.writer, "  Average pressure:    {:.2}", summary.avg_pressure)?;
        writeln!(self.writer, "  Average temperature: {:.2}", summary.avg_temperature)?;
        writeln!(self.writer)?;
        self.write_distribution_table(&summary.type_distribution)
    }

    /// Write the type distribution in stored order
    pub fn write_distribution_table(&mut self, distribution: &TypeDistribution) -> io::Result<()> {
        let label_width = distribution
            .keys()
            .map(|k| display_width(k))
            .chain(std::iter::once(display_width("Equipment Type")))
            .max()
            .unwrap_or(0)
            .min(48)
            + 2;
        let rows: Vec<Vec<String>> = distribution.iter().map(|(k, v)| vec![k.clone(), v.to_string()]).collect();
        self.write_table(&["Equipment Type", "Count"], &rows, &[label_width, 9], &[false, true])
    }

    /// Write parsed upload rows
    pub fn write_rows_table(&mut self, rows: &[EquipmentRow]) -> io::Result<()> {
        let total = get_console_width();
        // Borders: 6 separators around 5 columns
        let numeric = 12;
        let available = total.saturating_sub(6 + 3 * numeric);
        let name = (available / 2).max(14);
        let kind = available.saturating_sub(name).max(12);

        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|r| {
                vec![
                    r.name.clone(),
                    r.equipment_type.clone(),
                    format_number(r.flowrate),
                    format_number(r.pressure),
                    format_number(r.temperature),
                ]
            })
            .collect();
        self.write_table(
            &["Equipment Name", "Type", "Flowrate", "Pressure", "Temperature"],
            &cells,
            &[name, kind, numeric, numeric, numeric],
            &[false, false, true, true, true],
        )
    }
}

/// Shortest faithful rendering of a cell value (`10` rather than `10.0`)
fn format_number(value: f64) -> String {
    format!("{}", value)
}

//
// Table Layout and Widths
//

/// Column widths for the history table
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistoryWidths {
    pub id: usize,
    pub filename: usize,
    pub uploaded: usize,
    pub count: usize,
    pub avg: usize,
}

impl HistoryWidths {
    pub fn new(terminal_width: usize) -> Self {
        // Borders: │ = 8 characters (1 before each column + 1 at end)
        let borders = 8;
        let available = terminal_width.saturating_sub(borders);

        // Short id: 8 hex digits plus padding
        let id = 10;
        // "2026-10-19 14:05"
        let uploaded = 18;
        let count = 8;
        let avg = 11;

        // Filename gets remaining space
        let fixed_total = id + uploaded + count + 3 * avg;
        let filename = if available > fixed_total + 12 { available - fixed_total } else { 12 };

        HistoryWidths { id, filename, uploaded, count, avg }
    }

    pub fn as_array(&self) -> [usize; 7] {
        [self.id, self.filename, self.uploaded, self.count, self.avg, self.avg, self.avg]
    }
}

/// Get terminal width or default to 100
fn get_terminal_width() -> usize {
    if let Some((Width(w), _)) = terminal_size() { w as usize } else { 100 }
}

// Console width - override set once from --console-width, otherwise detected
static CONSOLE_WIDTH: OnceLock<usize> = OnceLock::new();

/// Override the detected console width (for testing and narrow pipes)
pub fn set_console_width(width: usize) {
    let _ = CONSOLE_WIDTH.set(width); // Ignore error if already initialized
}

/// Console width used for table layout
pub fn get_console_width() -> usize {
    *CONSOLE_WIDTH.get_or_init(get_terminal_width)
}

//
// Text Formatting Utilities
//

/// Count the display width of a string, accounting for wide Unicode characters
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Right-align a string within `width`, truncating like `truncate_with_padding`
pub fn pad_left(s: &str, width: usize) -> String {
    let display_w = display_width(s);
    if display_w >= width {
        truncate_with_padding(s, width)
    } else {
        format!("{}{}", " ".repeat(width - display_w), s)
    }
}

/// Shorten a string to at most `width` display columns, ending in "..."
pub fn truncate_to_width(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;

    // Reserve space for "..."
    let target_width = if width >= 3 { width - 3 } else { width };

    for c in s.chars() {
        let c_width = UnicodeWidthChar::width(c).unwrap_or(1);

        if current_width + c_width > target_width {
            break;
        }

        result.push(c);
        current_width += c_width;
    }

    if width >= 3 {
        result.push_str("...");
    }
    result
}

/// Truncate and pad string to exact width
pub fn truncate_with_padding(s: &str, width: usize) -> String {
    let shown = truncate_to_width(s, width);
    // Pad if the string was short or a wide character left a gap
    let padding = width.saturating_sub(display_width(&shown));
    format!("{}{}", shown, " ".repeat(padding))
}

/// Print the history table to stdout
pub fn print_history_table(summaries: &[Arc<Summary>], use_colors: bool) {
    let mut writer = TableWriter::new(io::stdout(), use_colors);
    let _ = writer.write_history_table(summaries);
}

/// Print a summary block to stdout
pub fn print_summary(summary: &Summary, use_colors: bool) {
    let mut writer = TableWriter::new(io::stdout(), use_colors);
    let _ = writer.write_summary(summary);
}

/// Print parsed rows to stdout
pub fn print_rows_table(rows: &[EquipmentRow]) {
    let mut writer = TableWriter::new(io::stdout(), false);
    let _ = writer.write_rows_table(rows);
}

#[cfg(test)]
#[path = "console_format_test.rs"]
mod console_format_test;
