//! PDF backend for the report layout.
//!
//! Draws a `ReportDocument` onto US-letter pages with the builtin
//! Helvetica faces: title block, statistics block, then the distribution
//! table with a ruled grid. Long tables continue on further pages with the
//! header row repeated.

use super::types::ReportDocument;
use crate::console_format::truncate_to_width;
use crate::error::{Error, Result};
use log::debug;
use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Point};

const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 25.4;

const TITLE_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 11.0;

/// Vertical advance per body line, in mm
const LINE_HEIGHT: f32 = 6.0;
const ROW_HEIGHT: f32 = 8.0;
/// Distribution table column widths, in mm
const COLUMN_WIDTHS: [f32; 2] = [110.0, 40.0];
/// Characters that fit a line between the margins at heading size
const LINE_CHARS: usize = 60;
/// Characters that fit each table column at body size
const CELL_CHARS: [usize; 2] = [48, 16];

const LAYER_NAME: &str = "Report";

fn render_error(e: impl std::fmt::Display) -> Error {
    Error::Render(e.to_string())
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Current drawing position on the current page
struct PageCursor<'a> {
    pdf: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
}

impl<'a> PageCursor<'a> {
    fn text(&mut self, text: &str, size: f32, font: &IndirectFontRef, advance: f32) {
        self.layer.use_text(text, size, Mm(MARGIN), Mm(self.y), font);
        self.y -= advance;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn remaining(&self) -> f32 {
        self.y - MARGIN
    }

    fn new_page(&mut self) {
        let (page, layer) = self.pdf.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        self.layer = self.pdf.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
        self.pages += 1;
    }

    fn hline(&self, y: f32, width: f32) {
        self.line((MARGIN, y), (MARGIN + width, y));
    }

    fn line(&self, from: (f32, f32), to: (f32, f32)) {
        self.layer.add_line(Line {
            points: vec![(Point::new(Mm(from.0), Mm(from.1)), false), (Point::new(Mm(to.0), Mm(to.1)), false)],
            is_closed: false,
        });
    }

    /// Draw one bordered table row whose top edge is the current position
    fn table_row(&mut self, cells: &[String; 2], font: &IndirectFontRef) {
        let top = self.y;
        let bottom = top - ROW_HEIGHT;
        let width: f32 = COLUMN_WIDTHS.iter().sum();

        let mut x = MARGIN;
        for ((cell, col_width), max_chars) in cells.iter().zip(COLUMN_WIDTHS).zip(CELL_CHARS) {
            self.layer.use_text(truncate_to_width(cell, max_chars), BODY_SIZE, Mm(x + 2.5), Mm(bottom + 2.5), font);
            self.line((x, top), (x, bottom));
            x += col_width;
        }
        self.line((x, top), (x, bottom));
        self.hline(bottom, width);

        self.y = bottom;
    }

    /// Start the grid with its top rule and header row
    fn table_header(&mut self, header: &[String; 2], font: &IndirectFontRef) {
        self.hline(self.y, COLUMN_WIDTHS.iter().sum());
        self.table_row(header, font);
    }
}

/// Serialize a report layout to PDF bytes
pub fn write_pdf(doc: &ReportDocument) -> Result<Vec<u8>> {
    let (pdf, page, layer) =
        PdfDocument::new(doc.title.title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
    let fonts = Fonts {
        regular: pdf.add_builtin_font(BuiltinFont::Helvetica).map_err(render_error)?,
        bold: pdf.add_builtin_font(BuiltinFont::HelveticaBold).map_err(render_error)?,
    };

    let pages = {
        let mut cursor =
            PageCursor { pdf: &pdf, layer: pdf.get_page(page).get_layer(layer), y: PAGE_HEIGHT - MARGIN, pages: 1 };
        draw(&mut cursor, doc, &fonts);
        cursor.pages
    };

    let bytes = pdf.save_to_bytes().map_err(render_error)?;
    debug!("rendered PDF report: {} page(s), {} bytes", pages, bytes.len());
    Ok(bytes)
}

fn draw(cursor: &mut PageCursor<'_>, doc: &ReportDocument, fonts: &Fonts) {
    // Title block
    cursor.text(&doc.title.title, TITLE_SIZE, &fonts.bold, 9.0);
    cursor.text(&truncate_to_width(&doc.title.filename, LINE_CHARS), HEADING_SIZE, &fonts.regular, 7.0);
    let context = truncate_to_width(&doc.title.context, LINE_CHARS * 3 / 2);
    cursor.text(&context, BODY_SIZE - 2.0, &fonts.regular, LINE_HEIGHT);
    cursor.gap(8.0);

    // Statistics block
    cursor.text(&doc.statistics.heading, HEADING_SIZE, &fonts.bold, 8.0);
    for line in &doc.statistics.lines {
        cursor.text(&line.format(), BODY_SIZE, &fonts.regular, LINE_HEIGHT);
    }
    cursor.gap(8.0);

    // Distribution table
    cursor.text(&doc.distribution.heading, HEADING_SIZE, &fonts.bold, 4.0);
    cursor.table_header(&doc.distribution.header, &fonts.bold);
    for row in &doc.distribution.rows {
        if cursor.remaining() < ROW_HEIGHT {
            cursor.new_page();
            cursor.table_header(&doc.distribution.header, &fonts.bold);
        }
        cursor.table_row(row, &fonts.regular);
    }
}
