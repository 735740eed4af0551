//! PDF rendering of the report line model.

use std::io::BufWriter;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use super::document::{render_lines, ReportLine, REPORT_TITLE};
use crate::display::wrap_text;
use crate::error::{TriageError, TriageResult};
use crate::models::CaseReport;

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const TOP: Mm = Mm(280.0);
const BOTTOM: Mm = Mm(20.0);
const MARGIN: Mm = Mm(20.0);
const INDENT: Mm = Mm(25.0);
const WRAP_CHARS: usize = 85;

fn pdf_error(context: &str, e: impl std::fmt::Display) -> TriageError {
    TriageError::Export(format!("PDF {} error: {}", context, e))
}

/// Writes lines top to bottom, adding a page when the current one is full.
struct PageCursor<'a> {
    doc: &'a printpdf::PdfDocumentReference,
    layer: PdfLayerReference,
    y: Mm,
}

impl PageCursor<'_> {
    fn text(&mut self, text: &str, size: f32, x: Mm, font: &IndirectFontRef, advance: Mm) {
        if self.y < BOTTOM {
            let (page, layer) = self.doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP;
        }
        self.layer.use_text(text, size, x, self.y, font);
        self.y -= advance;
    }

    fn gap(&mut self, space: Mm) {
        self.y -= space;
    }
}

/// Render a report as PDF bytes.
pub fn render_pdf(report: &CaseReport) -> TriageResult<Vec<u8>> {
    let (doc, page1, layer1) = PdfDocument::new(REPORT_TITLE, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| pdf_error("font", e))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| pdf_error("font", e))?;

    let mut cursor = PageCursor {
        doc: &doc,
        layer: doc.get_page(page1).get_layer(layer1),
        y: TOP,
    };

    for line in render_lines(report) {
        match &line {
            ReportLine::Title(title) => cursor.text(title, 16.0, MARGIN, &bold, Mm(10.0)),
            ReportLine::Heading(_) => {
                cursor.gap(Mm(2.0));
                cursor.text(&line.to_string(), 11.0, MARGIN, &bold, Mm(6.0));
            }
            ReportLine::Field { .. } => {
                for wrapped in wrap_text(&line.to_string(), WRAP_CHARS) {
                    cursor.text(&wrapped, 10.0, MARGIN, &font, Mm(5.0));
                }
            }
            ReportLine::Item(item) => {
                for wrapped in wrap_text(&format!("- {}", item), WRAP_CHARS) {
                    cursor.text(&wrapped, 9.0, INDENT, &font, Mm(4.5));
                }
            }
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf).map_err(|e| pdf_error("save", e))?;
    buf.into_inner().map_err(|e| pdf_error("buffer", e))
}
