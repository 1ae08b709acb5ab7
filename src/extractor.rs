// 📄 Text Extractor - PDF bytes → one text blob
//
// Pages are read in ascending page-number order. A page with no text (or a
// page whose content stream cannot be decoded) contributes nothing; only a
// document that cannot be loaded at all is an error.
//
// Line breaks come from the text position, not from text object boundaries:
// a run drawn on a new baseline starts a new line, a run moved along the
// same baseline is separated by a space.

use crate::error::{OffsetError, Result};
use lopdf::{Document, Object, ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Baselines closer than this (text space units) are the same line
const LINE_TOLERANCE: f32 = 1.0;

/// TJ adjustments below this (thousandths of an em) read as a word gap
const WORD_GAP: f32 = -100.0;

/// Text of a single page that yielded something
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    /// Page number (1-indexed, as stored in the PDF page tree)
    pub page_number: u32,
    pub text: String,
}

/// Load a PDF from memory and extract the text of every page that has any.
///
/// # Errors
/// * `OffsetError::DocumentFormat` - the bytes are not a loadable PDF
pub fn extract_pages(pdf_bytes: &[u8]) -> Result<Vec<PageText>> {
    let doc = Document::load_mem(pdf_bytes)
        .map_err(|e| OffsetError::DocumentFormat(e.to_string()))?;

    let pages = doc.get_pages();
    let mut extracted = Vec::with_capacity(pages.len());

    for (&page_number, &page_id) in &pages {
        match page_text(&doc, page_id) {
            Ok(text) if !text.is_empty() => extracted.push(PageText { page_number, text }),
            Ok(_) => debug!(page = page_number, "page has no extractable text"),
            Err(e) => warn!(page = page_number, error = %e, "skipping unreadable page"),
        }
    }

    debug!(
        total_pages = pages.len(),
        pages_with_text = extracted.len(),
        "pdf text extracted"
    );

    Ok(extracted)
}

/// Concatenate page texts, each followed by a newline, in page order.
pub fn join_pages(pages: &[PageText]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(&page.text);
        text.push('\n');
    }
    text
}

/// `extract_pages` + `join_pages`
pub fn extract_text(pdf_bytes: &[u8]) -> Result<String> {
    let pages = extract_pages(pdf_bytes)?;
    Ok(join_pages(&pages))
}

// ============================================================================
// CONTENT STREAM WALK
// ============================================================================

/// Walk the page's text operators and lay the shown strings out as lines.
fn page_text(doc: &Document, page_id: ObjectId) -> lopdf::Result<String> {
    let encodings: BTreeMap<Vec<u8>, &str> = doc
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect();
    let content = doc.get_and_decode_page_content(page_id)?;

    let mut lines = LineWriter::default();
    let mut encoding: Option<&str> = None;

    for operation in &content.operations {
        let operands = operation.operands.as_slice();
        match operation.operator.as_str() {
            "BT" => lines.begin_text(),
            "Tf" => {
                encoding = operands
                    .first()
                    .and_then(|font| font.as_name().ok())
                    .and_then(|name| encodings.get(name).copied());
            }
            "Td" => {
                if let [tx, ty, ..] = operands {
                    lines.translate(number(tx), number(ty));
                }
            }
            "TD" => {
                if let [tx, ty, ..] = operands {
                    lines.leading = -number(ty);
                    lines.translate(number(tx), number(ty));
                }
            }
            "Tm" => {
                if let [_, _, _, _, e, f] = operands {
                    lines.move_to(number(e), number(f));
                }
            }
            "TL" => {
                if let Some(leading) = operands.first() {
                    lines.leading = number(leading);
                }
            }
            "T*" => lines.next_line(),
            "Tj" | "TJ" => show_operands(&mut lines, encoding, operands),
            "'" => {
                lines.next_line();
                show_operands(&mut lines, encoding, operands);
            }
            "\"" => {
                lines.next_line();
                show_operands(&mut lines, encoding, operands.get(2..).unwrap_or_default());
            }
            _ => {}
        }
    }

    Ok(lines.finish())
}

fn number(operand: &Object) -> f32 {
    operand.as_float().unwrap_or(0.0)
}

fn show_operands(lines: &mut LineWriter, encoding: Option<&str>, operands: &[Object]) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => lines.show(&Document::decode_text(encoding, bytes)),
            Object::Array(items) => show_operands(lines, encoding, items),
            Object::Integer(_) | Object::Real(_) => {
                if number(operand) < WORD_GAP {
                    lines.gap();
                }
            }
            _ => {}
        }
    }
}

/// Accumulates shown runs into text lines, tracking only the translation part
/// of the text line matrix.
#[derive(Debug, Default)]
struct LineWriter {
    text: String,
    line_x: f32,
    line_y: f32,
    leading: f32,
    last_y: Option<f32>,
    /// Position moved along the current baseline since the last run
    moved: bool,
    /// T*, ' or " seen since the last run
    break_pending: bool,
}

impl LineWriter {
    fn begin_text(&mut self) {
        self.line_x = 0.0;
        self.line_y = 0.0;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.move_to(self.line_x + tx, self.line_y + ty);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        if x != self.line_x || y != self.line_y {
            self.moved = true;
        }
        self.line_x = x;
        self.line_y = y;
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
        self.break_pending = true;
    }

    fn gap(&mut self) {
        self.moved = true;
    }

    fn show(&mut self, run: &str) {
        if run.is_empty() {
            return;
        }

        if !self.text.is_empty() {
            let new_baseline = self
                .last_y
                .is_some_and(|y| (y - self.line_y).abs() > LINE_TOLERANCE);

            if self.break_pending || new_baseline {
                if !self.text.ends_with('\n') {
                    self.text.push('\n');
                }
            } else if self.moved
                && !self.text.ends_with(char::is_whitespace)
                && !run.starts_with(char::is_whitespace)
            {
                self.text.push(' ');
            }
        }

        self.text.push_str(run);
        self.last_y = Some(self.line_y);
        self.moved = false;
        self.break_pending = false;
    }

    fn finish(self) -> String {
        self.text
    }
}
