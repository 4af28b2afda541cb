//! Positioned text extraction using lopdf, with a pdf-extract fallback.

use lopdf::content::Content;
use lopdf::{Document, Object};
use std::path::Path;
use tracing::{debug, trace, warn};

use super::{DocumentSource, PageFragments, TextFragment};
use crate::error::{PdfError, TxError};

/// TJ adjustments below this (thousandths of text space) read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = -200.0;

/// Gap between synthetic lines produced by the plain-text fallback.
const FALLBACK_LINE_STEP: f32 = 12.0;

/// A loaded PDF statement.
pub struct PdfExtractor {
    document: Document,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Parse a PDF from bytes. Empty-password encryption is removed.
    pub fn load(data: &[u8]) -> Result<Self, PdfError> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        if document.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", document.get_pages().len());
        Ok(Self { document, raw_data })
    }

    pub fn from_file(path: &Path) -> Result<Self, TxError> {
        let data = std::fs::read(path)?;
        Ok(Self::load(&data)?)
    }

    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Fragments of every page in page order.
    ///
    /// Falls back to pdf-extract's plain text when the content streams yield
    /// nothing readable (CID fonts without a simple encoding, for one).
    pub fn extract_pages(&self) -> Result<Vec<PageFragments>, PdfError> {
        let mut pages = Vec::new();
        let mut readable = 0usize;

        for (number, page_id) in self.document.get_pages() {
            let fragments = match self.document.get_page_content(page_id) {
                Ok(bytes) => match Content::decode(&bytes) {
                    Ok(content) => positioned_fragments(&content),
                    Err(e) => {
                        warn!("Page {}: could not decode content stream: {}", number, e);
                        Vec::new()
                    }
                },
                Err(e) => {
                    warn!("Page {}: no content stream: {}", number, e);
                    Vec::new()
                }
            };

            trace!("Page {}: {} fragments", number, fragments.len());
            readable += fragments.len();
            pages.push(PageFragments { number, fragments });
        }

        if readable == 0 {
            debug!("No readable text-show operators, using plain-text fallback");
            return self.plain_text_pages();
        }

        Ok(pages)
    }

    fn plain_text_pages(&self) -> Result<Vec<PageFragments>, PdfError> {
        let text = pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        Ok(vec![synthetic_page(&text)])
    }
}

impl DocumentSource for PdfExtractor {
    async fn load_pages(&self) -> Result<Vec<PageFragments>, TxError> {
        Ok(self.extract_pages()?)
    }
}

/// One page built from plain text; each line gets its own descending `y`.
fn synthetic_page(text: &str) -> PageFragments {
    let fragments = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| TextFragment::new(line, -(i as f32) * FALLBACK_LINE_STEP))
        .collect();

    PageFragments {
        number: 1,
        fragments,
    }
}

/// Vertical-only view of the graphics and text state.
#[derive(Debug, Clone, Copy)]
struct VerticalState {
    /// CTM `d` and `f` components.
    ctm_scale: f32,
    ctm_offset: f32,
    /// Text line matrix `d` and `f` components.
    line_scale: f32,
    line_y: f32,
    leading: f32,
}

impl Default for VerticalState {
    fn default() -> Self {
        Self {
            ctm_scale: 1.0,
            ctm_offset: 0.0,
            line_scale: 1.0,
            line_y: 0.0,
            leading: 0.0,
        }
    }
}

impl VerticalState {
    fn page_y(&self) -> f32 {
        self.ctm_scale * self.line_y + self.ctm_offset
    }

    fn next_line(&mut self) {
        self.line_y -= self.leading * self.line_scale;
    }
}

fn operand(operands: &[Object], index: usize) -> Option<f32> {
    operands.get(index).and_then(|o| o.as_float().ok())
}

fn positioned_fragments(content: &Content) -> Vec<TextFragment> {
    let mut state = VerticalState::default();
    let mut saved: Vec<VerticalState> = Vec::new();
    let mut fragments = Vec::new();

    let mut emit = |text: String, state: &VerticalState| {
        if is_readable(&text) {
            fragments.push(TextFragment::new(text, state.page_y()));
        }
    };

    for op in &content.operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => saved.push(state),
            "Q" => {
                if let Some(previous) = saved.pop() {
                    state = previous;
                }
            }
            "cm" => {
                if let (Some(d), Some(f)) = (operand(operands, 3), operand(operands, 5)) {
                    state.ctm_offset += f * state.ctm_scale;
                    state.ctm_scale *= d;
                }
            }
            "BT" => {
                state.line_y = 0.0;
                state.line_scale = 1.0;
            }
            "Tm" => {
                if let (Some(d), Some(f)) = (operand(operands, 3), operand(operands, 5)) {
                    state.line_scale = if d == 0.0 { 1.0 } else { d };
                    state.line_y = f;
                }
            }
            "Td" => {
                if let Some(ty) = operand(operands, 1) {
                    state.line_y += ty * state.line_scale;
                }
            }
            "TD" => {
                if let Some(ty) = operand(operands, 1) {
                    state.leading = -ty;
                    state.line_y += ty * state.line_scale;
                }
            }
            "TL" => {
                if let Some(leading) = operand(operands, 0) {
                    state.leading = leading;
                }
            }
            "T*" => state.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    emit(decode_pdf_string(bytes), &state);
                }
            }
            "'" => {
                state.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    emit(decode_pdf_string(bytes), &state);
                }
            }
            "\"" => {
                state.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    emit(decode_pdf_string(bytes), &state);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    emit(decode_tj_array(items), &state);
                }
            }
            _ => {}
        }
    }

    fragments
}

fn decode_tj_array(items: &[Object]) -> String {
    let mut text = String::new();
    for item in items {
        match item {
            Object::String(bytes, _) => text.push_str(&decode_pdf_string(bytes)),
            other => {
                if let Ok(adjust) = other.as_float() {
                    if adjust < TJ_SPACE_THRESHOLD && !text.ends_with(' ') {
                        text.push(' ');
                    }
                }
            }
        }
    }
    text
}

/// UTF-16BE when the string carries a byte-order mark, Latin-1 otherwise.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}

/// Rejects glyph-id soup from composite fonts.
fn is_readable(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 || text.trim().is_empty() {
        return false;
    }
    let control = text.chars().filter(|c| c.is_control()).count();
    control * 10 <= total * 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;
    use lopdf::StringFormat;

    fn text(s: &str) -> Object {
        Object::String(s.as_bytes().to_vec(), StringFormat::Literal)
    }

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn n(value: i64) -> Object {
        Object::Integer(value)
    }

    #[test]
    fn test_tracks_vertical_position() {
        let content = Content {
            operations: vec![
                op("BT", vec![]),
                op("Tm", vec![n(1), n(0), n(0), n(1), n(50), n(700)]),
                op("Tj", vec![text("Oct 21, 2025")]),
                op("Td", vec![n(0), n(-14)]),
                op("Tj", vec![text("Oct 22, 2025")]),
                op("TL", vec![n(12)]),
                op("T*", vec![]),
                op("TJ", vec![Object::Array(vec![text("Coffee"), n(-250), text("Shop")])]),
                op("ET", vec![]),
            ],
        };

        let fragments = positioned_fragments(&content);
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0], TextFragment::new("Oct 21, 2025", 700.0));
        assert_eq!(fragments[1], TextFragment::new("Oct 22, 2025", 686.0));
        assert_eq!(fragments[2], TextFragment::new("Coffee Shop", 674.0));
    }

    #[test]
    fn test_flipped_ctm_keeps_top_first_ordering() {
        let content = Content {
            operations: vec![
                op("q", vec![]),
                op("cm", vec![n(1), n(0), n(0), n(-1), n(0), n(792)]),
                op("BT", vec![]),
                op("Td", vec![n(0), n(100)]),
                op("Tj", vec![text("top")]),
                op("Td", vec![n(0), n(20)]),
                op("Tj", vec![text("below")]),
                op("ET", vec![]),
                op("Q", vec![]),
            ],
        };

        let fragments = positioned_fragments(&content);
        assert!(fragments[0].y > fragments[1].y);
    }

    #[test]
    fn test_decode_utf16_and_latin1() {
        assert_eq!(decode_pdf_string(&[0xFE, 0xFF, 0x00, 0x41, 0x00, 0xE9]), "Aé");
        assert_eq!(decode_pdf_string(b"Caf\xe9"), "Café");
    }

    #[test]
    fn test_rejects_glyph_ids() {
        assert!(!is_readable("\u{1}\u{2}\u{3}\u{4}"));
        assert!(is_readable("$4.50"));
    }

    #[test]
    fn test_synthetic_page_descends() {
        let page = synthetic_page("first\n\n second \nthird");
        let ys: Vec<f32> = page.fragments.iter().map(|f| f.y).collect();
        assert_eq!(page.fragments[1].text, "second");
        assert!(ys.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_load_rejects_garbage() {
        assert!(matches!(PdfExtractor::load(b"not a pdf"), Err(PdfError::Parse(_))));
    }
}
