//! Page text extraction from PDF using lopdf
//!
//! Each page's content stream is walked in stream order and split into lines
//! wherever the text position moves to a new baseline, so a page comes out as
//! the ordered line array the field extractor indexes into.

use crate::ImportError;
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::Path;

/// Baseline movement (in device space units) treated as staying on the same line
const Y_TOLERANCE: f32 = 3.0;

/// One page of extracted text
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,
    pub lines: Vec<String>,
}

impl Page {
    /// Split page text into lines on `\n`
    pub fn from_text(number: u32, text: &str) -> Self {
        Self {
            number,
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }
}

/// Extract every page of a PDF file
pub fn extract_pages<P: AsRef<Path>>(path: P) -> Result<Vec<Page>, ImportError> {
    let doc = Document::load(path)?;
    extract_pages_from_doc(&doc)
}

/// Extract every page of a PDF held in memory
pub fn extract_pages_mem(buffer: &[u8]) -> Result<Vec<Page>, ImportError> {
    let doc = Document::load_mem(buffer)?;
    extract_pages_from_doc(&doc)
}

/// Open a document for the import run.
///
/// A document that cannot be opened or decoded is logged and yields `None`;
/// the caller treats it as having no pages.
pub fn load_document<P: AsRef<Path>>(path: P) -> Option<Vec<Page>> {
    let path = path.as_ref();
    match extract_pages(path) {
        Ok(pages) => Some(pages),
        Err(e) => {
            log::error!("There has been an error with opening file: {}", path.display());
            log::error!("{}", e);
            None
        }
    }
}

fn extract_pages_from_doc(doc: &Document) -> Result<Vec<Page>, ImportError> {
    doc.get_pages()
        .into_iter()
        .map(|(number, page_id)| {
            let text = extract_page_text(doc, page_id)?;
            Ok(Page::from_text(number, &text))
        })
        .collect()
}

/// Accumulates text runs into lines
#[derive(Default)]
struct LineBuilder {
    text: String,
    current: String,
}

impl LineBuilder {
    fn push(&mut self, run: &str) {
        if !self.current.is_empty() && !run.starts_with(' ') && !self.current.ends_with(' ') {
            self.current.push(' ');
        }
        self.current.push_str(run);
    }

    fn push_inline(&mut self, run: &str) {
        self.current.push_str(run);
    }

    fn break_line(&mut self) {
        let line = self.current.trim();
        if !line.is_empty() {
            if !self.text.is_empty() {
                self.text.push('\n');
            }
            self.text.push_str(line);
        }
        self.current.clear();
    }

    fn finish(mut self) -> String {
        self.break_line();
        self.text
    }
}

/// Multiply two 2D transformation matrices `[a, b, c, d, e, f]`
fn multiply_matrices(m1: &[f32; 6], m2: &[f32; 6]) -> [f32; 6] {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn translation(tx: f32, ty: f32) -> [f32; 6] {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

/// Walk one page's content stream and return its text, one line per baseline.
///
/// Baselines are compared in device space (text matrix through the CTM), so
/// scaled text matrices with small `Td` offsets still break lines.
fn extract_page_text(doc: &Document, page_id: ObjectId) -> Result<String, ImportError> {
    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
    let content_data = doc.get_page_content(page_id)?;
    let content = Content::decode(&content_data)?;

    let mut lines = LineBuilder::default();
    let mut current_font: Vec<u8> = Vec::new();

    let mut ctm = IDENTITY;
    let mut ctm_stack: Vec<[f32; 6]> = Vec::new();
    let mut text_matrix = IDENTITY;
    let mut line_matrix = IDENTITY;
    let mut leading = 0.0f32;
    // Device-space baseline of the last shown run on the current line
    let mut last_y: Option<f32> = None;
    // Within a single show operator the runs are glued, across operators on
    // the same baseline they are space-separated.
    let mut run_started = false;

    for op in &content.operations {
        let text = match op.operator.as_str() {
            "q" => {
                ctm_stack.push(ctm);
                None
            }
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    ctm = saved;
                }
                None
            }
            "cm" => {
                if op.operands.len() >= 6 {
                    let mut m = IDENTITY;
                    for (i, operand) in op.operands.iter().take(6).enumerate() {
                        m[i] = get_number(operand).unwrap_or(IDENTITY[i]);
                    }
                    ctm = multiply_matrices(&m, &ctm);
                }
                None
            }
            "BT" => {
                text_matrix = IDENTITY;
                line_matrix = IDENTITY;
                run_started = false;
                None
            }
            "ET" => {
                lines.break_line();
                run_started = false;
                last_y = None;
                None
            }
            "Tf" => {
                if let Some(Ok(name)) = op.operands.first().map(Object::as_name) {
                    current_font = name.to_vec();
                }
                None
            }
            "TL" => {
                leading = op.operands.first().and_then(get_number).unwrap_or(0.0);
                None
            }
            "Td" | "TD" => {
                let tx = op.operands.first().and_then(get_number).unwrap_or(0.0);
                let ty = op.operands.get(1).and_then(get_number).unwrap_or(0.0);
                if op.operator == "TD" {
                    leading = -ty;
                }
                line_matrix = multiply_matrices(&translation(tx, ty), &line_matrix);
                text_matrix = line_matrix;
                None
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    for (i, operand) in op.operands.iter().take(6).enumerate() {
                        text_matrix[i] = get_number(operand).unwrap_or(IDENTITY[i]);
                    }
                    line_matrix = text_matrix;
                }
                None
            }
            "T*" => {
                line_matrix = multiply_matrices(&translation(0.0, -leading), &line_matrix);
                text_matrix = line_matrix;
                lines.break_line();
                run_started = false;
                None
            }
            "Tj" => op
                .operands
                .first()
                .and_then(|o| decode_operand(o, doc, &fonts, &current_font)),
            "TJ" => match op.operands.first().map(Object::as_array) {
                Some(Ok(array)) => Some(
                    array
                        .iter()
                        .filter_map(|item| decode_operand(item, doc, &fonts, &current_font))
                        .collect(),
                ),
                _ => None,
            },
            "'" | "\"" => {
                line_matrix = multiply_matrices(&translation(0.0, -leading), &line_matrix);
                text_matrix = line_matrix;
                lines.break_line();
                run_started = false;
                // `"` carries word and character spacing before the string
                op.operands
                    .last()
                    .and_then(|o| decode_operand(o, doc, &fonts, &current_font))
            }
            _ => None,
        };

        let Some(text) = text else {
            continue;
        };
        if text.is_empty() {
            continue;
        }

        let y = multiply_matrices(&text_matrix, &ctm)[5];
        if last_y.is_some_and(|prev| (y - prev).abs() > Y_TOLERANCE) {
            lines.break_line();
            run_started = false;
        }
        last_y = Some(y);
        push_run(&mut lines, &text, &mut run_started);
    }

    Ok(lines.finish())
}

fn push_run(lines: &mut LineBuilder, text: &str, run_started: &mut bool) {
    if *run_started {
        lines.push(text);
    } else {
        lines.push_inline(text);
    }
    *run_started = true;
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Decode a string operand through the current font's encoding
fn decode_operand(
    obj: &Object,
    doc: &Document,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    current_font: &[u8],
) -> Option<String> {
    let Object::String(bytes, _) = obj else {
        return None;
    };

    if let Some(font_dict) = fonts.get(current_font) {
        if let Ok(encoding) = font_dict.get_font_encoding(doc) {
            if let Ok(text) = Document::decode_text(&encoding, bytes) {
                return Some(text);
            }
        }
    }

    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return Some(String::from_utf16_lossy(&utf16));
    }

    // Latin-1
    Some(bytes.iter().map(|&b| b as char).collect())
}
