// src/source/pdf.rs
//! PDF-backed [`DocumentSource`].
//!
//! Runs are recovered by interpreting the text and graphics-state operators
//! of each page's content stream. A run is a maximal sequence of shown
//! strings that share a font and size and are not separated by a line move.
//! Shown strings are decoded with the font's own encoding (standard one-byte
//! encodings or a `ToUnicode` CMap) as resolved by lopdf.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{decode_text_string, Dictionary, Document, Encoding, Object, ObjectId};

use super::{DocumentHandle, DocumentSource, StyleFlags, TextRun};
use crate::utils::error::DocumentError;

// TJ displacement (thousandths of an em) treated as a word gap
const TJ_SPACE_THRESHOLD: f32 = -200.0;

// FontDescriptor /Flags bits
const DESCRIPTOR_FIXED_PITCH: i64 = 1 << 0;
const DESCRIPTOR_SERIF: i64 = 1 << 1;
const DESCRIPTOR_ITALIC: i64 = 1 << 6;
const DESCRIPTOR_FORCE_BOLD: i64 = 1 << 18;

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfSource;

impl PdfSource {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentSource for PdfSource {
    type Handle = PdfHandle;

    fn open(&self, path: &Path) -> Result<PdfHandle, DocumentError> {
        let document = Document::load(path).map_err(|e| DocumentError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let pages = document.get_pages();
        tracing::debug!("Opened {} ({} pages)", path.display(), pages.len());
        Ok(PdfHandle { document, pages })
    }
}

pub struct PdfHandle {
    document: Document,
    pages: BTreeMap<u32, ObjectId>,
}

/// A font resource as seen by the interpreter.
struct PageFont<'a> {
    flags: StyleFlags,
    encoding: Option<Encoding<'a>>,
}

impl DocumentHandle for PdfHandle {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_runs(&self, page_number: u32) -> Result<Vec<TextRun>, DocumentError> {
        let page_id = *self
            .pages
            .get(&page_number)
            .ok_or(DocumentError::PageOutOfRange {
                page: page_number,
                count: self.page_count(),
            })?;

        let content_error = |reason: String| DocumentError::Content {
            page: page_number,
            reason,
        };

        let data = self
            .document
            .get_page_content(page_id)
            .map_err(|e| content_error(e.to_string()))?;
        let content = Content::decode(&data).map_err(|e| content_error(e.to_string()))?;
        let fonts = self
            .page_fonts(page_id)
            .map_err(|e| content_error(format!("font resources: {}", e)))?;

        let mut interpreter = TextInterpreter::new(&fonts);
        for operation in &content.operations {
            interpreter.apply(&operation.operator, &operation.operands);
        }
        let runs = interpreter.finish();
        tracing::trace!("Page {}: {} runs", page_number, runs.len());
        Ok(runs)
    }
}

impl PdfHandle {
    /// Font resources visible from the page (inherited ones included), keyed
    /// by resource name.
    fn page_fonts(&self, page_id: ObjectId) -> lopdf::Result<BTreeMap<Vec<u8>, PageFont<'_>>> {
        let fonts = self.document.get_page_fonts(page_id)?;

        Ok(fonts
            .into_iter()
            .map(|(name, font)| {
                let encoding = if font.type_is(b"Font") {
                    font.get_font_encoding(&self.document)
                        .map_err(|e| {
                            tracing::debug!(
                                "No usable encoding for font {}: {}",
                                String::from_utf8_lossy(&name),
                                e
                            )
                        })
                        .ok()
                } else {
                    None
                };
                let flags = self.font_style(font);
                (name, PageFont { flags, encoding })
            })
            .collect())
    }

    fn font_style(&self, font: &Dictionary) -> StyleFlags {
        let mut flags = font
            .get(b"BaseFont")
            .ok()
            .and_then(|n| n.as_name().ok())
            .map(|name| style_from_font_name(&String::from_utf8_lossy(name)))
            .unwrap_or(StyleFlags::empty());

        let descriptor_flags = font
            .get_deref(b"FontDescriptor", &self.document)
            .and_then(Object::as_dict)
            .and_then(|d| d.get(b"Flags"))
            .and_then(Object::as_i64)
            .unwrap_or(0);

        if descriptor_flags & DESCRIPTOR_FORCE_BOLD != 0 {
            flags |= StyleFlags::BOLD;
        }
        if descriptor_flags & DESCRIPTOR_ITALIC != 0 {
            flags |= StyleFlags::ITALIC;
        }
        if descriptor_flags & DESCRIPTOR_SERIF != 0 {
            flags |= StyleFlags::SERIFED;
        }
        if descriptor_flags & DESCRIPTOR_FIXED_PITCH != 0 {
            flags |= StyleFlags::MONOSPACED;
        }
        flags
    }
}

/// Infers style from a PostScript font name such as `ABCDEF+Helvetica-BoldOblique`.
pub fn style_from_font_name(name: &str) -> StyleFlags {
    let lower = name.to_lowercase();
    let mut flags = StyleFlags::empty();
    if ["bold", "black", "heavy", "semibold", "demi"]
        .iter()
        .any(|w| lower.contains(w))
    {
        flags |= StyleFlags::BOLD;
    }
    if lower.contains("italic") || lower.contains("oblique") {
        flags |= StyleFlags::ITALIC;
    }
    if lower.contains("courier") || lower.contains("mono") {
        flags |= StyleFlags::MONOSPACED;
    }
    if lower.contains("times") || (lower.contains("serif") && !lower.contains("sans")) {
        flags |= StyleFlags::SERIFED;
    }
    flags
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Affine product `m1 × m2` in PDF row-vector convention.
fn multiply(m1: &Matrix, m2: &Matrix) -> Matrix {
    let [a1, b1, c1, d1, e1, f1] = *m1;
    let [a2, b2, c2, d2, e2, f2] = *m2;
    [
        a1 * a2 + b1 * c2,
        a1 * b2 + b1 * d2,
        c1 * a2 + d1 * c2,
        c1 * b2 + d1 * d2,
        e1 * a2 + f1 * c2 + e2,
        e1 * b2 + f1 * d2 + f2,
    ]
}

fn matrix_operand(operands: &[Object]) -> Option<Matrix> {
    let values: Vec<f32> = operands.iter().filter_map(number).collect();
    <Matrix>::try_from(values.as_slice()).ok()
}

/// Minimal text-state machine over content stream operators.
struct TextInterpreter<'a, 'f> {
    fonts: &'a BTreeMap<Vec<u8>, PageFont<'f>>,
    font: Option<&'a PageFont<'f>>,
    font_name: Vec<u8>,
    font_size: f32,
    leading: f32,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    current: Option<TextRun>,
    runs: Vec<TextRun>,
}

impl<'a, 'f> TextInterpreter<'a, 'f> {
    fn new(fonts: &'a BTreeMap<Vec<u8>, PageFont<'f>>) -> Self {
        Self {
            fonts,
            font: None,
            font_name: Vec::new(),
            font_size: 0.0,
            leading: 0.0,
            ctm: IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            current: None,
            runs: Vec::new(),
        }
    }

    fn apply(&mut self, operator: &str, operands: &[Object]) {
        match operator {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                if let Some(ctm) = self.ctm_stack.pop() {
                    self.flush();
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(matrix) = matrix_operand(operands) {
                    self.flush();
                    self.ctm = multiply(&matrix, &self.ctm);
                }
            }
            "BT" => {
                self.flush();
                self.text_matrix = IDENTITY;
                self.line_matrix = IDENTITY;
            }
            "ET" => self.flush(),
            "Tf" => {
                let name = operands
                    .first()
                    .and_then(|n| n.as_name().ok())
                    .unwrap_or_default();
                let size = operands.get(1).and_then(number).unwrap_or(self.font_size);
                if name != self.font_name.as_slice() || size != self.font_size {
                    self.flush();
                }
                self.font = self.fonts.get(name);
                self.font_name = name.to_vec();
                self.font_size = size;
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(number) {
                    self.leading = leading;
                }
            }
            "Td" | "TD" => {
                let tx = operands.first().and_then(number).unwrap_or(0.0);
                let ty = operands.get(1).and_then(number).unwrap_or(0.0);
                if operator == "TD" {
                    self.leading = -ty;
                }
                self.move_line(tx, ty);
            }
            "T*" => self.move_line(0.0, -self.leading),
            "Tm" => {
                if let Some(matrix) = matrix_operand(operands) {
                    self.flush();
                    self.text_matrix = matrix;
                    self.line_matrix = matrix;
                }
            }
            "Tj" => {
                if let Some(string) = operands.first() {
                    let text = self.decode(string);
                    self.show(&text);
                }
            }
            "'" => {
                self.move_line(0.0, -self.leading);
                if let Some(string) = operands.first() {
                    let text = self.decode(string);
                    self.show(&text);
                }
            }
            "\"" => {
                self.move_line(0.0, -self.leading);
                if let Some(string) = operands.get(2) {
                    let text = self.decode(string);
                    self.show(&text);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let mut text = String::new();
                    for item in items {
                        match item {
                            Object::String(..) => text.push_str(&self.decode(item)),
                            other => {
                                if number(other).is_some_and(|n| n <= TJ_SPACE_THRESHOLD)
                                    && !text.ends_with(' ')
                                {
                                    text.push(' ');
                                }
                            }
                        }
                    }
                    self.show(&text);
                }
            }
            _ => {}
        }
    }

    /// Decodes a shown string with the current font's encoding. Strings shown
    /// without a resolvable font encoding are read as PDF text strings.
    fn decode(&self, string: &Object) -> String {
        let Object::String(bytes, _) = string else {
            return String::new();
        };
        if let Some(encoding) = self.font.and_then(|f| f.encoding.as_ref()) {
            match Document::decode_text(encoding, bytes) {
                Ok(text) => return text,
                Err(e) => tracing::trace!("Font encoding could not decode string: {}", e),
            }
        }
        decode_text_string(string).unwrap_or_default()
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.flush();
        let [a, b, c, d, e, f] = self.line_matrix;
        self.line_matrix = [a, b, c, d, e + tx * a + ty * c, f + tx * b + ty * d];
        self.text_matrix = self.line_matrix;
    }

    /// Font size in device space: `Tf` size scaled by the vertical extent of
    /// the text matrix composed with the CTM.
    fn effective_size(&self) -> f32 {
        let [_, b, _, d, _, _] = multiply(&self.text_matrix, &self.ctm);
        let scale = (b * b + d * d).sqrt();
        self.font_size * if scale > 0.0 { scale } else { 1.0 }
    }

    fn show(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.current.as_mut() {
            Some(run) => run.text.push_str(text),
            None => {
                self.current = Some(TextRun {
                    text: text.to_string(),
                    font_size: self.effective_size(),
                    flags: self.font.map(|f| f.flags).unwrap_or(StyleFlags::empty()),
                    origin: (self.text_matrix[4], self.text_matrix[5]),
                });
            }
        }
    }

    fn flush(&mut self) {
        if let Some(run) = self.current.take() {
            self.runs.push(run);
        }
    }

    fn finish(mut self) -> Vec<TextRun> {
        self.flush();
        self.runs
    }
}
