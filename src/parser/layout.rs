//! Layout analysis for PDF pages.
//!
//! Walks a page content stream keeping track of the text and graphics state,
//! produces positioned text spans, then groups them into lines and blocks.
//! Rectangles handed to the model use a top-left origin in points.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Document as LopdfDocument, Object, ObjectId};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::model::{Rect, TextBlock};

/// TJ adjustments beyond this many thousandths of an em are word gaps.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Glyph width used when a font carries no metrics, in thousandths of an em.
const FALLBACK_GLYPH_WIDTH: f32 = 500.0;

/// A text span with position and style information, in PDF user space.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Advance width of the text
    pub width: f32,
    /// Effective font size in points
    pub font_size: f32,
}

impl TextSpan {
    pub fn new(text: String, x: f32, y: f32, width: f32, font_size: f32) -> Self {
        Self {
            text,
            x,
            y,
            width,
            font_size,
        }
    }

    /// Get the bottom Y coordinate (approximate, based on font size).
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2
    }

    /// Get the top Y coordinate (approximate, based on font size).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// A text line composed of spans sharing a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size in this line
    pub font_size: f32,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        if spans.is_empty() {
            return Self {
                spans: vec![],
                y: 0.0,
                x: 0.0,
                font_size: 0.0,
            };
        }

        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

        // Dominant font size, weighted by text length
        let total_chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let weighted_size: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.len() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted_size / total_chars as f32
        } else {
            spans[0].font_size
        };

        let y = spans[0].y;
        let x = spans[0].x;

        Self {
            spans,
            y,
            x,
            font_size,
        }
    }

    /// Combined text of all spans, with a space wherever the horizontal gap
    /// between two spans is wider than a fifth of a character.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = span.x - prev.right();

                let char_count = span.text.chars().count();
                let avg_char_width = if char_count > 0 && span.width > 0.0 {
                    span.width / char_count as f32
                } else {
                    span.font_size * 0.5
                };

                let spaced = prev.text.ends_with(char::is_whitespace)
                    || span.text.starts_with(char::is_whitespace);
                if gap > avg_char_width * 0.2 && !spaced {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }

        result
    }

    fn top(&self) -> f32 {
        self.spans
            .iter()
            .map(TextSpan::top)
            .fold(f32::MIN, f32::max)
    }

    fn bottom(&self) -> f32 {
        self.spans
            .iter()
            .map(TextSpan::bottom)
            .fold(f32::MAX, f32::min)
    }

    fn right(&self) -> f32 {
        self.spans
            .iter()
            .map(TextSpan::right)
            .fold(f32::MIN, f32::max)
    }
}

/// Visible page area, in PDF user space (bottom-left origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl PageBox {
    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }

    /// Overlap of two boxes, `None` when they do not intersect.
    pub fn intersect(&self, other: &PageBox) -> Option<PageBox> {
        let b = PageBox {
            llx: self.llx.max(other.llx),
            lly: self.lly.max(other.lly),
            urx: self.urx.min(other.urx),
            ury: self.ury.min(other.ury),
        };
        (b.width() > 0.0 && b.height() > 0.0).then_some(b)
    }

    /// Convert user-space coordinates to a top-left based rectangle.
    fn to_rect(self, left: f32, bottom: f32, right: f32, top: f32) -> Rect {
        Rect::new(
            left - self.llx,
            self.ury - top,
            right - self.llx,
            self.ury - bottom,
        )
    }
}

/// Layout analyzer for extracting positioned text from PDF pages.
pub struct LayoutAnalyzer<'a> {
    doc: &'a LopdfDocument,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create a new layout analyzer.
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self { doc }
    }

    /// Extract text blocks from a page in reading order.
    pub fn extract_page_blocks(&self, page_id: ObjectId, page_box: PageBox) -> Result<Vec<TextBlock>> {
        let spans = self.extract_page_spans(page_id)?;
        let lines = group_spans_into_lines(spans);

        Ok(group_lines_into_blocks(lines)
            .into_iter()
            .map(|block| {
                let left = block.iter().map(|l| l.x).fold(f32::MAX, f32::min);
                let right = block.iter().map(TextLine::right).fold(f32::MIN, f32::max);
                let top = block.iter().map(TextLine::top).fold(f32::MIN, f32::max);
                let bottom = block.iter().map(TextLine::bottom).fold(f32::MAX, f32::min);
                let text = block
                    .iter()
                    .map(TextLine::text)
                    .collect::<Vec<_>>()
                    .join("\n");
                TextBlock::new(page_box.to_rect(left, bottom, right, top), text)
            })
            .collect())
    }

    /// Extract text spans from a page with position and font information.
    pub fn extract_page_spans(&self, page_id: ObjectId) -> Result<Vec<TextSpan>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let metrics: HashMap<Vec<u8>, FontMetrics> = lopdf_fonts
            .iter()
            .map(|(name, dict)| (name.clone(), FontMetrics::from_dict(self.doc, dict)))
            .collect();

        let content = self.get_page_content(page_id)?;
        self.parse_content_stream(&content, &lopdf_fonts, &metrics)
    }

    /// Get the decompressed page content stream.
    fn get_page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without a content stream is blank
            Err(_) => return Ok(Vec::new()),
        };

        match resolve(self.doc, contents) {
            Object::Stream(s) => Ok(stream_bytes(s)),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Stream(s) = resolve(self.doc, obj) {
                        content.extend_from_slice(&stream_bytes(s));
                        content.push(b' ');
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    /// Run the content stream through the text/graphics state machine.
    fn parse_content_stream(
        &self,
        content: &[u8],
        lopdf_fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
        metrics: &HashMap<Vec<u8>, FontMetrics>,
    ) -> Result<Vec<TextSpan>> {
        if content.is_empty() {
            return Ok(Vec::new());
        }

        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let fallback = FontMetrics::default();
        let mut spans = Vec::new();
        let mut gstack: Vec<Matrix> = Vec::new();
        let mut ctm = Matrix::IDENTITY;
        let mut ts = TextState::default();
        let mut in_text_block = false;

        for op in content.operations {
            let num = |i: usize| op.operands.get(i).and_then(get_number);

            match op.operator.as_str() {
                "q" => gstack.push(ctm),
                "Q" => ctm = gstack.pop().unwrap_or(Matrix::IDENTITY),
                "cm" => {
                    if op.operands.len() >= 6 {
                        let m = Matrix::new(
                            num(0).unwrap_or(1.0),
                            num(1).unwrap_or(0.0),
                            num(2).unwrap_or(0.0),
                            num(3).unwrap_or(1.0),
                            num(4).unwrap_or(0.0),
                            num(5).unwrap_or(0.0),
                        );
                        ctm = m.multiply(&ctm);
                    }
                }
                "BT" => {
                    in_text_block = true;
                    ts.tm = Matrix::IDENTITY;
                    ts.tlm = Matrix::IDENTITY;
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    if let Some(Object::Name(font_name)) = op.operands.first() {
                        ts.font = font_name.clone();
                    }
                    ts.size = num(1).unwrap_or(12.0);
                }
                "TL" => ts.leading = num(0).unwrap_or(0.0),
                "Tc" => ts.char_spacing = num(0).unwrap_or(0.0),
                "Tw" => ts.word_spacing = num(0).unwrap_or(0.0),
                "Tz" => ts.h_scale = num(0).unwrap_or(100.0) / 100.0,
                "Td" => ts.move_line(num(0).unwrap_or(0.0), num(1).unwrap_or(0.0)),
                "TD" => {
                    let ty = num(1).unwrap_or(0.0);
                    ts.leading = -ty;
                    ts.move_line(num(0).unwrap_or(0.0), ty);
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        ts.tlm = Matrix::new(
                            num(0).unwrap_or(1.0),
                            num(1).unwrap_or(0.0),
                            num(2).unwrap_or(0.0),
                            num(3).unwrap_or(1.0),
                            num(4).unwrap_or(0.0),
                            num(5).unwrap_or(0.0),
                        );
                        ts.tm = ts.tlm;
                    }
                }
                "T*" => ts.next_line(),
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "'" || op.operator == "\"" {
                        if op.operator == "\"" {
                            ts.word_spacing = num(0).unwrap_or(ts.word_spacing);
                            ts.char_spacing = num(1).unwrap_or(ts.char_spacing);
                        }
                        ts.next_line();
                    }
                    if !in_text_block {
                        continue;
                    }

                    let items: Vec<&Object> = match (op.operator.as_str(), op.operands.as_slice()) {
                        ("TJ", [Object::Array(arr), ..]) => arr.iter().collect(),
                        ("\"", [_, _, s, ..]) => vec![s],
                        (_, [s, ..]) => vec![s],
                        _ => Vec::new(),
                    };

                    let font_metrics = metrics.get(&ts.font).unwrap_or(&fallback);
                    let encoding = lopdf_fonts
                        .get(&ts.font)
                        .and_then(|f| f.get_font_encoding(self.doc).ok());

                    let start = ts.tm.multiply(&ctm);
                    let mut text = String::new();
                    let mut advance = 0.0f32;

                    for item in items {
                        match item {
                            Object::String(bytes, _) => {
                                let decoded = match encoding {
                                    Some(ref enc) => LopdfDocument::decode_text(enc, bytes)
                                        .unwrap_or_else(|_| decode_text_simple(bytes)),
                                    None => decode_text_simple(bytes),
                                };
                                text.push_str(&decoded);
                                advance += font_metrics.advance(bytes, &ts);
                            }
                            Object::Integer(_) | Object::Real(_) => {
                                let adjustment = get_number(item).unwrap_or(0.0);
                                advance -= adjustment / 1000.0 * ts.size * ts.h_scale;
                                if -adjustment > TJ_SPACE_THRESHOLD
                                    && !text.is_empty()
                                    && !text.ends_with(char::is_whitespace)
                                {
                                    text.push(' ');
                                }
                            }
                            _ => {}
                        }
                    }

                    ts.advance(advance);

                    if !text.trim().is_empty() {
                        let (x, y) = start.transform(0.0, 0.0);
                        let scale = start.horizontal_scale();
                        let font_size = ts.size * start.vertical_scale();
                        spans.push(TextSpan::new(
                            text.nfkc().collect(),
                            x,
                            y,
                            advance * scale,
                            font_size,
                        ));
                    }
                }
                _ => {}
            }
        }

        log::debug!("Extracted {} text spans", spans.len());
        Ok(spans)
    }
}

/// Group spans into lines by baseline, top to bottom then left to right.
fn group_spans_into_lines(spans: Vec<TextSpan>) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    // Sort spans by Y (descending, since PDF Y is bottom-up) then X
    let mut spans = spans;
    spans.sort_by(|a, b| {
        let y_cmp = b.y.partial_cmp(&a.y).unwrap_or(std::cmp::Ordering::Equal);
        if y_cmp == std::cmp::Ordering::Equal {
            a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal)
        } else {
            y_cmp
        }
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current_line_spans: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;

        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current_line_spans.push(span),
            _ => {
                if !current_line_spans.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(
                        &mut current_line_spans,
                    )));
                }
                current_y = Some(span.y);
                current_line_spans.push(span);
            }
        }
    }

    if !current_line_spans.is_empty() {
        lines.push(TextLine::from_spans(current_line_spans));
    }

    lines
}

/// Group consecutive lines into blocks based on spacing and indentation.
fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<Vec<TextLine>> {
    let avg_spacing = calculate_avg_line_spacing(&lines);
    let mut blocks: Vec<Vec<TextLine>> = Vec::new();

    for line in lines {
        match blocks.last_mut() {
            Some(block) if !should_break_block(block, &line, avg_spacing) => block.push(line),
            _ => blocks.push(vec![line]),
        }
    }

    blocks
}

/// Calculate average line spacing.
fn calculate_avg_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }

    spacings.iter().sum::<f32>() / spacings.len() as f32
}

/// Determine if `curr_line` starts a new block after `block`.
fn should_break_block(block: &[TextLine], curr_line: &TextLine, avg_spacing: f32) -> bool {
    let (Some(first_line), Some(prev_line)) = (block.first(), block.last()) else {
        return true;
    };

    // Large spacing indicates new paragraph
    let spacing = (prev_line.y - curr_line.y).abs();
    if spacing > avg_spacing * 1.5 {
        return true;
    }

    // Significant font size change
    if (prev_line.font_size - curr_line.font_size).abs() > 1.0 {
        return true;
    }

    // Significant left margin change (indentation)
    if (prev_line.x - curr_line.x).abs() > 20.0 {
        return true;
    }

    // Hanging indent: back to the outdented start of the block
    // (list items, bibliography entries)
    curr_line.x < prev_line.x - 1.0
        && first_line.x < prev_line.x - 1.0
        && (curr_line.x - first_line.x).abs() <= 1.0
}

/// Widths of a font's glyphs, in thousandths of an em.
#[derive(Debug, Clone)]
struct FontMetrics {
    first_char: u32,
    widths: Vec<f32>,
    cid_widths: HashMap<u32, f32>,
    /// `[c_first c_last w]` runs of the CID `W` array, inclusive
    cid_ranges: Vec<(u32, u32, f32)>,
    default_width: f32,
    two_byte: bool,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            cid_ranges: Vec::new(),
            default_width: FALLBACK_GLYPH_WIDTH,
            two_byte: false,
        }
    }
}

impl FontMetrics {
    fn from_dict(doc: &LopdfDocument, font: &lopdf::Dictionary) -> Self {
        let subtype = font
            .get(b"Subtype")
            .and_then(Object::as_name)
            .unwrap_or(b"");

        if subtype == b"Type0" {
            return Self::from_type0(doc, font);
        }

        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(get_number)
            .unwrap_or(0.0) as u32;
        let widths: Vec<f32> = font
            .get(b"Widths")
            .ok()
            .map(|w| resolve(doc, w))
            .and_then(|w| w.as_array().ok())
            .map(|arr| arr.iter().map(|w| get_number(resolve(doc, w)).unwrap_or(0.0)).collect())
            .unwrap_or_default();
        let missing_width = font
            .get(b"FontDescriptor")
            .ok()
            .map(|d| resolve(doc, d))
            .and_then(|d| d.as_dict().ok())
            .and_then(|d| d.get(b"MissingWidth").ok())
            .and_then(get_number)
            .filter(|w| *w > 0.0)
            .unwrap_or(FALLBACK_GLYPH_WIDTH);

        Self {
            first_char,
            widths,
            cid_widths: HashMap::new(),
            cid_ranges: Vec::new(),
            default_width: missing_width,
            two_byte: false,
        }
    }

    fn from_type0(doc: &LopdfDocument, font: &lopdf::Dictionary) -> Self {
        let descendant = font
            .get(b"DescendantFonts")
            .ok()
            .map(|d| resolve(doc, d))
            .and_then(|d| d.as_array().ok())
            .and_then(|arr| arr.first())
            .map(|d| resolve(doc, d))
            .and_then(|d| d.as_dict().ok());

        let mut metrics = Self {
            default_width: 1000.0,
            two_byte: true,
            ..Self::default()
        };

        let Some(descendant) = descendant else {
            return metrics;
        };

        if let Some(dw) = descendant.get(b"DW").ok().and_then(get_number) {
            metrics.default_width = dw;
        }

        let w = descendant
            .get(b"W")
            .ok()
            .map(|w| resolve(doc, w))
            .and_then(|w| w.as_array().ok());
        if let Some(w) = w {
            metrics.read_cid_widths(doc, w);
        }

        metrics
    }

    /// Read a CID `W` array: `[c [w1 w2 ...]]` or `[c_first c_last w]`.
    fn read_cid_widths(&mut self, doc: &LopdfDocument, w: &[Object]) {
        let mut i = 0;
        while i < w.len() {
            let Some(first) = get_number(resolve(doc, &w[i])) else {
                break;
            };
            let first = first as u32;
            match w.get(i + 1).map(|o| resolve(doc, o)) {
                Some(Object::Array(list)) => {
                    for (offset, width) in list.iter().enumerate() {
                        let cid = u32::try_from(offset)
                            .ok()
                            .and_then(|offset| first.checked_add(offset));
                        if let (Some(cid), Some(width)) = (cid, get_number(width)) {
                            self.cid_widths.insert(cid, width);
                        }
                    }
                    i += 2;
                }
                Some(last) => {
                    let last = get_number(last).unwrap_or(first as f32) as u32;
                    let width = w
                        .get(i + 2)
                        .and_then(|o| get_number(resolve(doc, o)))
                        .unwrap_or(self.default_width);
                    self.cid_ranges.push((first, last.max(first), width));
                    i += 3;
                }
                None => break,
            }
        }
    }

    fn glyph_width(&self, code: u32) -> f32 {
        if self.two_byte {
            return self
                .cid_widths
                .get(&code)
                .copied()
                .or_else(|| {
                    self.cid_ranges
                        .iter()
                        .find(|(first, last, _)| (*first..=*last).contains(&code))
                        .map(|(_, _, width)| *width)
                })
                .unwrap_or(self.default_width);
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(self.default_width)
    }

    /// Horizontal advance of a shown string in unscaled text space.
    fn advance(&self, bytes: &[u8], ts: &TextState) -> f32 {
        let codes: Vec<(u32, bool)> = if self.two_byte {
            bytes
                .chunks(2)
                .map(|c| {
                    let code = c.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
                    (code, false)
                })
                .collect()
        } else {
            bytes.iter().map(|b| (u32::from(*b), *b == b' ')).collect()
        };

        codes
            .into_iter()
            .map(|(code, is_space)| {
                let word_spacing = if is_space { ts.word_spacing } else { 0.0 };
                (self.glyph_width(code) / 1000.0 * ts.size + ts.char_spacing + word_spacing)
                    * ts.h_scale
            })
            .sum()
    }
}

/// Text state parameters that survive between text objects.
#[derive(Debug, Clone)]
struct TextState {
    tm: Matrix,
    tlm: Matrix,
    font: Vec<u8>,
    size: f32,
    leading: f32,
    char_spacing: f32,
    word_spacing: f32,
    h_scale: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            font: Vec::new(),
            size: 12.0,
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translation(tx, ty).multiply(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn advance(&mut self, tx: f32) {
        self.tm = Matrix::translation(tx, 0.0).multiply(&self.tm);
    }
}

/// Affine transformation `[a b c d e f]`, applied to row vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn transform(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Follow an indirect reference, returning the object itself otherwise.
/// Decoded stream data; streams without `/Filter` are stored as is.
fn stream_bytes(stream: &lopdf::Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

pub(crate) fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Helper to extract number from PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Decode a PDF string without font information: UTF-16BE with BOM,
/// then UTF-8, then Latin-1.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, y: f32, width: f32) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, width, 12.0)
    }

    #[test]
    fn test_matrix_concatenation() {
        // Translate then scale: the translation is scaled too
        let m = Matrix::translation(10.0, 20.0).multiply(&Matrix::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0));
        assert_eq!(m.transform(0.0, 0.0), (20.0, 40.0));
        assert_eq!(m.transform(1.0, 1.0), (22.0, 42.0));
        assert_eq!(m.horizontal_scale(), 2.0);
    }

    #[test]
    fn test_text_state_lines() {
        let mut ts = TextState::default();
        ts.move_line(72.0, 700.0);
        ts.leading = 14.0;
        ts.next_line();
        assert_eq!(ts.tm.transform(0.0, 0.0), (72.0, 686.0));
        ts.advance(30.0);
        assert_eq!(ts.tm.transform(0.0, 0.0), (102.0, 686.0));
        // Line start is unaffected by advancing
        assert_eq!(ts.tlm.transform(0.0, 0.0), (72.0, 686.0));
    }

    #[test]
    fn test_font_metrics_simple_widths() {
        let metrics = FontMetrics {
            first_char: 32,
            widths: vec![250.0, 300.0],
            ..FontMetrics::default()
        };
        let ts = TextState {
            size: 10.0,
            ..TextState::default()
        };
        assert_eq!(metrics.glyph_width(33), 300.0);
        assert_eq!(metrics.glyph_width(100), FALLBACK_GLYPH_WIDTH);
        assert_eq!(metrics.advance(b" !", &ts), 5.5);
    }

    #[test]
    fn test_cid_width_runs() {
        let doc = LopdfDocument::new();
        let mut metrics = FontMetrics {
            default_width: 1000.0,
            two_byte: true,
            ..FontMetrics::default()
        };
        let w: Vec<Object> = vec![
            Object::Integer(1),
            Object::Array(vec![Object::Integer(250), Object::Integer(300)]),
            Object::Integer(0),
            Object::Integer(4_294_967_295),
            Object::Integer(500),
        ];
        metrics.read_cid_widths(&doc, &w);

        assert_eq!(metrics.glyph_width(1), 250.0);
        assert_eq!(metrics.glyph_width(2), 300.0);
        assert_eq!(metrics.glyph_width(70_000), 500.0);
        assert!(metrics.cid_widths.len() <= 2);
        assert_eq!(metrics.cid_ranges, vec![(0, u32::MAX, 500.0)]);
    }

    #[test]
    fn test_word_spacing_applies_to_spaces() {
        let metrics = FontMetrics::default();
        let ts = TextState {
            size: 10.0,
            word_spacing: 2.0,
            ..TextState::default()
        };
        assert_eq!(metrics.advance(b"a a", &ts), 17.0);
    }

    #[test]
    fn test_line_text_inserts_spaces_at_gaps() {
        let line = TextLine::from_spans(vec![span("world", 60.0, 700.0, 30.0), span("Hello", 20.0, 700.0, 30.0)]);
        assert_eq!(line.text(), "Hello world");

        let tight = TextLine::from_spans(vec![span("Hel", 20.0, 700.0, 18.0), span("lo", 38.0, 700.0, 12.0)]);
        assert_eq!(tight.text(), "Hello");
    }

    #[test]
    fn test_group_spans_into_lines_reading_order() {
        let lines = group_spans_into_lines(vec![
            span("body", 72.0, 600.0, 24.0),
            span("12", 290.0, 780.0, 12.0),
            span("more", 110.0, 600.5, 24.0),
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "12");
        assert_eq!(lines[1].text(), "body more");
    }

    #[test]
    fn test_hanging_indent_breaks_blocks() {
        let lines: Vec<TextLine> = [
            ("1. Иванов И. И. Первая", 72.0, 700.0),
            ("книга. 2001.", 90.0, 686.0),
            ("2. Петров П. П. Вторая", 72.0, 672.0),
            ("книга. 2002.", 90.0, 658.0),
        ]
        .iter()
        .map(|(t, x, y)| TextLine::from_spans(vec![span(t, *x, *y, 100.0)]))
        .collect();

        let blocks = group_lines_into_blocks(lines);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[1][0].text().starts_with("2."));
    }

    #[test]
    fn test_paragraph_indent_keeps_block() {
        let lines: Vec<TextLine> = [
            ("Первая строка абзаца", 90.0, 700.0),
            ("вторая строка", 72.0, 686.0),
            ("третья строка", 72.0, 672.0),
        ]
        .iter()
        .map(|(t, x, y)| TextLine::from_spans(vec![span(t, *x, *y, 100.0)]))
        .collect();

        assert_eq!(group_lines_into_blocks(lines).len(), 1);
    }

    #[test]
    fn test_page_box_to_rect() {
        let page_box = PageBox {
            llx: 0.0,
            lly: 0.0,
            urx: 595.0,
            ury: 842.0,
        };
        let rect = page_box.to_rect(72.0, 700.0, 300.0, 712.0);
        assert_eq!(rect, Rect::new(72.0, 130.0, 300.0, 142.0));
        assert_eq!(page_box.width(), 595.0);
    }

    #[test]
    fn test_page_box_intersect() {
        let media = PageBox {
            llx: 0.0,
            lly: 0.0,
            urx: 612.0,
            ury: 792.0,
        };
        let crop = PageBox {
            llx: 36.0,
            lly: 36.0,
            urx: 700.0,
            ury: 756.0,
        };
        let visible = media.intersect(&crop).unwrap();
        assert_eq!((visible.llx, visible.urx, visible.ury), (36.0, 612.0, 756.0));

        let outside = PageBox {
            llx: 700.0,
            lly: 0.0,
            urx: 800.0,
            ury: 100.0,
        };
        assert!(media.intersect(&outside).is_none());
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
        assert_eq!(decode_text_simple(&[0x48, 0xE9]), "Hé");
    }
}
