//! PDF document parser using lopdf.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::detect::{sniff_bytes, sniff_path};
use crate::error::{Error, Result};
use crate::model::{Document, Metadata, Page, Toc, TocEntry};

use super::annotations::{extract_page_annotations, DestinationResolver};
use super::layout::{decode_text_simple, get_number, resolve, LayoutAnalyzer, PageBox};
use super::options::{ErrorMode, ExtractMode, ParseOptions};

/// Inheritance chains longer than this are treated as cyclic.
const MAX_PARENT_DEPTH: usize = 64;

/// A4 in points, used when a page declares no usable MediaBox.
const DEFAULT_PAGE_BOX: PageBox = PageBox {
    llx: 0.0,
    lly: 0.0,
    urx: 595.276,
    ury: 841.89,
};

/// PDF document parser.
///
/// Holds the lopdf document for as long as the parser lives; [`parse`]
/// produces a detached [`Document`] snapshot.
///
/// [`parse`]: PdfParser::parse
pub struct PdfParser {
    doc: LopdfDocument,
    options: ParseOptions,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        sniff_path(path)?;

        let doc = LopdfDocument::load(path)?;
        log::info!("Opened {} ({} pages)", path.display(), doc.get_pages().len());
        Self::with_document(doc, options)
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        sniff_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Self::with_document(doc, options)
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    fn with_document(doc: LopdfDocument, options: ParseOptions) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { doc, options })
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Build the document snapshot.
    pub fn parse(&self) -> Result<Document> {
        let pages = self.doc.get_pages();
        let resolver = DestinationResolver::new(&self.doc, &pages);
        let analyzer = LayoutAnalyzer::new(&self.doc);

        let mut document = Document::new();
        document.metadata = self.extract_metadata();

        for (&page_num, &page_id) in &pages {
            document.add_page(self.parse_page(page_num, page_id, &analyzer, &resolver)?);
        }

        document.toc = self.extract_toc(&resolver);

        log::debug!(
            "Parsed {} pages, {} outline entries",
            document.page_count(),
            document.toc.len()
        );
        Ok(document)
    }

    /// Parse a single page.
    fn parse_page(
        &self,
        page_num: u32,
        page_id: ObjectId,
        analyzer: &LayoutAnalyzer<'_>,
        resolver: &DestinationResolver,
    ) -> Result<Page> {
        let page_box = self.page_box(page_id);
        // Displayed size; text coordinates stay in unrotated user space
        let (width, height) = match self.rotation(page_id) {
            90 | 270 => (page_box.height(), page_box.width()),
            _ => (page_box.width(), page_box.height()),
        };
        let mut page = Page::new(page_num, width, height);

        if self.options.extract_mode == ExtractMode::StructureOnly {
            return Ok(page);
        }

        match analyzer.extract_page_blocks(page_id, page_box) {
            Ok(blocks) => {
                for block in blocks {
                    page.add_block(block);
                }
            }
            Err(e) => {
                if self.options.error_mode == ErrorMode::Strict {
                    return Err(Error::TextExtract(format!("Page {}: {}", page_num, e)));
                }
                log::warn!("Failed to extract text from page {}: {}", page_num, e);
            }
        }

        let annotations = extract_page_annotations(&self.doc, page_id, page_box, resolver);
        page.links = annotations.links;
        page.annotations = annotations.annotations;

        Ok(page)
    }

    /// Visible area of a page: the CropBox clipped to the MediaBox, both
    /// inherited from ancestors when absent.
    fn page_box(&self, page_id: ObjectId) -> PageBox {
        let media = self
            .inherited(page_id, b"MediaBox")
            .and_then(|m| self.rect_box(m));
        let crop = self
            .inherited(page_id, b"CropBox")
            .and_then(|c| self.rect_box(c));

        match (media, crop) {
            (Some(media), Some(crop)) => media.intersect(&crop).unwrap_or(media),
            (Some(media), None) => media,
            (None, Some(crop)) => crop,
            (None, None) => {
                log::warn!("Page {:?} has no MediaBox, assuming A4", page_id);
                DEFAULT_PAGE_BOX
            }
        }
    }

    /// Clockwise page rotation in degrees, normalised to 0, 90, 180 or 270.
    fn rotation(&self, page_id: ObjectId) -> i64 {
        self.inherited(page_id, b"Rotate")
            .and_then(|r| r.as_i64().ok())
            .map_or(0, |r| r.rem_euclid(360) / 90 * 90)
    }

    /// Look up an inheritable page attribute, walking `/Parent` links.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = self.doc.get_dictionary(page_id).ok();

        for _ in 0..MAX_PARENT_DEPTH {
            let dict = current?;
            if let Ok(value) = dict.get(key) {
                return Some(resolve(&self.doc, value));
            }
            current = dict
                .get(b"Parent")
                .ok()
                .and_then(|p| p.as_reference().ok())
                .and_then(|id| self.doc.get_dictionary(id).ok());
        }
        None
    }

    fn rect_box(&self, obj: &Object) -> Option<PageBox> {
        let n: Vec<f32> = obj
            .as_array()
            .ok()?
            .iter()
            .take(4)
            .map(|o| get_number(resolve(&self.doc, o)))
            .collect::<Option<_>>()?;
        (n.len() == 4).then(|| PageBox {
            llx: n[0].min(n[2]),
            lly: n[1].min(n[3]),
            urx: n[0].max(n[2]),
            ury: n[1].max(n[3]),
        })
    }

    /// Extract document metadata.
    fn extract_metadata(&self) -> Metadata {
        let mut metadata = Metadata::with_version(self.doc.version.to_string());

        let info = self
            .doc
            .trailer
            .get(b"Info")
            .ok()
            .map(|i| resolve(&self.doc, i))
            .and_then(|i| i.as_dict().ok());

        if let Some(info_dict) = info {
            metadata.title = get_string_from_dict(info_dict, b"Title");
            metadata.author = get_string_from_dict(info_dict, b"Author");
            metadata.subject = get_string_from_dict(info_dict, b"Subject");
            metadata.keywords = get_string_from_dict(info_dict, b"Keywords");
            metadata.creator = get_string_from_dict(info_dict, b"Creator");
            metadata.producer = get_string_from_dict(info_dict, b"Producer");

            if let Some(date_str) = get_string_from_dict(info_dict, b"CreationDate") {
                metadata.created = parse_pdf_date(&date_str);
            }
            if let Some(date_str) = get_string_from_dict(info_dict, b"ModDate") {
                metadata.modified = parse_pdf_date(&date_str);
            }
        }

        metadata.encrypted = self.doc.is_encrypted();
        metadata
    }

    /// Flatten the outline into table-of-contents entries, depth first.
    fn extract_toc(&self, resolver: &DestinationResolver) -> Toc {
        let mut toc = Toc::new();

        let first = self
            .doc
            .catalog()
            .ok()
            .and_then(|catalog| catalog.get(b"Outlines").ok())
            .map(|o| resolve(&self.doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|outlines| outlines.get(b"First").ok())
            .and_then(|f| f.as_reference().ok());

        if let Some(first) = first {
            let mut visited = HashSet::new();
            self.extract_outline_items(first, 1, resolver, &mut visited, &mut toc);
        }

        toc
    }

    /// Walk an outline level through `/Next`, descending into `/First`.
    fn extract_outline_items(
        &self,
        first: ObjectId,
        level: u8,
        resolver: &DestinationResolver,
        visited: &mut HashSet<ObjectId>,
        toc: &mut Toc,
    ) {
        let mut current = Some(first);

        while let Some(item_ref) = current {
            if !visited.insert(item_ref) {
                log::warn!("Outline item {:?} visited twice, stopping", item_ref);
                return;
            }
            let Ok(item) = self.doc.get_dictionary(item_ref) else {
                return;
            };

            let title = get_string_from_dict(item, b"Title").unwrap_or_default();
            let page = self.outline_destination(item, resolver);
            toc.push(TocEntry::new(level, title, page));

            if let Some(child) = item.get(b"First").ok().and_then(|f| f.as_reference().ok()) {
                self.extract_outline_items(child, level.saturating_add(1), resolver, visited, toc);
            }

            current = item.get(b"Next").ok().and_then(|n| n.as_reference().ok());
        }
    }

    /// Get destination page from outline item.
    fn outline_destination(
        &self,
        item: &lopdf::Dictionary,
        resolver: &DestinationResolver,
    ) -> Option<u32> {
        if let Ok(dest) = item.get(b"Dest") {
            return resolver.resolve(&self.doc, dest);
        }

        let action = item
            .get(b"A")
            .ok()
            .map(|a| resolve(&self.doc, a))
            .and_then(|a| a.as_dict().ok())?;
        resolver.resolve(&self.doc, action.get(b"D").ok()?)
    }
}

/// Helper to get a string from a PDF dictionary.
fn get_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);

    // At minimum we need YYYY
    if s.len() < 4 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|dt| chrono::DateTime::from_naive_utc_and_offset(dt, chrono::Utc))
}
