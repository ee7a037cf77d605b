//! In-memory PDF fixtures built with lopdf.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// A4 in whole points.
pub const A4: [i64; 4] = [0, 0, 595, 842];

/// A line of text placed with `Td` in its own text object.
pub struct Line {
    pub text: &'static str,
    pub x: i64,
    pub y: i64,
    pub size: i64,
}

pub fn line(text: &'static str, x: i64, y: i64) -> Line {
    Line {
        text,
        x,
        y,
        size: 12,
    }
}

pub enum LinkTarget {
    /// `/Dest [page /Fit]`
    Page(usize),
    /// `/A << /S /GoTo /D [page /Fit] >>`
    GoTo(usize),
    /// `/Dest (name)` resolved through the name tree
    Named(&'static str),
    /// `/A << /S /URI /URI (...) >>`
    Uri(&'static str),
}

#[derive(Default)]
pub struct PageSpec {
    pub lines: Vec<Line>,
    pub links: Vec<LinkTarget>,
    pub annotations: Vec<&'static str>,
    pub media_box: Option<[i64; 4]>,
    pub crop_box: Option<[i64; 4]>,
    pub rotate: Option<i64>,
    /// Split the content into a `/Contents` array of two streams
    pub split_contents: bool,
}

impl PageSpec {
    pub fn new(lines: Vec<Line>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    pub fn with_links(mut self, links: Vec<LinkTarget>) -> Self {
        self.links = links;
        self
    }

    /// Add annotations of the given subtypes.
    pub fn with_annotations(mut self, subtypes: Vec<&'static str>) -> Self {
        self.annotations = subtypes;
        self
    }

    pub fn with_media_box(mut self, media_box: [i64; 4]) -> Self {
        self.media_box = Some(media_box);
        self
    }

    pub fn with_crop_box(mut self, crop_box: [i64; 4]) -> Self {
        self.crop_box = Some(crop_box);
        self
    }

    pub fn with_rotate(mut self, degrees: i64) -> Self {
        self.rotate = Some(degrees);
        self
    }

    pub fn with_split_contents(mut self) -> Self {
        self.split_contents = true;
        self
    }
}

/// Builds a small PDF: pages (MediaBox inherited from the page tree unless
/// overridden), an outline, named destinations and an info dictionary.
/// Page indices are 1-based. Content streams are stored without `/Filter`
/// unless [`PdfBuilder::compressed`] is set.
#[derive(Default)]
pub struct PdfBuilder {
    compress: bool,
    pages: Vec<PageSpec>,
    outline: Vec<(u8, &'static str, usize)>,
    named: Vec<(&'static str, usize)>,
    info: Vec<(&'static str, &'static str)>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flate-compress content streams.
    pub fn compressed(mut self) -> Self {
        self.compress = true;
        self
    }

    pub fn page(mut self, page: PageSpec) -> Self {
        self.pages.push(page);
        self
    }

    /// Outline entry; level 1 is top level. Nested entries point to their
    /// page through a `GoTo` action.
    pub fn bookmark(mut self, level: u8, title: &'static str, page: usize) -> Self {
        self.outline.push((level, title, page));
        self
    }

    pub fn named_destination(mut self, name: &'static str, page: usize) -> Self {
        self.named.push((name, page));
        self
    }

    pub fn info(mut self, key: &'static str, value: &'static str) -> Self {
        self.info.push((key, value));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_ids: Vec<ObjectId> = self.pages.iter().map(|_| doc.new_object_id()).collect();
        let dest = |page: usize| -> Object {
            vec![Object::Reference(page_ids[page - 1]), "Fit".into()].into()
        };

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        for (page_spec, page_id) in self.pages.iter().zip(&page_ids) {
            let mut operations = Vec::new();
            for l in &page_spec.lines {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), l.size.into()]));
                operations.push(Operation::new("Td", vec![l.x.into(), l.y.into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(l.text)]));
                operations.push(Operation::new("ET", vec![]));
            }
            let contents: Object = if page_spec.split_contents {
                let middle = page_spec.lines.len() / 2 * 5;
                let tail = operations.split_off(middle);
                Object::Array(vec![
                    Object::Reference(add_content(&mut doc, operations, self.compress)),
                    Object::Reference(add_content(&mut doc, tail, self.compress)),
                ])
            } else {
                Object::Reference(add_content(&mut doc, operations, self.compress))
            };

            let mut annots: Vec<Object> = Vec::new();
            for (i, target) in page_spec.links.iter().enumerate() {
                let y = 700 - 20 * i as i64;
                let mut annot = dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Link",
                    "Rect" => vec![72.into(), y.into(), 300.into(), (y + 12).into()],
                };
                match target {
                    LinkTarget::Page(page) => annot.set("Dest", dest(*page)),
                    LinkTarget::GoTo(page) => annot.set(
                        "A",
                        dictionary! { "S" => "GoTo", "D" => dest(*page) },
                    ),
                    LinkTarget::Named(name) => annot.set("Dest", Object::string_literal(*name)),
                    LinkTarget::Uri(uri) => annot.set(
                        "A",
                        dictionary! { "S" => "URI", "URI" => Object::string_literal(*uri) },
                    ),
                }
                annots.push(doc.add_object(annot).into());
            }
            for subtype in &page_spec.annotations {
                let annot = dictionary! {
                    "Type" => "Annot",
                    "Subtype" => *subtype,
                    "Rect" => vec![100.into(), 100.into(), 200.into(), 120.into()],
                    "Contents" => Object::string_literal("note"),
                };
                annots.push(doc.add_object(annot).into());
            }

            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => contents,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            };
            if !annots.is_empty() {
                page.set("Annots", annots);
            }
            if let Some(media_box) = page_spec.media_box {
                page.set("MediaBox", media_box_object(media_box));
            }
            if let Some(crop_box) = page_spec.crop_box {
                page.set("CropBox", media_box_object(crop_box));
            }
            if let Some(rotate) = page_spec.rotate {
                page.set("Rotate", rotate);
            }
            doc.objects.insert(*page_id, Object::Dictionary(page));
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => page_ids.len() as i64,
            "MediaBox" => media_box_object(A4),
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };

        if !self.outline.is_empty() {
            let outlines_id = build_outline(&mut doc, &self.outline, &dest);
            catalog.set("Outlines", outlines_id);
        }

        if !self.named.is_empty() {
            let mut names: Vec<Object> = Vec::new();
            for (name, page) in &self.named {
                names.push(Object::string_literal(*name));
                names.push(dest(*page));
            }
            let leaf = doc.add_object(dictionary! { "Names" => names });
            catalog.set(
                "Names",
                dictionary! { "Dests" => dictionary! { "Kids" => vec![Object::Reference(leaf)] } },
            );
        }

        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        if !self.info.is_empty() {
            let mut info = Dictionary::new();
            for (key, value) in &self.info {
                info.set(*key, Object::string_literal(*value));
            }
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", info_id);
        }

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }
}

fn add_content(doc: &mut Document, operations: Vec<Operation>, compress: bool) -> ObjectId {
    let content = Content { operations };
    let mut stream = Stream::new(dictionary! {}, content.encode().unwrap());
    if compress {
        stream.compress().unwrap();
    }
    doc.add_object(stream)
}

fn media_box_object(b: [i64; 4]) -> Object {
    b.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>().into()
}

fn build_outline(
    doc: &mut Document,
    entries: &[(u8, &'static str, usize)],
    dest: &dyn Fn(usize) -> Object,
) -> ObjectId {
    let outlines_id = doc.new_object_id();
    let ids: Vec<ObjectId> = entries.iter().map(|_| doc.new_object_id()).collect();

    // Parent of each entry: the closest earlier entry with a lower level
    let parents: Vec<Option<usize>> = entries
        .iter()
        .enumerate()
        .map(|(i, (level, _, _))| (0..i).rev().find(|&j| entries[j].0 < *level))
        .collect();

    let children = |parent: Option<usize>| -> Vec<usize> {
        (0..entries.len()).filter(|&i| parents[i] == parent).collect()
    };

    for (i, (level, title, page)) in entries.iter().enumerate() {
        let parent_id = parents[i].map_or(outlines_id, |p| ids[p]);
        let siblings = children(parents[i]);
        let pos = siblings.iter().position(|&s| s == i).unwrap();

        let mut item = dictionary! {
            "Title" => Object::string_literal(*title),
            "Parent" => parent_id,
        };
        if *level == 1 {
            item.set("Dest", dest(*page));
        } else {
            item.set("A", dictionary! { "S" => "GoTo", "D" => dest(*page) });
        }
        if pos > 0 {
            item.set("Prev", ids[siblings[pos - 1]]);
        }
        if let Some(next) = siblings.get(pos + 1) {
            item.set("Next", ids[*next]);
        }
        let kids = children(Some(i));
        if let (Some(first), Some(last)) = (kids.first(), kids.last()) {
            item.set("First", ids[*first]);
            item.set("Last", ids[*last]);
            item.set("Count", kids.len() as i64);
        }
        doc.objects.insert(ids[i], Object::Dictionary(item));
    }

    let top = children(None);
    let mut outlines = dictionary! {
        "Type" => "Outlines",
        "Count" => top.len() as i64,
    };
    if let (Some(first), Some(last)) = (top.first(), top.last()) {
        outlines.set("First", ids[*first]);
        outlines.set("Last", ids[*last]);
    }
    doc.objects.insert(outlines_id, Object::Dictionary(outlines));
    outlines_id
}
