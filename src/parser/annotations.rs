//! Page annotations and link destinations.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use super::layout::{decode_text_simple, get_number, resolve, PageBox};
use crate::model::{Annotation, Link, Rect};

/// Name trees nested deeper than this are treated as malformed.
const MAX_NAME_TREE_DEPTH: usize = 32;

/// Resolves link and bookmark destinations to 1-indexed page numbers.
pub(crate) struct DestinationResolver {
    page_numbers: HashMap<ObjectId, u32>,
    named: HashMap<Vec<u8>, u32>,
}

impl DestinationResolver {
    /// Index page objects and named destinations of a document.
    pub(crate) fn new(doc: &LopdfDocument, pages: &BTreeMap<u32, ObjectId>) -> Self {
        let page_numbers: HashMap<ObjectId, u32> =
            pages.iter().map(|(num, id)| (*id, *num)).collect();

        let mut resolver = Self {
            page_numbers,
            named: HashMap::new(),
        };
        resolver.index_named_destinations(doc);
        log::debug!("Indexed {} named destinations", resolver.named.len());
        resolver
    }

    /// Resolve a destination: an explicit array, a name, or a dictionary
    /// carrying one under `/D`.
    pub(crate) fn resolve(&self, doc: &LopdfDocument, dest: &Object) -> Option<u32> {
        self.resolve_nested(doc, dest, 0)
    }

    fn resolve_nested(&self, doc: &LopdfDocument, dest: &Object, depth: usize) -> Option<u32> {
        if depth > MAX_NAME_TREE_DEPTH {
            log::warn!("Destination nested deeper than {} levels, ignoring", MAX_NAME_TREE_DEPTH);
            return None;
        }

        match resolve(doc, dest) {
            Object::Array(arr) => match arr.first() {
                Some(Object::Reference(page_ref)) => self.page_numbers.get(page_ref).copied(),
                // Remote destinations carry a 0-based page index
                Some(Object::Integer(index)) => index
                    .checked_add(1)
                    .and_then(|page| u32::try_from(page).ok()),
                _ => None,
            },
            Object::String(name, _) | Object::Name(name) => self.named.get(name).copied(),
            Object::Dictionary(dict) => dict
                .get(b"D")
                .ok()
                .and_then(|d| self.resolve_nested(doc, d, depth + 1)),
            _ => None,
        }
    }

    fn index_named_destinations(&mut self, doc: &LopdfDocument) {
        let Ok(catalog) = doc.catalog() else {
            return;
        };

        // PDF 1.2+: /Names -> /Dests name tree
        let tree = catalog
            .get(b"Names")
            .ok()
            .map(|n| resolve(doc, n))
            .and_then(|n| n.as_dict().ok())
            .and_then(|n| n.get(b"Dests").ok())
            .map(|d| resolve(doc, d))
            .and_then(|d| d.as_dict().ok());
        if let Some(tree) = tree {
            self.walk_name_tree(doc, tree, 0);
        }

        // PDF 1.1: /Dests dictionary in the catalog
        let dests = catalog
            .get(b"Dests")
            .ok()
            .map(|d| resolve(doc, d))
            .and_then(|d| d.as_dict().ok());
        if let Some(dests) = dests {
            for (name, dest) in dests.iter() {
                if let Some(page) = self.resolve(doc, dest) {
                    self.named.entry(name.clone()).or_insert(page);
                }
            }
        }
    }

    fn walk_name_tree(&mut self, doc: &LopdfDocument, node: &lopdf::Dictionary, depth: usize) {
        if depth > MAX_NAME_TREE_DEPTH {
            log::warn!("Name tree deeper than {} levels, ignoring", MAX_NAME_TREE_DEPTH);
            return;
        }

        if let Some(names) = node
            .get(b"Names")
            .ok()
            .map(|n| resolve(doc, n))
            .and_then(|n| n.as_array().ok())
        {
            for pair in names.chunks(2) {
                if let [key, value] = pair {
                    if let Object::String(key, _) = resolve(doc, key) {
                        if let Some(page) = self.resolve(doc, value) {
                            self.named.insert(key.clone(), page);
                        }
                    }
                }
            }
        }

        if let Some(kids) = node
            .get(b"Kids")
            .ok()
            .map(|k| resolve(doc, k))
            .and_then(|k| k.as_array().ok())
        {
            for kid in kids {
                if let Ok(kid) = resolve(doc, kid).as_dict() {
                    self.walk_name_tree(doc, kid, depth + 1);
                }
            }
        }
    }
}

/// Links and annotations of one page.
#[derive(Debug, Default)]
pub(crate) struct PageAnnotations {
    pub links: Vec<Link>,
    pub annotations: Vec<Annotation>,
}

/// Read the `/Annots` array of a page.
///
/// Link annotations become [`Link`]s; form widgets are ignored; everything
/// else is reported as an [`Annotation`].
pub(crate) fn extract_page_annotations(
    doc: &LopdfDocument,
    page_id: ObjectId,
    page_box: PageBox,
    resolver: &DestinationResolver,
) -> PageAnnotations {
    let mut result = PageAnnotations::default();

    let annots = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"Annots").ok())
        .map(|a| resolve(doc, a))
        .and_then(|a| a.as_array().ok());
    let Some(annots) = annots else {
        return result;
    };

    for entry in annots {
        let Ok(annot) = resolve(doc, entry).as_dict() else {
            continue;
        };
        let subtype = match annot.get(b"Subtype") {
            Ok(Object::Name(name)) => String::from_utf8_lossy(name).into_owned(),
            _ => continue,
        };
        let rect = annot
            .get(b"Rect")
            .ok()
            .map(|r| resolve(doc, r))
            .and_then(|r| rect_from_array(doc, r, page_box));

        match subtype.as_str() {
            "Link" => {
                let rect = rect.unwrap_or_default();
                if let Some(page) = link_destination(doc, annot, resolver) {
                    result.links.push(Link::to_page(rect, page));
                } else if let Some(uri) = link_uri(doc, annot) {
                    result.links.push(Link::to_uri(rect, uri));
                } else {
                    result.links.push(Link {
                        rect,
                        page: None,
                        uri: None,
                    });
                }
            }
            "Widget" => {}
            _ => {
                let contents = match annot.get(b"Contents").map(|c| resolve(doc, c)) {
                    Ok(Object::String(bytes, _)) => Some(decode_text_simple(bytes)),
                    _ => None,
                };
                result.annotations.push(Annotation {
                    subtype,
                    rect,
                    contents,
                });
            }
        }
    }

    result
}

/// Internal destination of a link: `/Dest`, or the `/D` of a `GoTo` action.
fn link_destination(
    doc: &LopdfDocument,
    annot: &lopdf::Dictionary,
    resolver: &DestinationResolver,
) -> Option<u32> {
    if let Ok(dest) = annot.get(b"Dest") {
        return resolver.resolve(doc, dest);
    }

    let action = annot
        .get(b"A")
        .ok()
        .map(|a| resolve(doc, a))
        .and_then(|a| a.as_dict().ok())?;
    match action.get(b"S") {
        Ok(Object::Name(kind)) if kind.as_slice() == b"GoTo" => {
            resolver.resolve(doc, action.get(b"D").ok()?)
        }
        _ => None,
    }
}

/// Target of a `URI` action.
fn link_uri(doc: &LopdfDocument, annot: &lopdf::Dictionary) -> Option<String> {
    let action = annot
        .get(b"A")
        .ok()
        .map(|a| resolve(doc, a))
        .and_then(|a| a.as_dict().ok())?;
    match (action.get(b"S"), action.get(b"URI").map(|u| resolve(doc, u))) {
        (Ok(Object::Name(kind)), Ok(Object::String(uri, _))) if kind.as_slice() == b"URI" => {
            Some(decode_text_simple(uri))
        }
        _ => None,
    }
}

fn rect_from_array(doc: &LopdfDocument, obj: &Object, page_box: PageBox) -> Option<Rect> {
    let arr = obj.as_array().ok()?;
    if arr.len() < 4 {
        return None;
    }
    let n: Vec<f32> = arr
        .iter()
        .take(4)
        .map(|o| get_number(resolve(doc, o)))
        .collect::<Option<_>>()?;
    Some(Rect::new(
        n[0] - page_box.llx,
        page_box.ury - n[3],
        n[2] - page_box.llx,
        page_box.ury - n[1],
    ))
}
