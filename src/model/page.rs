//! Page-level types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::geometry::{point_to_mm, Rect};
use super::search::SearchKey;

/// A single page in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Word tokens in reading order
    pub words: Vec<Word>,

    /// Merged text blocks in reading order
    pub blocks: Vec<TextBlock>,

    /// Link annotations
    pub links: Vec<Link>,

    /// Annotations other than links and form widgets
    pub annotations: Vec<Annotation>,
}

impl Page {
    /// Create an empty page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            words: Vec::new(),
            blocks: Vec::new(),
            links: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Create an empty A4 page (210 x 297 mm).
    pub fn a4(number: u32) -> Self {
        Self::new(number, 595.276, 841.89)
    }

    /// Append a text block, splitting its text into word tokens.
    ///
    /// Word rectangles are spread over the block width in proportion to
    /// their character count.
    pub fn add_block(&mut self, block: TextBlock) {
        let total: usize = block.text.chars().filter(|c| !c.is_whitespace()).count();
        let mut consumed = 0usize;
        for token in block.text.split_whitespace() {
            let len = token.chars().count();
            let (x0, x1) = if total > 0 {
                let w = block.rect.width();
                (
                    block.rect.x0 + w * consumed as f32 / total as f32,
                    block.rect.x0 + w * (consumed + len) as f32 / total as f32,
                )
            } else {
                (block.rect.x0, block.rect.x1)
            };
            consumed += len;
            self.words.push(Word {
                text: token.to_string(),
                rect: Rect::new(x0, block.rect.y0, x1, block.rect.y1),
            });
        }
        self.blocks.push(block);
    }

    /// Page width in millimetres.
    pub fn width_mm(&self) -> i64 {
        point_to_mm(self.width)
    }

    /// Page height in millimetres.
    pub fn height_mm(&self) -> i64 {
        point_to_mm(self.height)
    }

    pub fn first_word(&self) -> Option<&Word> {
        self.words.first()
    }

    pub fn last_word(&self) -> Option<&Word> {
        self.words.last()
    }

    /// Bounding rectangle of all text blocks, `None` for a page without text.
    pub fn text_bounds(&self) -> Option<Rect> {
        Rect::union_all(self.blocks.iter().map(|b| &b.rect))
    }

    /// Plain text of the page, one block per line.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Count occurrences of `needle`, ignoring whitespace and letter case.
    pub fn search_count(&self, needle: &str) -> usize {
        SearchKey::new(needle).count_in(&self.plain_text())
    }

    /// Number of links pointing at each destination page.
    ///
    /// Links without an internal destination are not counted.
    pub fn link_targets(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for page in self.links.iter().filter_map(|l| l.page) {
            *counts.entry(page).or_insert(0) += 1;
        }
        counts
    }

    /// Check if the page carries no text.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::a4(1)
    }
}

/// A word token with its approximate position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub rect: Rect,
}

/// A block of text lines typeset together (a paragraph, heading, caption).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub rect: Rect,
    pub text: String,
}

impl TextBlock {
    pub fn new(rect: Rect, text: impl Into<String>) -> Self {
        Self {
            rect,
            text: text.into(),
        }
    }
}

/// A link annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Active area on the page
    pub rect: Rect,

    /// Destination page (1-indexed) for internal links
    pub page: Option<u32>,

    /// Target URI for external links
    pub uri: Option<String>,
}

impl Link {
    /// Internal link to a page.
    pub fn to_page(rect: Rect, page: u32) -> Self {
        Self {
            rect,
            page: Some(page),
            uri: None,
        }
    }

    /// External link to a URI.
    pub fn to_uri(rect: Rect, uri: impl Into<String>) -> Self {
        Self {
            rect,
            page: None,
            uri: Some(uri.into()),
        }
    }
}

/// A non-link annotation (comment, highlight, stamp...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Value of `/Subtype`, e.g. "Text" or "Highlight"
    pub subtype: String,

    pub rect: Option<Rect>,

    pub contents: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with(texts: &[&str]) -> Page {
        let mut page = Page::a4(1);
        for (i, text) in texts.iter().enumerate() {
            let y = 100.0 + i as f32 * 20.0;
            page.add_block(TextBlock::new(Rect::new(72.0, y, 400.0, y + 12.0), *text));
        }
        page
    }

    #[test]
    fn test_a4_dimensions() {
        let page = Page::a4(3);
        assert_eq!(page.width_mm(), 210);
        assert_eq!(page.height_mm(), 297);
    }

    #[test]
    fn test_words_follow_blocks() {
        let page = page_with(&["12", "Глава 1. Обзор", "Текст главы"]);
        assert_eq!(page.first_word().unwrap().text, "12");
        assert_eq!(page.last_word().unwrap().text, "главы");
        assert_eq!(page.words.len(), 6);
    }

    #[test]
    fn test_word_rects_split_block() {
        let mut page = Page::a4(1);
        page.add_block(TextBlock::new(Rect::new(0.0, 0.0, 100.0, 10.0), "ab cd"));
        assert_eq!(page.words[0].rect.x1, 50.0);
        assert_eq!(page.words[1].rect.x0, 50.0);
    }

    #[test]
    fn test_text_bounds() {
        let page = page_with(&["a", "b"]);
        let bounds = page.text_bounds().unwrap();
        assert_eq!(bounds, Rect::new(72.0, 100.0, 400.0, 132.0));
        assert!(Page::a4(1).text_bounds().is_none());
    }

    #[test]
    fn test_search_ignores_spacing() {
        let page = page_with(&["Р и с у н о к 1 — Схема", "Рисунок 2"]);
        assert_eq!(page.search_count("Рисунок"), 2);
        assert_eq!(page.search_count("рисунок"), 2);
        assert_eq!(page.search_count("Таблица"), 0);
    }

    #[test]
    fn test_link_targets() {
        let mut page = Page::a4(1);
        let r = Rect::default();
        page.links.push(Link::to_page(r, 10));
        page.links.push(Link::to_page(r, 10));
        page.links.push(Link::to_page(r, 12));
        page.links.push(Link::to_uri(r, "https://example.org"));

        let targets = page.link_targets();
        assert_eq!(targets.get(&10), Some(&2));
        assert_eq!(targets.get(&12), Some(&1));
        assert_eq!(targets.len(), 2);
    }
}
