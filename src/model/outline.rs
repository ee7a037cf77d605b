//! Table of contents built from the PDF outline (bookmarks).

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Nesting level (1 = top level)
    pub level: u8,

    /// Bookmark title
    pub title: String,

    /// Start page (1-indexed); `None` when the bookmark has no page destination
    pub page: Option<u32>,
}

impl TocEntry {
    pub fn new(level: u8, title: impl Into<String>, page: Option<u32>) -> Self {
        Self {
            level,
            title: title.into(),
            page,
        }
    }
}

/// Flattened table of contents in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toc {
    pub entries: Vec<TocEntry>,
}

impl Toc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TocEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the first entry whose title matches, ignoring case and
    /// surrounding whitespace.
    pub fn find(&self, title: &str) -> Option<(usize, &TocEntry)> {
        let wanted = title.trim().to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.title.trim().to_lowercase() == wanted)
    }

    /// Page range covered by a section: from its start page up to, but not
    /// including, the start page of the next entry that has one. The last
    /// section runs to the end of the document.
    ///
    /// Returned pages are 1-indexed; the range may be empty when the next
    /// entry starts on the same page.
    pub fn section_range(&self, title: &str, page_count: u32) -> Result<Range<u32>> {
        let (index, entry) = self
            .find(title)
            .ok_or_else(|| Error::SectionNotFound(title.to_string()))?;
        let start = entry
            .page
            .ok_or_else(|| Error::SectionNotFound(title.to_string()))?;

        let end = self.entries[index + 1..]
            .iter()
            .find_map(|e| e.page)
            .unwrap_or(page_count + 1);

        Ok(start..end.max(start))
    }
}
