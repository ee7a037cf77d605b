//! Document-level types.

use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::outline::Toc;
use super::Page;
use crate::error::Result;

/// Snapshot of a PDF document, detached from the PDF library.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, author, etc.)
    pub metadata: Metadata,

    /// Pages in the document
    pub pages: Vec<Page>,

    /// Table of contents (flattened outline)
    pub toc: Toc,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        if page_num == 0 {
            return None;
        }
        self.pages.get((page_num - 1) as usize)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Flattened outline entries in document order.
    pub fn toc(&self) -> &Toc {
        &self.toc
    }

    /// Pages covered by a table-of-contents section, see [`Toc::section_range`].
    pub fn section_range(&self, title: &str) -> Result<Range<u32>> {
        self.toc.section_range(title, self.page_count())
    }

    /// Total whitespace-insensitive match count over all pages.
    pub fn search_count(&self, needle: &str) -> usize {
        self.pages.iter().map(|p| p.search_count(needle)).sum()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// PDF version (e.g., "1.5")
    pub pdf_version: String,

    /// Whether the document is encrypted
    pub encrypted: bool,
}

impl Metadata {
    /// Create new metadata with PDF version.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            pdf_version: version.into(),
            ..Default::default()
        }
    }

    /// Look up a text field of the info dictionary by its lowercase name.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "title" => &self.title,
            "author" => &self.author,
            "subject" => &self.subject,
            "keywords" => &self.keywords,
            "creator" => &self.creator,
            "producer" => &self.producer,
            _ => return None,
        };
        value.as_deref()
    }
}
