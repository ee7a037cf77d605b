//! Expected values per document type, loaded from YAML.
//!
//! ```yaml
//! dissertation:
//!   toc:
//!     size: 24
//!   paper_size:
//!     width: 210
//!     height: 297
//!   margins:
//!     min_left: 25
//!     min_right: 10
//!   required_text:
//!     - "Введение"
//!   pages:
//!     min_pages: 100
//!     max_pages: 200
//! ```
//!
//! Every key is optional. Lengths are in millimetres.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Margin minimum used when none is configured; every measured margin passes.
pub const DEFAULT_MIN_MARGIN: i64 = -1;

/// Lower page bound used when none is configured.
pub const DEFAULT_MIN_PAGES: u32 = 100;

/// Upper page bound used when none is configured.
pub const DEFAULT_MAX_PAGES: u32 = 0;

/// Configuration keyed by document type name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    profiles: BTreeMap<String, Profile>,
}

impl Config {
    /// Load a configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: Config = text.parse()?;
        log::info!(
            "Loaded configuration for {} document types from {}",
            config.profiles.len(),
            path.display()
        );
        Ok(config)
    }

    /// Expected values for a document type.
    pub fn profile(&self, document_type: &str) -> Result<&Profile> {
        self.profiles
            .get(document_type)
            .ok_or_else(|| Error::UnknownDocumentType(document_type.to_string()))
    }

    /// Names of all configured document types.
    pub fn document_types(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Add or replace the profile of a document type.
    pub fn insert(&mut self, document_type: impl Into<String>, profile: Profile) {
        self.profiles.insert(document_type.into(), profile);
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a mapping
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(s)?)
    }
}

/// Expected values for one document type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub toc: TocExpectations,
    pub paper_size: PaperSize,
    pub margins: Margins,
    pub required_text: Vec<String>,
    pub pages: PageLimits,
    pub metadata: MetadataExpectations,
    pub labels: Labels,
    pub sections: Sections,
    pub numbering: Numbering,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TocExpectations {
    /// Number of outline entries
    pub size: Option<usize>,
}

/// Paper size in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperSize {
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// Minimum distance between the text and each page edge, in millimetres.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub min_left: Option<i64>,
    pub min_top: Option<i64>,
    pub min_right: Option<i64>,
    pub min_bottom: Option<i64>,
}

impl Margins {
    pub fn left(&self) -> i64 {
        self.min_left.unwrap_or(DEFAULT_MIN_MARGIN)
    }

    pub fn top(&self) -> i64 {
        self.min_top.unwrap_or(DEFAULT_MIN_MARGIN)
    }

    pub fn right(&self) -> i64 {
        self.min_right.unwrap_or(DEFAULT_MIN_MARGIN)
    }

    pub fn bottom(&self) -> i64 {
        self.min_bottom.unwrap_or(DEFAULT_MIN_MARGIN)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLimits {
    pub min_pages: Option<u32>,
    pub max_pages: Option<u32>,
}

impl PageLimits {
    pub fn min(&self) -> u32 {
        self.min_pages.unwrap_or(DEFAULT_MIN_PAGES)
    }

    /// Upper bound; an unconfigured bound is 0, which no document satisfies.
    pub fn max(&self) -> u32 {
        self.max_pages.unwrap_or(DEFAULT_MAX_PAGES)
    }
}

/// Expected info dictionary fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataExpectations {
    pub author: Option<String>,
    pub title: Option<String>,
    pub subject: Option<String>,
}

impl MetadataExpectations {
    /// Names of the checked fields.
    pub const FIELDS: [&'static str; 3] = ["author", "title", "subject"];

    /// Expected value of a field, trimmed; empty when unconfigured.
    pub fn expected(&self, field: &str) -> &str {
        let value = match field {
            "author" => &self.author,
            "title" => &self.title,
            "subject" => &self.subject,
            _ => return "",
        };
        value.as_deref().map(str::trim).unwrap_or_default()
    }
}

/// Caption words searched for on link destination pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub figure: String,
    pub table: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            figure: "Рисунок".to_string(),
            table: "Таблица".to_string(),
        }
    }
}

/// Table-of-contents titles of the sections the link and bibliography
/// checks walk through.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Sections {
    pub figures: String,
    pub tables: String,
    pub bibliography: String,
}

impl Default for Sections {
    fn default() -> Self {
        Self {
            figures: "список рисунков".to_string(),
            tables: "список таблиц".to_string(),
            bibliography: "список литературы".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Numbering {
    pub directive_key: DirectiveKey,
}

/// Which page number control directives refer to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveKey {
    /// The number expected to be printed on the page
    #[default]
    Running,
    /// The 1-indexed position of the page in the file
    Physical,
}
