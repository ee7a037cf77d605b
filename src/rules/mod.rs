//! Validation rules.
//!
//! Each rule checks one structural property of the document against the
//! configured profile and the build log's control directives. Rules are
//! independent: a failing rule never prevents another from running.
//!
//! # Example
//!
//! ```no_run
//! use thesischeck::config::Config;
//! use thesischeck::control::ControlTree;
//! use thesischeck::rules::{RuleContext, RuleId, RuleRegistry, Target};
//!
//! fn main() -> thesischeck::Result<()> {
//!     let document = thesischeck::parse_file("dissertation.pdf")?;
//!     let config = Config::from_path("tests/config.yml")?;
//!     let control = ControlTree::from_path("dissertation.log")?;
//!
//!     let ctx = RuleContext {
//!         document: &document,
//!         profile: config.profile("dissertation")?,
//!         control: &control,
//!         target: Target::new("dissertation", false),
//!     };
//!
//!     let registry = RuleRegistry::with_defaults();
//!     if let Some(rule) = registry.get(RuleId::PageNumbering) {
//!         rule.check(&ctx).map_err(|v| eprintln!("{}", v)).ok();
//!     }
//!     Ok(())
//! }
//! ```

mod annotations;
mod applicability;
mod bibliography;
mod fonts;
mod links;
mod margins;
mod metadata;
mod page_count;
mod page_numbering;
mod paper_size;
mod registry;
mod required_text;
mod toc;

pub use annotations::AnnotationRule;
pub use applicability::{Applicability, DocumentKind, Gate, Target};
pub use bibliography::BibliographyRule;
pub use fonts::FontRule;
pub use links::{FigureLinkRule, TableLinkRule};
pub use margins::MarginRule;
pub use metadata::MetadataRule;
pub use page_count::PageCountRule;
pub use page_numbering::PageNumberingRule;
pub use paper_size::PaperSizeRule;
pub use registry::RuleRegistry;
pub use required_text::RequiredTextRule;
pub use toc::TocRule;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Profile;
use crate::control::ControlTree;
use crate::error::Error;
use crate::model::Document;

/// Identifier of a validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    Annotations,
    Toc,
    PaperSize,
    Margins,
    PageNumbering,
    RequiredText,
    PageCount,
    Metadata,
    Fonts,
    FigureLinks,
    TableLinks,
    Bibliography,
}

impl RuleId {
    /// Every rule, in reporting order.
    pub const ALL: [RuleId; 12] = [
        RuleId::Annotations,
        RuleId::Toc,
        RuleId::PaperSize,
        RuleId::Margins,
        RuleId::PageNumbering,
        RuleId::RequiredText,
        RuleId::PageCount,
        RuleId::Metadata,
        RuleId::Fonts,
        RuleId::FigureLinks,
        RuleId::TableLinks,
        RuleId::Bibliography,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::Annotations => "annotations",
            RuleId::Toc => "toc",
            RuleId::PaperSize => "paper_size",
            RuleId::Margins => "margins",
            RuleId::PageNumbering => "page_numbering",
            RuleId::RequiredText => "required_text",
            RuleId::PageCount => "page_count",
            RuleId::Metadata => "metadata",
            RuleId::Fonts => "fonts",
            RuleId::FigureLinks => "figure_links",
            RuleId::TableLinks => "table_links",
            RuleId::Bibliography => "bibliography",
        }
    }

    /// Conditions a target must meet for the rule to run.
    pub fn gates(self) -> &'static [Gate] {
        use Gate::*;
        match self {
            RuleId::Toc | RuleId::Margins | RuleId::Metadata => &[NotPresentation, NotDraft],
            RuleId::PaperSize | RuleId::PageNumbering => &[NotPresentation],
            RuleId::FigureLinks | RuleId::TableLinks | RuleId::Bibliography => {
                &[Dissertation, NotDraft]
            }
            RuleId::Annotations | RuleId::RequiredText | RuleId::PageCount | RuleId::Fonts => &[],
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        RuleId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| Error::UnknownRule(s.to_string()))
    }
}

/// Inputs shared by all rules during one run.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub document: &'a Document,
    pub profile: &'a Profile,
    pub control: &'a ControlTree,
    pub target: Target,
}

/// A validation rule.
pub trait Rule: Send + Sync {
    /// Identifier of this rule.
    fn id(&self) -> RuleId;

    /// One-line description for listings.
    fn description(&self) -> &str;

    /// Conditions under which the rule applies.
    fn gates(&self) -> &[Gate] {
        self.id().gates()
    }

    /// Run the check.
    fn check(&self, ctx: &RuleContext<'_>) -> Result<(), Violation>;
}

/// Why a rule failed.
#[derive(Error, Debug)]
pub enum Violation {
    #[error("page {page} carries {count} annotation(s): {subtypes}")]
    Annotations {
        page: u32,
        count: usize,
        subtypes: String,
    },

    #[error("'{0}' is not configured")]
    Unconfigured(&'static str),

    #[error("table of contents has {actual} entries, expected {expected}")]
    TocSize { expected: usize, actual: usize },

    #[error("page {page}: {dimension} is {actual} mm, expected {expected} mm")]
    PaperSize {
        page: u32,
        dimension: &'static str,
        expected: i64,
        actual: i64,
    },

    #[error("page {page}: {side} margin is {measured} mm, minimum is {minimum} mm")]
    Margin {
        page: u32,
        side: &'static str,
        measured: i64,
        minimum: i64,
    },

    #[error("page {page}: expected page number {expected}, found {found}")]
    PageNumber {
        page: u32,
        expected: i64,
        found: String,
    },

    #[error("required text '{0}' not found")]
    MissingText(String),

    #[error("document has {count} pages, allowed range is {min}..={max}")]
    PageCount { count: u32, min: u32, max: u32 },

    #[error("metadata field '{field}' is '{actual}', expected '{expected}'")]
    Metadata {
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("page {target}: {links} link(s) from page {from_page} but '{label}' occurs {found} time(s)")]
    LinkTarget {
        from_page: u32,
        target: u32,
        label: String,
        links: usize,
        found: usize,
    },

    #[error("page {page}: bibliography entry {found} out of order, expected {expected}")]
    BibliographyNumber { page: u32, expected: u64, found: u64 },

    #[error(transparent)]
    Document(#[from] Error),
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for building rule inputs by hand.

    use super::*;
    use crate::model::{Page, Rect, TextBlock};

    /// Owned inputs for a [`RuleContext`].
    pub struct Fixture {
        pub document: Document,
        pub profile: Profile,
        pub control: ControlTree,
        pub target: Target,
    }

    impl Fixture {
        pub fn new(document: Document) -> Self {
            Self {
                document,
                profile: Profile::default(),
                control: ControlTree::new(),
                target: Target::new("dissertation", false),
            }
        }

        pub fn ctx(&self) -> RuleContext<'_> {
            RuleContext {
                document: &self.document,
                profile: &self.profile,
                control: &self.control,
                target: self.target,
            }
        }
    }

    /// An A4 page with one block per text, stacked from the top.
    pub fn page(number: u32, texts: &[&str]) -> Page {
        let mut page = Page::a4(number);
        for (i, text) in texts.iter().enumerate() {
            let y = 100.0 + i as f32 * 20.0;
            page.add_block(TextBlock::new(Rect::new(90.0, y, 500.0, y + 12.0), *text));
        }
        page
    }

    /// A document made of [`page`]s.
    pub fn document(pages: &[&[&str]]) -> Document {
        let mut document = Document::new();
        for (i, texts) in pages.iter().enumerate() {
            document.add_page(page(i as u32 + 1, texts));
        }
        document
    }
}
