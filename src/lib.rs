//! # thesischeck
//!
//! Conformance checks for dissertation and thesis PDFs built from a LaTeX
//! template.
//!
//! The checker reads the generated PDF, the build log and a YAML
//! configuration keyed by document type, then validates page size, margins,
//! the table of contents, page numbering, required phrases, metadata and the
//! integrity of figure, table and bibliography references.
//!
//! ## Quick Start
//!
//! ```no_run
//! use thesischeck::{check, SessionOptions};
//!
//! fn main() -> thesischeck::Result<()> {
//!     let options = SessionOptions::new("dissertation.pdf", "tests/config.yml", "dissertation")
//!         .with_log("dissertation.log");
//!
//!     let report = check(options)?;
//!     for result in &report.results {
//!         println!("{}: {:?}", result.rule, result.outcome);
//!     }
//!     std::process::exit(if report.is_success() { 0 } else { 1 });
//! }
//! ```
//!
//! ## Control directives
//!
//! The template can steer individual checks from inside the document by
//! writing directives to the build log, e.g. to skip page numbering on the
//! title page:
//!
//! ```text
//! templatetest: page_numbering/disable : int : 1
//! templatetest: page_numbering/enable : int : 3
//! ```
//!
//! See [`control`] for the grammar.

pub mod config;
pub mod control;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod rules;
pub mod session;

// Re-export commonly used types
pub use config::{Config, Profile};
pub use control::{ControlTree, ControlValue, Directive};
pub use detect::{sniff_bytes, sniff_path};
pub use error::{Error, Result};
pub use model::{Document, Metadata, Page, Rect, Toc, TocEntry};
pub use parser::{ErrorMode, ExtractMode, ParseOptions, PdfParser};
pub use report::{JsonFormat, Outcome, Report, RuleReport};
pub use rules::{Rule, RuleContext, RuleId, RuleRegistry, Target, Violation};
pub use session::{Session, SessionOptions};

use std::io::Read;
use std::path::Path;

/// Parse a PDF file into a document snapshot.
///
/// # Example
///
/// ```no_run
/// use thesischeck::parse_file;
///
/// let doc = parse_file("dissertation.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let parser = PdfParser::open(path)?;
    parser.parse()
}

/// Parse a PDF file with custom options.
///
/// ```no_run
/// use thesischeck::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().lenient();
/// let doc = parse_file_with_options("dissertation.pdf", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    let parser = PdfParser::open_with_options(path, options)?;
    parser.parse()
}

/// Parse a PDF from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    let parser = PdfParser::from_bytes(data)?;
    parser.parse()
}

/// Parse a PDF from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    let parser = PdfParser::from_reader(reader)?;
    parser.parse()
}

/// Run every built-in rule against the inputs named in `options`.
pub fn check(options: SessionOptions) -> Result<Report> {
    let session = Session::open(options)?;
    session.run(&RuleRegistry::with_defaults(), &[])
}
