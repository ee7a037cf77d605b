//! PDF parsing module.
//!
//! Turns a PDF file into a [`Document`](crate::model::Document) snapshot:
//! positioned words grouped into blocks, links with resolved destinations,
//! annotations, the outline and the info dictionary.

mod annotations;
mod layout;
mod options;
mod pdf_parser;

pub use layout::{LayoutAnalyzer, PageBox, TextLine, TextSpan};
pub use options::{ErrorMode, ExtractMode, ParseOptions};
pub use pdf_parser::PdfParser;
