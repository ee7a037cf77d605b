//! Document model types.
//!
//! A [`Document`] is a read-only snapshot of everything the rules look at:
//! page geometry, positioned text, links, annotations, the outline and the
//! info dictionary. It is independent of the PDF library, so rules can be
//! exercised on hand-built documents.

mod document;
pub mod geometry;
mod outline;
mod page;
pub mod search;

pub use document::{Document, Metadata};
pub use geometry::{point_to_mm, Rect};
pub use outline::{Toc, TocEntry};
pub use page::{Annotation, Link, Page, TextBlock, Word};
pub use search::SearchKey;
