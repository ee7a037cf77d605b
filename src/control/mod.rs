//! Control directives embedded in a build log.
//!
//! The document build writes lines such as
//!
//! ```text
//! templatetest: page_numbering/disable : int : 3
//! ```
//!
//! into its log to switch individual checks on or off for specific pages.
//! [`ControlTree::from_reader`] scans a log for these directives and collects
//! them into a nested tree keyed by path segments.
//!
//! ```
//! use thesischeck::control::ControlTree;
//!
//! let log = "noise\ntemplatetest: page_numbering/reset : int : 5\n";
//! let tree = ControlTree::from_reader(log.as_bytes()).unwrap();
//! assert!(tree.contains_int(&["page_numbering", "reset"], 5));
//! ```

mod directive;
mod lexer;
mod tree;

pub use directive::{parse_line, Directive, Persistence, ValueType};
pub use lexer::{Lexer, Token, KEYWORD};
pub use tree::{ControlNode, ControlTree, ControlValue};
