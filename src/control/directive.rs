//! Directive grammar.
//!
//! ```text
//! directive := KEYWORD ':' path ':' type ':' data
//! type      := "int" | "str"
//! ```
//!
//! `str` data runs to the end of the line, colons included.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::lexer::{Lexer, Token};
use super::tree::ControlValue;

/// Leaf name whose entries are consumed when they fire.
const ONE_SHOT_LEAF: &str = "reset";

/// Declared type of a directive's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Str,
}

impl FromStr for ValueType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(ValueType::Int),
            "str" => Ok(ValueType::Str),
            _ => Err(()),
        }
    }
}

/// Whether a directive entry survives being matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Consumed the first time it fires
    OneShot,
    /// Applies every time it is looked up
    Persistent,
}

impl Persistence {
    /// Persistence of entries stored under the leaf `name`.
    pub fn for_leaf(name: &str) -> Self {
        if name == ONE_SHOT_LEAF {
            Persistence::OneShot
        } else {
            Persistence::Persistent
        }
    }
}

/// A parsed control directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    /// Path segments, the last one being the leaf
    pub path: Vec<String>,
    /// Typed value
    pub value: ControlValue,
}

impl Directive {
    pub fn new(path: Vec<String>, value: ControlValue) -> Self {
        Self { path, value }
    }

    /// Last path segment.
    pub fn leaf(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    pub fn persistence(&self) -> Persistence {
        Persistence::for_leaf(self.leaf())
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.path.join("/"), self.value)
    }
}

/// Find the first well-formed directive in a log line.
///
/// Lines without a directive, and directives with an unknown type or an
/// `int` whose data is not an integer, yield `None`.
pub fn parse_line(line: &str) -> Option<Directive> {
    let tokens: Vec<Token<'_>> = Lexer::new(line).collect();

    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| **t == Token::Keyword)
        .find_map(|(i, _)| parse_tokens(line, &tokens[i + 1..]))
}

/// Parse the tokens following a keyword. Token text borrows from `line`.
fn parse_tokens(line: &str, tokens: &[Token<'_>]) -> Option<Directive> {
    let [Token::Colon, Token::Text(path), Token::Colon, Token::Text(kind), Token::Colon, Token::Text(data), ..] =
        tokens
    else {
        return None;
    };

    let path = split_path(path)?;
    let value = match kind.parse::<ValueType>().ok()? {
        ValueType::Int => match data.parse::<i64>() {
            Ok(n) => ControlValue::Int(n),
            Err(_) => {
                log::warn!("Skipping directive {}: '{}' is not an integer", path.join("/"), data);
                return None;
            }
        },
        // The rest of the line verbatim, later colons included
        ValueType::Str => ControlValue::Str(line[offset_in(line, data)..].trim_end().to_string()),
    };

    Some(Directive::new(path, value))
}

/// Byte offset of `part`, a subslice of `whole`.
fn offset_in(whole: &str, part: &str) -> usize {
    part.as_ptr() as usize - whole.as_ptr() as usize
}

fn split_path(raw: &str) -> Option<Vec<String>> {
    let segments: Vec<String> = raw
        .trim_matches(|c: char| c == '/' || c.is_whitespace())
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    (!segments.is_empty()).then_some(segments)
}
