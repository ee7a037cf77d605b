//! Nested storage for control directives.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use super::directive::{parse_line, Directive};
use crate::error::{Error, Result};
use crate::report::JsonFormat;

/// A directive value. Integers order before strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum ControlValue {
    Int(i64),
    Str(String),
}

impl ControlValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ControlValue::Int(n) => Some(*n),
            ControlValue::Str(_) => None,
        }
    }
}

impl fmt::Display for ControlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlValue::Int(n) => write!(f, "{}", n),
            ControlValue::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// A node of the control tree: either a mapping or a sorted value list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ControlNode {
    Branch(BTreeMap<String, ControlNode>),
    Leaf(Vec<ControlValue>),
}

/// Directives collected from a log, keyed by path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ControlTree {
    root: BTreeMap<String, ControlNode>,
}

impl ControlTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read directives from a log file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let tree = Self::from_reader(BufReader::new(file))?;
        log::info!(
            "Read {} control directives from {}",
            tree.directive_count(),
            path.display()
        );
        Ok(tree)
    }

    /// Read directives from a log stream.
    ///
    /// Lines need not be valid UTF-8; invalid sequences are replaced.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut tree = Self::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            if let Some(directive) = parse_line(&String::from_utf8_lossy(&buf)) {
                tree.insert(directive);
            }
        }

        Ok(tree)
    }

    /// Build a tree from already split lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        for line in lines {
            if let Some(directive) = parse_line(line.as_ref()) {
                tree.insert(directive);
            }
        }
        tree
    }

    /// Add a directive's value to its leaf, keeping the leaf sorted.
    ///
    /// Returns `false` when the path collides with a node of the other shape;
    /// such directives are skipped.
    pub fn insert(&mut self, directive: Directive) -> bool {
        let Some((leaf, branches)) = directive.path.split_last() else {
            return false;
        };

        let mut node = &mut self.root;
        for segment in branches {
            let child = node
                .entry(segment.clone())
                .or_insert_with(|| ControlNode::Branch(BTreeMap::new()));
            match child {
                ControlNode::Branch(map) => node = map,
                ControlNode::Leaf(_) => {
                    log::warn!("Skipping directive {}: '{}' is a value list", directive, segment);
                    return false;
                }
            }
        }

        match node
            .entry(leaf.clone())
            .or_insert_with(|| ControlNode::Leaf(Vec::new()))
        {
            ControlNode::Leaf(values) => {
                values.push(directive.value.clone());
                values.sort();
                true
            }
            ControlNode::Branch(_) => {
                log::warn!("Skipping directive {}: '{}' is a mapping", directive, leaf);
                false
            }
        }
    }

    /// Values stored at a leaf path.
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&[ControlValue]> {
        let (leaf, branches) = path.split_last()?;

        let mut node = &self.root;
        for segment in branches {
            match node.get(segment.as_ref())? {
                ControlNode::Branch(map) => node = map,
                ControlNode::Leaf(_) => return None,
            }
        }

        match node.get(leaf.as_ref())? {
            ControlNode::Leaf(values) => Some(values),
            ControlNode::Branch(_) => None,
        }
    }

    /// Whether the leaf at `path` holds the integer `n`.
    pub fn contains_int<S: AsRef<str>>(&self, path: &[S], n: i64) -> bool {
        self.get(path)
            .is_some_and(|values| values.contains(&ControlValue::Int(n)))
    }

    /// Remove one occurrence of the integer `n` from the leaf at `path`.
    ///
    /// Returns whether an entry was removed.
    pub fn take_int<S: AsRef<str>>(&mut self, path: &[S], n: i64) -> bool {
        let Some(values) = self.get_mut(path) else {
            return false;
        };
        match values.iter().position(|v| *v == ControlValue::Int(n)) {
            Some(pos) => {
                values.remove(pos);
                true
            }
            None => false,
        }
    }

    fn get_mut<S: AsRef<str>>(&mut self, path: &[S]) -> Option<&mut Vec<ControlValue>> {
        let (leaf, branches) = path.split_last()?;

        let mut node = &mut self.root;
        for segment in branches {
            match node.get_mut(segment.as_ref())? {
                ControlNode::Branch(map) => node = map,
                ControlNode::Leaf(_) => return None,
            }
        }

        match node.get_mut(leaf.as_ref())? {
            ControlNode::Leaf(values) => Some(values),
            ControlNode::Branch(_) => None,
        }
    }

    /// Whether no directive was collected.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Total number of stored values.
    pub fn directive_count(&self) -> usize {
        fn count(map: &BTreeMap<String, ControlNode>) -> usize {
            map.values()
                .map(|node| match node {
                    ControlNode::Branch(map) => count(map),
                    ControlNode::Leaf(values) => values.len(),
                })
                .sum()
        }
        count(&self.root)
    }

    /// Dump the tree as nested JSON objects.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        let result = match format {
            JsonFormat::Pretty => serde_json::to_string_pretty(self),
            JsonFormat::Compact => serde_json::to_string(self),
        };

        result.map_err(|e| Error::Serialize(format!("JSON serialization error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUMBERING_ENABLE: [&str; 2] = ["page_numbering", "enable"];

    #[test]
    fn test_values_are_sorted_and_duplicates_kept() {
        let tree = ControlTree::from_lines([
            "templatetest: page_numbering/enable : int : 3",
            "templatetest: page_numbering/enable : int : 1",
            "templatetest: page_numbering/enable : int : 2",
            "templatetest: page_numbering/enable : int : 2",
        ]);

        let values: Vec<i64> = tree
            .get(&NUMBERING_ENABLE)
            .unwrap()
            .iter()
            .filter_map(ControlValue::as_int)
            .collect();
        assert_eq!(values, vec![1, 2, 2, 3]);
        assert_eq!(tree.directive_count(), 4);
    }

    #[test]
    fn test_ints_order_before_strings() {
        let tree = ControlTree::from_lines([
            "templatetest: misc : str : b",
            "templatetest: misc : int : 10",
        ]);
        assert_eq!(
            tree.get(&["misc"]).unwrap(),
            &[ControlValue::Int(10), ControlValue::Str("b".into())]
        );
    }

    #[test]
    fn test_contains_int() {
        let tree = ControlTree::from_lines(["templatetest: page_numbering/enable : int : 5"]);
        assert!(tree.contains_int(&NUMBERING_ENABLE, 5));
        assert!(!tree.contains_int(&NUMBERING_ENABLE, 6));
        assert!(!tree.contains_int(&["page_numbering", "disable"], 5));
        assert!(!tree.contains_int(&["page_numbering"], 5));
    }

    #[test]
    fn test_take_int_removes_one_occurrence() {
        let mut tree = ControlTree::from_lines([
            "templatetest: page_numbering/reset : int : 4",
            "templatetest: page_numbering/reset : int : 4",
        ]);
        let reset = ["page_numbering", "reset"];

        assert!(tree.take_int(&reset, 4));
        assert!(tree.contains_int(&reset, 4));
        assert!(tree.take_int(&reset, 4));
        assert!(!tree.take_int(&reset, 4));
    }

    #[test]
    fn test_shape_collisions_are_skipped() {
        let mut tree = ControlTree::from_lines(["templatetest: a/b : int : 1"]);

        let under_leaf = parse_line("templatetest: a/b/c : int : 2").unwrap();
        assert!(!tree.insert(under_leaf));

        let onto_branch = parse_line("templatetest: a : int : 3").unwrap();
        assert!(!tree.insert(onto_branch));

        assert_eq!(tree.directive_count(), 1);
    }

    #[test]
    fn test_from_reader_ignores_other_lines() {
        let log = b"This is pdfTeX\n\xff\xfe garbage\ntemplatetest: x/y : int : 7\n(./chapter1.tex)";
        let tree = ControlTree::from_reader(&log[..]).unwrap();
        assert!(tree.contains_int(&["x", "y"], 7));
        assert_eq!(tree.directive_count(), 1);
    }

    #[test]
    fn test_serialize_as_nested_mapping() {
        let tree = ControlTree::from_lines([
            "templatetest: page_numbering/disable : int : 2",
            "templatetest: note : str : draft",
        ]);
        let json = tree.to_json(JsonFormat::Compact).unwrap();
        assert_eq!(json, r#"{"note":["draft"],"page_numbering":{"disable":[2]}}"#);
    }
}
