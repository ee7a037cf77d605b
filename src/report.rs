//! Check results.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::rules::{RuleId, Target};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Result of a single rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed { message: String },
    Skipped { reason: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    pub rule: RuleId,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Outcome of every selected rule for one document.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub document_type: String,
    pub target: Target,
    pub page_count: u32,
    pub results: Vec<RuleReport>,
}

impl Report {
    pub fn new(document_type: impl Into<String>, target: Target, page_count: u32) -> Self {
        Self {
            document_type: document_type.into(),
            target,
            page_count,
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, rule: RuleId, outcome: Outcome) {
        self.results.push(RuleReport { rule, outcome });
    }

    /// No rule failed. Skipped rules do not count against success.
    pub fn is_success(&self) -> bool {
        !self.results.iter().any(|r| r.outcome.is_failure())
    }

    pub fn outcome(&self, rule: RuleId) -> Option<&Outcome> {
        self.results
            .iter()
            .find(|r| r.rule == rule)
            .map(|r| &r.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RuleReport> {
        self.results.iter().filter(|r| r.outcome.is_failure())
    }

    pub fn passed_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Passed))
    }

    pub fn failed_count(&self) -> usize {
        self.count(Outcome::is_failure)
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { .. }))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }

    /// Serialize the report.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        let result = match format {
            JsonFormat::Pretty => serde_json::to_string_pretty(self),
            JsonFormat::Compact => serde_json::to_string(self),
        };

        result.map_err(|e| Error::Serialize(format!("JSON serialization error: {}", e)))
    }
}
