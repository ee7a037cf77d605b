//! Which rules apply to which document.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::RuleId;

/// Layout family of a document, derived from its type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Page numbers at the top of the page
    Dissertation,
    /// Page numbers at the bottom of the page
    Synopsis,
    /// Slides; most formatting checks do not apply
    Presentation,
}

impl DocumentKind {
    /// Classify a configured document type name.
    ///
    /// Names other than `dissertation` and `presentation` use the synopsis
    /// layout.
    pub fn from_type_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "dissertation" => DocumentKind::Dissertation,
            "presentation" => DocumentKind::Presentation,
            _ => DocumentKind::Synopsis,
        }
    }
}

/// The document a check run is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Target {
    pub kind: DocumentKind,
    pub draft: bool,
}

impl Target {
    pub fn new(document_type: &str, draft: bool) -> Self {
        Self {
            kind: DocumentKind::from_type_name(document_type),
            draft,
        }
    }
}

/// A condition a target must satisfy for a rule to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    NotPresentation,
    NotDraft,
    Dissertation,
}

impl Gate {
    pub fn admits(self, target: Target) -> bool {
        match self {
            Gate::NotPresentation => target.kind != DocumentKind::Presentation,
            Gate::NotDraft => !target.draft,
            Gate::Dissertation => target.kind == DocumentKind::Dissertation,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Gate::NotPresentation => "not checked for presentations",
            Gate::NotDraft => "not checked in draft builds",
            Gate::Dissertation => "only checked for dissertations",
        })
    }
}

/// Applicable rules for a target, with the gate that excludes each of the
/// others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applicability {
    excluded: BTreeMap<RuleId, Gate>,
}

impl Applicability {
    pub fn for_target(target: Target) -> Self {
        let excluded = RuleId::ALL
            .into_iter()
            .filter_map(|id| {
                id.gates()
                    .iter()
                    .find(|gate| !gate.admits(target))
                    .map(|gate| (id, *gate))
            })
            .collect();

        Self { excluded }
    }

    pub fn is_applicable(&self, id: RuleId) -> bool {
        !self.excluded.contains_key(&id)
    }

    /// The first gate that rules `id` out, if any.
    pub fn excluded_by(&self, id: RuleId) -> Option<Gate> {
        self.excluded.get(&id).copied()
    }

    /// Applicable rules in reporting order.
    pub fn applicable(&self) -> impl Iterator<Item = RuleId> + '_ {
        RuleId::ALL
            .into_iter()
            .filter(move |id| self.is_applicable(*id))
    }
}
