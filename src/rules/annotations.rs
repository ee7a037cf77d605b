//! No page may carry annotations.

use super::{Rule, RuleContext, RuleId, Violation};

/// Fails on the first page with comments, highlights or other annotations.
///
/// Links and form widgets are not annotations in this sense.
pub struct AnnotationRule;

impl Rule for AnnotationRule {
    fn id(&self) -> RuleId {
        RuleId::Annotations
    }

    fn description(&self) -> &str {
        "no page carries annotations"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<(), Violation> {
        match ctx.document.pages.iter().find(|p| !p.annotations.is_empty()) {
            Some(page) => Err(Violation::Annotations {
                page: page.number,
                count: page.annotations.len(),
                subtypes: page
                    .annotations
                    .iter()
                    .map(|a| a.subtype.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
            None => Ok(()),
        }
    }
}
