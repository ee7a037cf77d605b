//! Presence of configured phrases.

use super::{Rule, RuleContext, RuleId, Violation};

/// Every configured phrase must occur somewhere in the document.
///
/// Matching ignores whitespace and letter case, so phrases survive justified
/// typesetting and line breaks.
pub struct RequiredTextRule;

impl Rule for RequiredTextRule {
    fn id(&self) -> RuleId {
        RuleId::RequiredText
    }

    fn description(&self) -> &str {
        "configured phrases occur in the document"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<(), Violation> {
        for text in &ctx.profile.required_text {
            let hits = ctx.document.search_count(text);
            log::debug!("'{}' found {} time(s)", text, hits);
            if hits == 0 {
                return Err(Violation::MissingText(text.clone()));
            }
        }
        Ok(())
    }
}
