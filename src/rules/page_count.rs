//! Page count bounds.

use super::{Rule, RuleContext, RuleId, Violation};

/// `min_pages <= pages <= max_pages`.
///
/// Unconfigured bounds default to 100 and 0, so a profile without an upper
/// bound never passes.
pub struct PageCountRule;

impl Rule for PageCountRule {
    fn id(&self) -> RuleId {
        RuleId::PageCount
    }

    fn description(&self) -> &str {
        "page count lies within the configured bounds"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<(), Violation> {
        let (min, max) = (ctx.profile.pages.min(), ctx.profile.pages.max());
        let count = ctx.document.page_count();

        if (min..=max).contains(&count) {
            Ok(())
        } else {
            Err(Violation::PageCount { count, min, max })
        }
    }
}
