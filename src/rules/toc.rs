//! Table-of-contents size.

use super::{Rule, RuleContext, RuleId, Violation};

pub struct TocRule;

impl Rule for TocRule {
    fn id(&self) -> RuleId {
        RuleId::Toc
    }

    fn description(&self) -> &str {
        "outline has the configured number of entries"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<(), Violation> {
        let expected = ctx.profile.toc.size.ok_or(Violation::Unconfigured("toc.size"))?;
        let actual = ctx.document.toc().len();

        if actual == expected {
            Ok(())
        } else {
            Err(Violation::TocSize { expected, actual })
        }
    }
}
