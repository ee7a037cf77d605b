//! Paper size of every page.

use super::{Rule, RuleContext, RuleId, Violation};

pub struct PaperSizeRule;

impl Rule for PaperSizeRule {
    fn id(&self) -> RuleId {
        RuleId::PaperSize
    }

    fn description(&self) -> &str {
        "every page has the configured paper size"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<(), Violation> {
        let paper = ctx.profile.paper_size;
        let width = paper.width.ok_or(Violation::Unconfigured("paper_size.width"))?;
        let height = paper.height.ok_or(Violation::Unconfigured("paper_size.height"))?;

        for page in &ctx.document.pages {
            for (dimension, expected, actual) in [
                ("width", width, page.width_mm()),
                ("height", height, page.height_mm()),
            ] {
                if actual != expected {
                    return Err(Violation::PaperSize {
                        page: page.number,
                        dimension,
                        expected,
                        actual,
                    });
                }
            }
        }
        Ok(())
    }
}
