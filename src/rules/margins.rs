//! Minimum distance between text and page edges.

use super::{Rule, RuleContext, RuleId, Violation};
use crate::model::point_to_mm;

/// Compares the bounding box of all text on a page against the configured
/// minimum margins.
///
/// The right and bottom margins are measured from the configured paper size,
/// or from the page's own size when none is configured. Pages without text
/// are skipped.
pub struct MarginRule;

impl Rule for MarginRule {
    fn id(&self) -> RuleId {
        RuleId::Margins
    }

    fn description(&self) -> &str {
        "text keeps the configured distance from page edges"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<(), Violation> {
        let margins = ctx.profile.margins;
        let paper = ctx.profile.paper_size;

        for page in &ctx.document.pages {
            let Some(bounds) = page.text_bounds() else {
                log::debug!("Page {} has no text, margins not checked", page.number);
                continue;
            };
            let paper_width = paper.width.unwrap_or_else(|| page.width_mm());
            let paper_height = paper.height.unwrap_or_else(|| page.height_mm());

            let measured = [
                ("left", point_to_mm(bounds.x0), margins.left()),
                ("top", point_to_mm(bounds.y0), margins.top()),
                ("right", paper_width - point_to_mm(bounds.x1), margins.right()),
                ("bottom", paper_height - point_to_mm(bounds.y1), margins.bottom()),
            ];
            for (side, measured, minimum) in measured {
                if measured < minimum {
                    return Err(Violation::Margin {
                        page: page.number,
                        side,
                        measured,
                        minimum,
                    });
                }
            }
        }
        Ok(())
    }
}
