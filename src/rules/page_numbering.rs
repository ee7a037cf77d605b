//! Continuity of printed page numbers.

use super::{DocumentKind, Rule, RuleContext, RuleId, Violation};
use crate::config::DirectiveKey;
use crate::control::{ControlTree, Persistence};

/// Control tree section holding numbering directives.
const SECTION: &str = "page_numbering";

/// Walks the pages with a running counter starting at 1 and checks that each
/// page shows the expected number: as its first word in dissertations, as
/// its last word otherwise.
///
/// Directives under `page_numbering/` adjust the walk for the page whose key
/// they name: `enable` and `disable` switch checking on and off, `reset`
/// restarts the counter at 1 and is consumed when it fires.
pub struct PageNumberingRule;

impl Rule for PageNumberingRule {
    fn id(&self) -> RuleId {
        RuleId::PageNumbering
    }

    fn description(&self) -> &str {
        "printed page numbers run consecutively"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<(), Violation> {
        let mut control = ctx.control.clone();
        let directive_key = ctx.profile.numbering.directive_key;
        let number_first = ctx.target.kind == DocumentKind::Dissertation;

        let mut checking = true;
        let mut expected: i64 = 1;

        for page in &ctx.document.pages {
            let key = match directive_key {
                DirectiveKey::Running => expected,
                DirectiveKey::Physical => i64::from(page.number),
            };

            if fires(&mut control, "enable", key) {
                checking = true;
            }
            if fires(&mut control, "disable", key) {
                checking = false;
            }
            if fires(&mut control, "reset", key) {
                log::debug!("Page numbering restarts on page {}", page.number);
                expected = 1;
            }

            if checking {
                let word = if number_first {
                    page.first_word()
                } else {
                    page.last_word()
                };
                let found = word.and_then(|w| w.text.trim().parse::<i64>().ok());
                if found != Some(expected) {
                    return Err(Violation::PageNumber {
                        page: page.number,
                        expected,
                        found: word.map_or_else(
                            || "no text".to_string(),
                            |w| format!("'{}'", w.text),
                        ),
                    });
                }
            }
            expected += 1;
        }
        Ok(())
    }
}

fn fires(control: &mut ControlTree, leaf: &str, key: i64) -> bool {
    let path = [SECTION, leaf];
    match Persistence::for_leaf(leaf) {
        Persistence::OneShot => control.take_int(&path, key),
        Persistence::Persistent => control.contains_int(&path, key),
    }
}
