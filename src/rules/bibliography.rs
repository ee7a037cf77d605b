//! Bibliography numbering.

use regex::Regex;

use super::{Rule, RuleContext, RuleId, Violation};

/// Within the bibliography section, every text block starting with `N.`
/// must carry the next number of the sequence 1, 2, 3, …
pub struct BibliographyRule {
    entry: Regex,
}

impl BibliographyRule {
    pub fn new() -> Self {
        Self {
            entry: Regex::new(r"^(\d+)\.").expect("bibliography entry pattern is valid"),
        }
    }

    fn entry_number(&self, text: &str) -> Option<u64> {
        self.entry.captures(text)?.get(1)?.as_str().parse().ok()
    }
}

impl Default for BibliographyRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for BibliographyRule {
    fn id(&self) -> RuleId {
        RuleId::Bibliography
    }

    fn description(&self) -> &str {
        "bibliography entries are numbered consecutively"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<(), Violation> {
        let document = ctx.document;
        let mut expected = 1u64;

        for page_num in document.section_range(&ctx.profile.sections.bibliography)? {
            let Some(page) = document.get_page(page_num) else {
                continue;
            };
            for block in &page.blocks {
                let Some(found) = self.entry_number(&block.text) else {
                    continue;
                };
                if found != expected {
                    return Err(Violation::BibliographyNumber {
                        page: page_num,
                        expected,
                        found,
                    });
                }
                expected += 1;
            }
        }

        log::debug!("Checked {} bibliography entries", expected - 1);
        Ok(())
    }
}
