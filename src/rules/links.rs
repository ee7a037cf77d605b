//! Figure and table cross-references.
//!
//! Entries of the list of figures (tables) link to the pages holding the
//! captions. Every destination page must show the caption label at least as
//! many times as entries point to it.

use super::{Rule, RuleContext, RuleId, Violation};
use crate::model::Document;

pub struct FigureLinkRule;

impl Rule for FigureLinkRule {
    fn id(&self) -> RuleId {
        RuleId::FigureLinks
    }

    fn description(&self) -> &str {
        "list of figures links to pages with figure captions"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<(), Violation> {
        check_links(
            ctx.document,
            &ctx.profile.sections.figures,
            &ctx.profile.labels.figure,
        )
    }
}

pub struct TableLinkRule;

impl Rule for TableLinkRule {
    fn id(&self) -> RuleId {
        RuleId::TableLinks
    }

    fn description(&self) -> &str {
        "list of tables links to pages with table captions"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<(), Violation> {
        check_links(
            ctx.document,
            &ctx.profile.sections.tables,
            &ctx.profile.labels.table,
        )
    }
}

fn check_links(document: &Document, section: &str, label: &str) -> Result<(), Violation> {
    for page_num in document.section_range(section)? {
        let Some(page) = document.get_page(page_num) else {
            continue;
        };

        for (target, links) in page.link_targets() {
            let found = document
                .get_page(target)
                .map_or(0, |p| p.search_count(label));
            if found < links {
                return Err(Violation::LinkTarget {
                    from_page: page_num,
                    target,
                    label: label.to_string(),
                    links,
                    found,
                });
            }
        }
    }
    Ok(())
}
