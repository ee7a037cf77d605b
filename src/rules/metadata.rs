//! Info dictionary fields.

use super::{Rule, RuleContext, RuleId, Violation};
use crate::config::MetadataExpectations;

pub struct MetadataRule;

impl Rule for MetadataRule {
    fn id(&self) -> RuleId {
        RuleId::Metadata
    }

    fn description(&self) -> &str {
        "author, title and subject match the configuration"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<(), Violation> {
        for field in MetadataExpectations::FIELDS {
            let expected = ctx.profile.metadata.expected(field);
            let actual = ctx
                .document
                .metadata
                .field(field)
                .map(str::trim)
                .unwrap_or_default();

            if actual != expected {
                return Err(Violation::Metadata {
                    field,
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                });
            }
        }
        Ok(())
    }
}
