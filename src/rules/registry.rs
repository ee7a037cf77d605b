//! Rule registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{
    AnnotationRule, BibliographyRule, FigureLinkRule, FontRule, MarginRule, MetadataRule,
    PageCountRule, PageNumberingRule, PaperSizeRule, RequiredTextRule, Rule, RuleId,
    TableLinkRule, TocRule,
};

/// Registry of validation rules, keyed by [`RuleId`].
///
/// Iteration follows [`RuleId`] order regardless of registration order.
pub struct RuleRegistry {
    rules: BTreeMap<RuleId, Arc<dyn Rule>>,
}

impl RuleRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Create a registry with every built-in rule.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(AnnotationRule));
        registry.register(Arc::new(TocRule));
        registry.register(Arc::new(PaperSizeRule));
        registry.register(Arc::new(MarginRule));
        registry.register(Arc::new(PageNumberingRule));
        registry.register(Arc::new(RequiredTextRule));
        registry.register(Arc::new(PageCountRule));
        registry.register(Arc::new(MetadataRule));
        registry.register(Arc::new(FontRule));
        registry.register(Arc::new(FigureLinkRule));
        registry.register(Arc::new(TableLinkRule));
        registry.register(Arc::new(BibliographyRule::new()));
        registry
    }

    /// Register a rule, replacing any rule with the same id.
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        self.rules.insert(rule.id(), rule);
    }

    /// Get a rule by id.
    pub fn get(&self, id: RuleId) -> Option<Arc<dyn Rule>> {
        self.rules.get(&id).cloned()
    }

    pub fn contains(&self, id: RuleId) -> bool {
        self.rules.contains_key(&id)
    }

    /// Registered ids in reporting order.
    pub fn ids(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.rules.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Rule>> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
