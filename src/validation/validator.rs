use crate::validation::rules::{
    BalancedBracesRule, BuilderCallRule, CheckPhaseRule, ClosingBraceRule, FunctionHeaderRule,
    InstallPhaseRule, MetaSectionRule, PlaceholderHashRule, RequiredAttributesRule,
    ValidationRule,
};
use tracing::debug;

pub struct DerivationValidator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl DerivationValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    /// Warnings from every rule, in rule order
    pub fn validate(&self, derivation: &str) -> Vec<String> {
        let mut warnings = Vec::new();
        for rule in &self.rules {
            let found = rule.check(derivation);
            if !found.is_empty() {
                debug!(rule = rule.name(), warnings = found.len(), "Validation rule reported");
            }
            warnings.extend(found);
        }
        warnings
    }
}

impl Default for DerivationValidator {
    fn default() -> Self {
        Self {
            rules: vec![
                Box::new(FunctionHeaderRule),
                Box::new(ClosingBraceRule),
                Box::new(RequiredAttributesRule),
                Box::new(MetaSectionRule),
                Box::new(BalancedBracesRule),
                Box::new(BuilderCallRule),
                Box::new(InstallPhaseRule),
                Box::new(CheckPhaseRule),
                Box::new(PlaceholderHashRule),
            ],
        }
    }
}
