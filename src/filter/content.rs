//! Content filter: first-hit evaluation of a prompt against the rule set.

use serde::Serialize;

use crate::filter::rules::{Category, RuleSet};

/// Decision for one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub blocked: bool,
    pub reason: Option<String>,
}

impl Verdict {
    pub fn clean() -> Self {
        Self {
            blocked: false,
            reason: None,
        }
    }

    pub fn blocked(reason: String) -> Self {
        Self {
            blocked: true,
            reason: Some(reason),
        }
    }
}

/// Stateless evaluator over an immutable [`RuleSet`].
///
/// `evaluate` takes `&self` and touches no shared mutable state, so one
/// instance serves every request concurrently without locking.
#[derive(Debug)]
pub struct ContentFilter {
    rules: RuleSet,
}

impl ContentFilter {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Evaluate `text`, short-circuiting on the first matching rule.
    ///
    /// Literal and regex rules see the lower-cased text; the entity detector,
    /// if any, sees the original.
    pub fn evaluate(&self, text: &str) -> Verdict {
        if text.is_empty() {
            return Verdict::clean();
        }

        let lowered = text.to_lowercase();
        if let Some(rule) = self.rules.rules().iter().find(|r| r.matches(&lowered)) {
            return Verdict::blocked(rule.reason());
        }

        if let Some(detector) = self.rules.entity_detector() {
            if let Some(entity) = detector.detect(text) {
                return Verdict::blocked(format!("{}: {}", Category::Pii, entity.description()));
            }
        }

        Verdict::clean()
    }
}
