//! Declarative policy rules and their compiled form.
//!
//! A [`RuleSpec`] is what configuration authors write. [`RuleSet::compile`]
//! turns a list of specs into matchers, rejecting the whole table if any entry
//! is unusable. Compiled rules are immutable and shared read-only by every
//! request.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::FilterConfig;
use crate::filter::defaults::default_rules;
use crate::filter::entity::{EntityDetector, PatternEntityDetector};

/// Policy category a rule belongs to. Appears as the prefix of a block reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Injection,
    Pii,
    Jailbreak,
    DisallowedToken,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Injection => "injection",
            Category::Pii => "pii",
            Category::Jailbreak => "jailbreak",
            Category::DisallowedToken => "disallowed-token",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a rule's pattern is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    /// Case-insensitive substring, matched anywhere in the text.
    Literal,
    /// Case-insensitive regular expression.
    Regex,
}

/// A single rule as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub kind: MatcherKind,
    pub category: Category,
    pub pattern: String,
    pub description: String,
}

impl RuleSpec {
    pub fn literal(category: Category, pattern: &str, description: &str) -> Self {
        Self {
            kind: MatcherKind::Literal,
            category,
            pattern: pattern.to_string(),
            description: description.to_string(),
        }
    }

    pub fn regex(category: Category, pattern: &str, description: &str) -> Self {
        Self {
            kind: MatcherKind::Regex,
            category,
            pattern: pattern.to_string(),
            description: description.to_string(),
        }
    }
}

/// Errors found while compiling a rule table.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule #{index} ({description}) has an empty pattern")]
    EmptyPattern { index: usize, description: String },

    #[error("rule #{index} has an empty description")]
    EmptyDescription { index: usize },

    #[error("rule #{index} ({description}) does not compile: {source}")]
    InvalidRegex {
        index: usize,
        description: String,
        #[source]
        source: regex::Error,
    },

    #[error("entity detector does not compile: {0}")]
    EntityDetector(#[source] regex::Error),
}

/// Evaluation stage. Rules run stage by stage, declaration order within a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    LiteralPhrase,
    DisallowedToken,
    PiiPattern,
    PhrasePattern,
}

#[derive(Debug)]
enum Matcher {
    /// Pattern stored lower-cased.
    Literal(String),
    Regex(Regex),
}

/// A compiled rule.
#[derive(Debug)]
pub struct Rule {
    category: Category,
    description: String,
    matcher: Matcher,
}

impl Rule {
    fn compile(index: usize, spec: &RuleSpec) -> Result<Self, RuleError> {
        if spec.description.trim().is_empty() {
            return Err(RuleError::EmptyDescription { index });
        }
        if spec.pattern.is_empty() {
            return Err(RuleError::EmptyPattern {
                index,
                description: spec.description.clone(),
            });
        }

        let matcher = match spec.kind {
            MatcherKind::Literal => Matcher::Literal(spec.pattern.to_lowercase()),
            MatcherKind::Regex => {
                let regex = RegexBuilder::new(&spec.pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| RuleError::InvalidRegex {
                        index,
                        description: spec.description.clone(),
                        source,
                    })?;
                Matcher::Regex(regex)
            }
        };

        Ok(Self {
            category: spec.category,
            description: spec.description.clone(),
            matcher,
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn stage(&self) -> Stage {
        match (&self.matcher, self.category) {
            (Matcher::Literal(_), Category::DisallowedToken) => Stage::DisallowedToken,
            (Matcher::Literal(_), _) => Stage::LiteralPhrase,
            (Matcher::Regex(_), Category::Pii) => Stage::PiiPattern,
            (Matcher::Regex(_), _) => Stage::PhrasePattern,
        }
    }

    /// Test the rule against already lower-cased text.
    pub fn matches(&self, lowered: &str) -> bool {
        match &self.matcher {
            Matcher::Literal(needle) => lowered.contains(needle.as_str()),
            Matcher::Regex(regex) => regex.is_match(lowered),
        }
    }

    /// Block reason for this rule: `<category>: <description>`.
    pub fn reason(&self) -> String {
        format!("{}: {}", self.category, self.description)
    }
}

/// The compiled, ordered policy table.
pub struct RuleSet {
    rules: Vec<Rule>,
    entities: Option<Box<dyn EntityDetector>>,
}

impl RuleSet {
    /// Compile `specs`, collecting every invalid entry.
    pub fn compile(specs: &[RuleSpec]) -> Result<Self, Vec<RuleError>> {
        let mut rules = Vec::with_capacity(specs.len());
        let mut errors = Vec::new();

        for (index, spec) in specs.iter().enumerate() {
            match Rule::compile(index, spec) {
                Ok(rule) => rules.push(rule),
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        // Stable: declaration order survives within a stage
        rules.sort_by_key(Rule::stage);

        Ok(Self {
            rules,
            entities: None,
        })
    }

    /// Build the table described by the filter configuration.
    pub fn from_config(config: &FilterConfig) -> Result<Self, Vec<RuleError>> {
        let mut specs = if config.use_default_rules {
            default_rules()
        } else {
            Vec::new()
        };
        specs.extend(config.rules.iter().cloned());

        let set = Self::compile(&specs)?;
        if config.entity_detection {
            let detector =
                PatternEntityDetector::new().map_err(|e| vec![RuleError::EntityDetector(e)])?;
            Ok(set.with_entity_detector(Box::new(detector)))
        } else {
            Ok(set)
        }
    }

    /// Attach a structured entity detector as the final stage.
    pub fn with_entity_detector(mut self, detector: Box<dyn EntityDetector>) -> Self {
        self.entities = Some(detector);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn entity_detector(&self) -> Option<&dyn EntityDetector> {
        self.entities.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.entities.is_none()
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.rules.len())
            .field("entity_detection", &self.entities.is_some())
            .finish()
    }
}
