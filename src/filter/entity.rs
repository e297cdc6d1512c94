//! Structured entity detection.
//!
//! Runs last and sees the original casing of the prompt, since capitalization
//! is most of the signal for names and organizations.

use std::fmt;

use regex::Regex;

/// Entity label reported in block reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLabel {
    Person,
    Location,
    Organization,
    Date,
    Quantity,
    Money,
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityLabel::Person => "PERSON",
            EntityLabel::Location => "LOC",
            EntityLabel::Organization => "ORG",
            EntityLabel::Date => "DATE",
            EntityLabel::Quantity => "QUANTITY",
            EntityLabel::Money => "MONEY",
        };
        f.write_str(label)
    }
}

/// A detected entity span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMatch {
    pub text: String,
    pub label: EntityLabel,
}

impl EntityMatch {
    pub fn description(&self) -> String {
        format!("detected entity '{}' ({})", self.text, self.label)
    }
}

/// A named-entity detector plugged in as the final filter stage.
///
/// Implementations must be pure: no I/O, same input same answer.
pub trait EntityDetector: Send + Sync {
    fn detect(&self, text: &str) -> Option<EntityMatch>;
}

/// Regex-based detector for common entity shapes.
pub struct PatternEntityDetector {
    patterns: Vec<(EntityLabel, Regex)>,
}

impl PatternEntityDetector {
    pub fn new() -> Result<Self, regex::Error> {
        let table: [(EntityLabel, &str); 6] = [
            (
                EntityLabel::Money,
                r"[$€£]\s?\d[\d,]*(?:\.\d+)?|\b\d[\d,]*(?:\.\d+)?\s?(?:USD|EUR|GBP|dollars|euros|pounds)\b",
            ),
            (
                EntityLabel::Date,
                r"\b(?:\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/\d{2,4}|(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2}(?:st|nd|rd|th)?(?:,\s*\d{4})?)\b",
            ),
            (
                EntityLabel::Person,
                r"\b(?:Mr|Mrs|Ms|Dr|Prof)\.?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?",
            ),
            (
                EntityLabel::Organization,
                r"\b(?:[A-Z][A-Za-z&]+\s+)+(?:Inc|Corp|Corporation|LLC|Ltd|GmbH|Bank|University)\b",
            ),
            (
                EntityLabel::Location,
                r"\b\d{1,5}\s+(?:[A-Z][a-z]+\s+)+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive)\b",
            ),
            (
                EntityLabel::Quantity,
                r"\b\d+(?:\.\d+)?\s?(?:kg|lbs?|km|miles|meters|litres|liters|tons)\b",
            ),
        ];

        let patterns = table
            .into_iter()
            .map(|(label, pattern)| Regex::new(pattern).map(|re| (label, re)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }
}

impl EntityDetector for PatternEntityDetector {
    fn detect(&self, text: &str) -> Option<EntityMatch> {
        self.patterns.iter().find_map(|(label, re)| {
            re.find(text).map(|m| EntityMatch {
                text: m.as_str().trim().to_string(),
                label: *label,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> Option<EntityMatch> {
        PatternEntityDetector::new().unwrap().detect(text)
    }

    #[test]
    fn detects_each_label() {
        assert_eq!(detect("wire $1,200.50 today").unwrap().label, EntityLabel::Money);
        assert_eq!(detect("meet on March 3rd, 2024").unwrap().label, EntityLabel::Date);
        assert_eq!(detect("ask Dr. Watson").unwrap().label, EntityLabel::Person);
        assert_eq!(detect("I work at Acme Widgets Inc").unwrap().label, EntityLabel::Organization);
        assert_eq!(detect("ship to 221 Baker Street").unwrap().label, EntityLabel::Location);
        assert_eq!(detect("it weighs 12 kg").unwrap().label, EntityLabel::Quantity);
    }

    #[test]
    fn casing_matters() {
        assert!(detect("ask dr. watson").is_none());
        assert!(detect("write me a poem about spring").is_none());
    }

    #[test]
    fn description_names_text_and_label() {
        let m = detect("ask Dr. Watson").unwrap();
        assert_eq!(m.description(), "detected entity 'Dr. Watson' (PERSON)");
    }
}
