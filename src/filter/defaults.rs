//! Built-in policy table.
//!
//! Literal phrases deliberately have no word-boundary requirement; the regex
//! rules carry explicit anchors. Extend or replace this table through
//! `[[filter.rules]]` in the config file.

use crate::filter::rules::{Category, RuleSpec};

const FORBIDDEN_PHRASES: &[&str] = &[
    "ignore previous",
    "disregard all",
    "you are a",
    "bypass",
    "override",
];

const DISALLOWED_TOKENS: &[(&str, &str)] = &[
    ("<|endoftext|>", "end-of-text token"),
    ("<|system|>", "system role token"),
    ("<script>", "script tag may embed JS"),
    ("`{`eval`}`", "potential code evaluation token"),
];

const PII_PATTERNS: &[(&str, &str)] = &[
    (r"\b\d{3}-\d{2}-\d{4}\b", "SSN-like digit group"),
    (r"\b\d{13,19}\b", "card-number-like digit run"),
    (r"\b\d{5}(?:-\d{4})?\b", "ZIP-like digit group"),
    (r"\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b", "email address"),
];

const INJECTION_PATTERNS: &[(&str, &str)] = &[
    (r"\bshutdown system\b", "shutdown system"),
    (r"\bdelete all data\b", "delete all data"),
    (r"\bpassword\b.*\badmin\b", "password ... admin probe"),
    (r"\b(?:what's|what is) the admin password\b", "admin password question"),
];

const JAILBREAK_PATTERNS: &[(&str, &str)] = &[
    (r"\bignore all previous instructions\b", "ignore all previous instructions"),
    (r"\brevoke all limitations\b", "revoke all limitations"),
    (r"\blet's ignore your policy\b", "let's ignore your policy"),
    (r"\bwhen i say\b.*\bignore your (?:rules|policy)\b", "DAN-style trigger phrase"),
    (r"\\u0069gnore\s+previous", "escaped 'ignore previous'"),
];

/// The default rule table, in declaration order.
pub fn default_rules() -> Vec<RuleSpec> {
    let phrases = FORBIDDEN_PHRASES
        .iter()
        .map(|p| RuleSpec::literal(Category::Injection, p, p));

    let tokens = DISALLOWED_TOKENS
        .iter()
        .map(|(tok, why)| RuleSpec::literal(Category::DisallowedToken, tok, &format!("{tok} ({why})")));

    let pii = PII_PATTERNS
        .iter()
        .map(|(pat, desc)| RuleSpec::regex(Category::Pii, pat, desc));

    let injection = INJECTION_PATTERNS
        .iter()
        .map(|(pat, desc)| RuleSpec::regex(Category::Injection, pat, desc));

    let jailbreak = JAILBREAK_PATTERNS
        .iter()
        .map(|(pat, desc)| RuleSpec::regex(Category::Jailbreak, pat, desc));

    phrases
        .chain(tokens)
        .chain(pii)
        .chain(injection)
        .chain(jailbreak)
        .collect()
}
