//! Content filtering subsystem.
//!
//! # Data Flow
//! ```text
//! FilterConfig (defaults + [[filter.rules]])
//!     → rules.rs (validate & compile, fail fast)
//!     → RuleSet (immutable, stage-ordered)
//!     → content.rs (first-hit evaluation → Verdict)
//!
//! Stages:
//!     literal phrases → disallowed tokens → PII regexes
//!     → injection/jailbreak regexes → entity detector (optional)
//! ```
//!
//! # Design Decisions
//! - Rules never mutate after startup; evaluation is lock-free
//! - Block reasons name the rule that fired, not just the category

pub mod content;
pub mod defaults;
pub mod entity;
pub mod rules;

pub use content::{ContentFilter, Verdict};
pub use rules::{Category, MatcherKind, RuleError, RuleSet, RuleSpec};
