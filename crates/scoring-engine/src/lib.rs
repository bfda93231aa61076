//! Scorer
//!
//! Turns an indicator set into a composite 1-100 score with a zone
//! label. Rules are data: each indicator carries a weight and a band
//! table, weights renormalize over whatever is actually available.

pub mod analyzer;
pub mod rules;
pub mod scorer;

pub use analyzer::SnapshotAnalyzer;
pub use rules::{RuleKind, ScoreRule, ScoreRules};
pub use scorer::Scorer;
