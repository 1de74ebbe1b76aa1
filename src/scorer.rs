//! Priority scoring: turns an undocumented entity or a broken
//! reference into a single `[0, 1]` urgency score doc-maintainers can sort
//! by, starting from a base of 0.5 and applying additive/subtractive
//! adjustments for how visible the issue is, plus a human-readable reason
//! string spelling out which adjustments fired.

use crate::models::{CodeEntity, DocReference, EntityKind, ReferenceKind};

const BASE_SCORE: f64 = 0.5;

const CLASS_BONUS: f64 = 0.2;
const FUNCTION_BONUS: f64 = 0.1;
const LEADING_UNDERSCORE_PENALTY: f64 = 0.3;
const PUBLIC_NAME_BONUS: f64 = 0.2;
const HAS_PARENT_PENALTY: f64 = 0.1;
const DUNDER_PENALTY: f64 = 0.3;

const NEAR_TOP_BONUS: f64 = 0.2;
const EARLY_IN_FILE_BONUS: f64 = 0.1;
const HEADER_KIND_BONUS: f64 = 0.2;
const CODE_BLOCK_KIND_BONUS: f64 = 0.1;
const CLOSE_MATCH_BONUS: f64 = 0.2;

const NEAR_TOP_LINE: usize = 20;
const EARLY_IN_FILE_LINE: usize = 50;

/// Priority band a caller sorts or buckets issues by.
pub const HIGH_THRESHOLD: f64 = 0.7;
pub const MEDIUM_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityBand {
    High,
    Medium,
    Low,
}

impl PriorityBand {
    pub fn for_score(score: f64) -> Self {
        if score >= HIGH_THRESHOLD {
            PriorityBand::High
        } else if score >= MEDIUM_THRESHOLD {
            PriorityBand::Medium
        } else {
            PriorityBand::Low
        }
    }
}

/// A computed priority score plus the human-readable reason it landed there.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredIssue {
    pub score: f64,
    pub reason: String,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn finish(score: f64, reasons: Vec<&'static str>) -> ScoredIssue {
    let reason = if reasons.is_empty() {
        "no adjustments apply".to_string()
    } else {
        reasons.join(", ")
    };
    ScoredIssue { score: round2(score.clamp(0.0, 1.0)), reason }
}

/// Score how urgent it is to document `entity`.
pub fn score_undocumented(entity: &CodeEntity) -> ScoredIssue {
    let mut score = BASE_SCORE;
    let mut reasons = Vec::new();

    match entity.kind {
        EntityKind::Class => {
            score += CLASS_BONUS;
            reasons.push("is a class");
        }
        EntityKind::Function => {
            score += FUNCTION_BONUS;
            reasons.push("is a function");
        }
        _ => {}
    }

    if entity.is_private() {
        score -= LEADING_UNDERSCORE_PENALTY;
        reasons.push("name starts with an underscore");
    } else {
        score += PUBLIC_NAME_BONUS;
        reasons.push("name does not start with an underscore");
    }

    if entity.parent_name.is_some() {
        score -= HAS_PARENT_PENALTY;
        reasons.push("has a parent (is a method)");
    }

    if entity.is_dunder() {
        score -= DUNDER_PENALTY;
        reasons.push("is a dunder method");
    }

    finish(score, reasons)
}

/// Score how urgent it is to fix a reference that names no known entity.
/// `close_match_found` reports whether a similarly named entity turned up
/// in the name index (a likely rename or typo, raising the priority since
/// the fix is probably easy).
pub fn score_broken_reference(reference: &DocReference, close_match_found: bool) -> ScoredIssue {
    let mut score = BASE_SCORE;
    let mut reasons = Vec::new();

    let line = reference.location.line_start;
    if line <= NEAR_TOP_LINE {
        score += NEAR_TOP_BONUS;
        reasons.push("appears near the top of the file");
    } else if line <= EARLY_IN_FILE_LINE {
        score += EARLY_IN_FILE_BONUS;
        reasons.push("appears early in the file");
    }

    match reference.kind {
        ReferenceKind::Header => {
            score += HEADER_KIND_BONUS;
            reasons.push("is a header");
        }
        ReferenceKind::CodeBlock => {
            score += CODE_BLOCK_KIND_BONUS;
            reasons.push("is inside a code block");
        }
        _ => {}
    }

    if close_match_found {
        score += CLOSE_MATCH_BONUS;
        reasons.push("a similarly named entity was found");
    }

    finish(score, reasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    #[test]
    fn public_class_scores_high() {
        let entity = CodeEntity::new("PublicClass", EntityKind::Class, Location::new("src/app.py", 1));
        assert!(score_undocumented(&entity).score >= 0.7);
    }

    #[test]
    fn dunder_method_scores_low() {
        let entity = CodeEntity::new("__init__", EntityKind::Method, Location::new("src/app.py", 1)).with_parent("MyClass");
        assert!(score_undocumented(&entity).score <= 0.3);
    }

    #[test]
    fn private_function_scores_moderate() {
        let entity = CodeEntity::new("_helper", EntityKind::Function, Location::new("src/app.py", 1));
        assert!(score_undocumented(&entity).score <= 0.4);
    }

    #[test]
    fn reason_string_lists_each_trigger() {
        let entity = CodeEntity::new("PublicClass", EntityKind::Class, Location::new("src/app.py", 1));
        let scored = score_undocumented(&entity);
        assert!(scored.reason.contains("is a class"));
        assert!(scored.reason.contains("does not start with an underscore"));
    }

    #[test]
    fn broken_reference_near_top_of_file_scores_higher_than_later() {
        let near_top = DocReference::new("fake_func", Location::new("README.md", 5), ReferenceKind::InlineCode);
        let further_down = DocReference::new("fake_func", Location::new("README.md", 80), ReferenceKind::InlineCode);
        assert!(score_broken_reference(&near_top, false).score > score_broken_reference(&further_down, false).score);
    }

    #[test]
    fn close_match_raises_broken_reference_score() {
        let reference = DocReference::new("fake_func", Location::new("README.md", 80), ReferenceKind::InlineCode);
        let without = score_broken_reference(&reference, false);
        let with = score_broken_reference(&reference, true);
        assert!(with.score > without.score);
    }

    #[test]
    fn score_is_rounded_to_two_decimals() {
        let entity = CodeEntity::new("PublicClass", EntityKind::Class, Location::new("src/app.py", 1));
        let scored = score_undocumented(&entity);
        assert_eq!(scored.score, round2(scored.score));
    }

    #[test]
    fn priority_band_matches_thresholds() {
        assert_eq!(PriorityBand::for_score(0.9), PriorityBand::High);
        assert_eq!(PriorityBand::for_score(0.5), PriorityBand::Medium);
        assert_eq!(PriorityBand::for_score(0.1), PriorityBand::Low);
    }
}
