use serde::{Deserialize, Serialize};

use crate::domain::course::{CatalogCourse, InputCourseDescriptor};
use crate::{ACCEPTED_THRESHOLD, PARTIAL_THRESHOLD};

/// Categorical outcome derived from an equivalency score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accepted,
    Partial,
    Rejected,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Accepted => "accepted",
            Decision::Partial => "partial",
            Decision::Rejected => "rejected",
        }
    }
}

/// Cut points used to classify a score.
///
/// Defaults to the domain constants `80` and `50`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionThresholds {
    pub accepted: f64,
    pub partial: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            accepted: ACCEPTED_THRESHOLD,
            partial: PARTIAL_THRESHOLD,
        }
    }
}

impl DecisionThresholds {
    /// Both cut points are finite and `partial <= accepted`, so every
    /// decision stays reachable.
    pub fn is_ordered(&self) -> bool {
        self.accepted.is_finite() && self.partial.is_finite() && self.partial <= self.accepted
    }

    /// `score >= accepted` is accepted, `score >= partial` is partial and
    /// anything else (negative scores and NaN included) is rejected.
    pub fn classify(&self, score: f64) -> Decision {
        if score >= self.accepted {
            Decision::Accepted
        } else if score >= self.partial {
            Decision::Partial
        } else {
            Decision::Rejected
        }
    }
}

/// Classify a score with the default thresholds.
pub fn classify(score: f64) -> Decision {
    DecisionThresholds::default().classify(score)
}

/// Best catalog match for one input unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// `None` only when the candidate catalog was empty.
    pub matched: Option<CatalogCourse>,
    /// Cosine similarity times 100. Not clamped at zero.
    pub score: f64,
    pub decision: Decision,
}

impl MatchResult {
    /// Result reported when there is nothing to match against.
    pub fn no_candidates() -> Self {
        Self {
            matched: None,
            score: 0.0,
            decision: Decision::Rejected,
        }
    }
}

/// One plan item paired with its match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanItemResult {
    pub input: InputCourseDescriptor,
    #[serde(flatten)]
    pub result: MatchResult,
}

/// Per-item results of a plan, in input order, plus the aggregate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanMatchResult {
    pub items: Vec<PlanItemResult>,
    /// Unweighted mean of the item scores.
    pub aggregate_score: f64,
    pub decision: Decision,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_uses_inclusive_lower_bounds() {
        assert_eq!(classify(80.0), Decision::Accepted);
        assert_eq!(classify(79.999), Decision::Partial);
        assert_eq!(classify(50.0), Decision::Partial);
        assert_eq!(classify(49.999), Decision::Rejected);
        assert_eq!(classify(-5.0), Decision::Rejected);
        assert_eq!(classify(100.0), Decision::Accepted);
    }

    #[test]
    fn nan_is_rejected() {
        assert_eq!(classify(f64::NAN), Decision::Rejected);
    }

    #[test]
    fn custom_thresholds_move_the_cut_points() {
        let thresholds = DecisionThresholds {
            accepted: 90.0,
            partial: 60.0,
        };
        assert_eq!(thresholds.classify(85.0), Decision::Partial);
        assert_eq!(thresholds.classify(55.0), Decision::Rejected);
        assert_eq!(thresholds.classify(90.0), Decision::Accepted);
    }

    #[test]
    fn thresholds_must_keep_partial_below_accepted() {
        assert!(DecisionThresholds::default().is_ordered());
        assert!(DecisionThresholds { accepted: 70.0, partial: 70.0 }.is_ordered());
        assert!(!DecisionThresholds { accepted: 40.0, partial: 60.0 }.is_ordered());
        assert!(!DecisionThresholds { accepted: f64::NAN, partial: 50.0 }.is_ordered());
    }

    #[test]
    fn decisions_serialize_lowercase() {
        let json = serde_json::to_string(&Decision::Partial).expect("serializable");
        assert_eq!(json, "\"partial\"");
        assert_eq!(Decision::Accepted.as_str(), "accepted");
    }

    #[test]
    fn empty_catalog_result_is_rejected_with_zero_score() {
        let result = MatchResult::no_candidates();
        assert!(result.matched.is_none());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.decision, Decision::Rejected);
    }
}
