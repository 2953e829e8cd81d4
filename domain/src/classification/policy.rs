//! Confidence gate between classification and coordination.
//!
//! Low confidence is not an exceptional path: [`ConfidencePolicy::evaluate`]
//! returns `Err(EscalationRequired)` as ordinary data so the orchestrator can
//! route it to the escalation subsystem (or surface it as an error when
//! escalation is disabled).

use super::category::CategoryScore;
use super::result::ClassificationResult;
use crate::escalation::trigger::{EscalationRequired, TriggerReason};
use serde::{Deserialize, Serialize};

/// Thresholds deciding when a classification needs a human decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidencePolicy {
    /// Minimum confidence accepted without escalation
    pub threshold: f64,
    /// Two categories whose scores differ by at most this much are ambiguous
    pub ambiguity_band: f64,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            threshold: 0.60,
            ambiguity_band: 0.10,
        }
    }
}

impl ConfidencePolicy {
    pub fn new(threshold: f64, ambiguity_band: f64) -> Self {
        Self {
            threshold,
            ambiguity_band,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_ambiguity_band(mut self, band: f64) -> Self {
        self.ambiguity_band = band;
        self
    }

    /// Accept the classification or report why a human must decide.
    ///
    /// Low confidence is checked before ambiguity; a result that is both is
    /// reported as low confidence.
    pub fn evaluate(
        &self,
        result: ClassificationResult,
    ) -> Result<ClassificationResult, EscalationRequired> {
        if result.confidence() < self.threshold {
            let reason = TriggerReason::LowConfidence {
                category: result.category(),
                confidence: result.confidence(),
                threshold: self.threshold,
            };
            return Err(EscalationRequired::new(result, reason));
        }

        let candidates = self.ambiguous_candidates(result.scores());
        if candidates.len() >= 2 {
            let reason = TriggerReason::Ambiguous {
                candidates,
                band: self.ambiguity_band,
            };
            return Err(EscalationRequired::new(result, reason));
        }

        Ok(result)
    }

    /// Categories scoring within the ambiguity band of the top score.
    fn ambiguous_candidates(&self, scores: &[CategoryScore]) -> Vec<CategoryScore> {
        let Some(top) = scores.first() else {
            return Vec::new();
        };
        scores
            .iter()
            .filter(|s| top.score - s.score <= self.ambiguity_band)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::category::Category;
    use crate::classification::result::AttemptId;

    fn result(confidence: f64, scores: Vec<CategoryScore>) -> ClassificationResult {
        ClassificationResult::new(
            AttemptId::new(),
            Category::Configured,
            confidence,
            "test",
            vec![],
            scores,
        )
        .unwrap()
    }

    #[test]
    fn test_high_confidence_passes() {
        let policy = ConfidencePolicy::default();
        let accepted = policy.evaluate(result(0.92, vec![])).unwrap();
        assert_eq!(accepted.category(), Category::Configured);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let policy = ConfidencePolicy::new(0.60, 0.10);
        assert!(policy.evaluate(result(0.60, vec![])).is_ok());
    }

    #[test]
    fn test_low_confidence_requires_escalation() {
        let policy = ConfidencePolicy::default();
        let required = policy.evaluate(result(0.40, vec![])).unwrap_err();
        assert!(matches!(
            required.reason(),
            TriggerReason::LowConfidence { confidence, threshold, .. }
                if *confidence == 0.40 && *threshold == 0.60
        ));
    }

    #[test]
    fn test_near_tie_is_ambiguous() {
        let policy = ConfidencePolicy::default();
        let required = policy
            .evaluate(result(
                0.72,
                vec![
                    CategoryScore::new(Category::Configured, 0.72),
                    CategoryScore::new(Category::Custom, 0.68),
                    CategoryScore::new(Category::Infrastructure, 0.05),
                ],
            ))
            .unwrap_err();
        match required.reason() {
            TriggerReason::Ambiguous { candidates, .. } => {
                let cats: Vec<_> = candidates.iter().map(|c| c.category).collect();
                assert_eq!(cats, vec![Category::Configured, Category::Custom]);
            }
            other => panic!("unexpected reason: {other:?}"),
        }
    }

    #[test]
    fn test_clear_winner_is_not_ambiguous() {
        let policy = ConfidencePolicy::default();
        let accepted = policy.evaluate(result(
            0.85,
            vec![
                CategoryScore::new(Category::Configured, 0.85),
                CategoryScore::new(Category::Custom, 0.30),
            ],
        ));
        assert!(accepted.is_ok());
    }

    #[test]
    fn test_low_confidence_wins_over_ambiguity() {
        let policy = ConfidencePolicy::default();
        let required = policy
            .evaluate(result(
                0.45,
                vec![
                    CategoryScore::new(Category::Configured, 0.45),
                    CategoryScore::new(Category::Custom, 0.44),
                ],
            ))
            .unwrap_err();
        assert!(matches!(required.reason(), TriggerReason::LowConfidence { .. }));
    }
}
