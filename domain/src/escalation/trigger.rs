//! Why a classification needs a human decision

use crate::classification::category::{Category, CategoryScore};
use crate::classification::result::{AttemptId, ClassificationResult};
use crate::core::error::WorkflowError;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Condition that fired the escalation gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerReason {
    /// Confidence fell below the configured threshold
    LowConfidence {
        category: Category,
        confidence: f64,
        threshold: f64,
    },
    /// Two or more categories scored within the ambiguity band of the top score
    Ambiguous {
        candidates: Vec<CategoryScore>,
        band: f64,
    },
}

impl std::fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerReason::LowConfidence {
                category,
                confidence,
                threshold,
            } => write!(
                f,
                "confidence {:.2} for {} is below threshold {:.2}",
                confidence, category, threshold
            ),
            TriggerReason::Ambiguous { candidates, band } => {
                let names: Vec<String> = candidates
                    .iter()
                    .map(|c| format!("{} ({:.2})", c.category, c.score))
                    .collect();
                write!(f, "ambiguous within {:.2}: {}", band, names.join(", "))
            }
        }
    }
}

/// A classification that passed parsing but not the confidence gate.
///
/// Returned as the `Err` side of
/// [`ConfidencePolicy::evaluate`](crate::classification::policy::ConfidencePolicy::evaluate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRequired {
    classification: ClassificationResult,
    reason: TriggerReason,
}

impl EscalationRequired {
    pub fn new(classification: ClassificationResult, reason: TriggerReason) -> Self {
        Self {
            classification,
            reason,
        }
    }

    pub fn classification(&self) -> &ClassificationResult {
        &self.classification
    }

    pub fn reason(&self) -> &TriggerReason {
        &self.reason
    }

    pub fn attempt_id(&self) -> &AttemptId {
        self.classification.attempt_id()
    }

    /// Surface the trigger as a terminal error (fail-fast escalation mode).
    pub fn into_error(self) -> WorkflowError {
        let occurred_at = Utc::now();
        match self.reason {
            TriggerReason::LowConfidence {
                category,
                confidence,
                threshold,
            } => WorkflowError::Confidence {
                category,
                confidence,
                threshold,
                occurred_at,
            },
            TriggerReason::Ambiguous { candidates, band } => WorkflowError::Ambiguity {
                candidates,
                band,
                occurred_at,
            },
        }
    }
}
