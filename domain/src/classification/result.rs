//! Classification result value object

use super::category::{Category, CategoryScore};
use serde::{Deserialize, Serialize};

/// Identifier of one classification attempt.
///
/// Escalation is de-duplicated per attempt: a single attempt can open at
/// most one consultation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttemptId(String);

impl AttemptId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for AttemptId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of classifying a document (Value Object)
///
/// Immutable once produced: fields are private and only readable.
/// `confidence` is the collaborator's own self-reported signal; it is
/// checked for range but never adjusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    attempt_id: AttemptId,
    category: Category,
    confidence: f64,
    rationale: String,
    indicators: Vec<String>,
    scores: Vec<CategoryScore>,
}

impl ClassificationResult {
    /// Build a result, rejecting confidence or scores outside `[0, 1]`.
    ///
    /// When `scores` is empty the selected category's confidence is the only
    /// score. Scores are kept sorted from highest to lowest.
    pub fn new(
        attempt_id: AttemptId,
        category: Category,
        confidence: f64,
        rationale: impl Into<String>,
        indicators: Vec<String>,
        mut scores: Vec<CategoryScore>,
    ) -> Result<Self, String> {
        if !is_unit_interval(confidence) {
            return Err(format!("confidence {} is outside [0, 1]", confidence));
        }
        if let Some(bad) = scores.iter().find(|s| !is_unit_interval(s.score)) {
            return Err(format!(
                "score {} for {} is outside [0, 1]",
                bad.score, bad.category
            ));
        }
        let mut seen = Vec::with_capacity(scores.len());
        for s in &scores {
            if seen.contains(&s.category) {
                return Err(format!("category {} scored more than once", s.category));
            }
            seen.push(s.category);
        }
        if scores.is_empty() {
            scores.push(CategoryScore::new(category, confidence));
        }
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));

        Ok(Self {
            attempt_id,
            category,
            confidence,
            rationale: rationale.into(),
            indicators,
            scores,
        })
    }

    pub fn attempt_id(&self) -> &AttemptId {
        &self.attempt_id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    pub fn indicators(&self) -> &[String] {
        &self.indicators
    }

    /// Per-category scores, highest first
    pub fn scores(&self) -> &[CategoryScore] {
        &self.scores
    }
}

fn is_unit_interval(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}
