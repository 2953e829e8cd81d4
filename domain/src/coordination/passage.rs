//! Retrieved reference passages

use serde::{Deserialize, Serialize};

/// A passage returned by the retrieval collaborator, ranked by relevance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPassage {
    /// Where the passage came from (file path or document id)
    pub source: String,
    pub text: String,
    /// Higher is more relevant; only the ordering is meaningful
    pub relevance: f64,
}

impl RankedPassage {
    pub fn new(source: impl Into<String>, text: impl Into<String>, relevance: f64) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
            relevance,
        }
    }
}

/// Sort passages from most to least relevant and keep the first `limit`.
pub fn rank(mut passages: Vec<RankedPassage>, limit: usize) -> Vec<RankedPassage> {
    passages.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
    passages.truncate(limit);
    passages
}
