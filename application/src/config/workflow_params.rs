//! Workflow parameters: stage limits and timeouts.
//!
//! [`WorkflowParams`] groups the static parameters that control how
//! [`RunWorkflowUseCase`](crate::use_cases::run_workflow::RunWorkflowUseCase)
//! drives each stage. These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowParams {
    /// Minimum document length (characters, after trimming).
    pub min_document_length: usize,
    /// Classification attempts before the run fails; each failure is audited.
    pub max_classification_attempts: usize,
    /// Deadline for each advisory agent.
    pub agent_timeout: Duration,
    /// Length of the document excerpt sent to agents and generation.
    pub excerpt_chars: usize,
    /// Passages requested from the retrieval collaborator.
    pub retrieval_limit: usize,
    /// Corpus sub-collection searched by the context agent.
    pub corpus_scope: Option<String>,
}

impl Default for WorkflowParams {
    fn default() -> Self {
        Self {
            min_document_length: 20,
            max_classification_attempts: 1,
            agent_timeout: Duration::from_secs(60),
            excerpt_chars: 4000,
            retrieval_limit: 5,
            corpus_scope: None,
        }
    }
}

impl WorkflowParams {
    // ==================== Builder Methods ====================

    pub fn with_min_document_length(mut self, len: usize) -> Self {
        self.min_document_length = len;
        self
    }

    pub fn with_max_classification_attempts(mut self, max: usize) -> Self {
        self.max_classification_attempts = max;
        self
    }

    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    pub fn with_excerpt_chars(mut self, chars: usize) -> Self {
        self.excerpt_chars = chars;
        self
    }

    pub fn with_retrieval_limit(mut self, limit: usize) -> Self {
        self.retrieval_limit = limit;
        self
    }

    pub fn with_corpus_scope(mut self, scope: impl Into<String>) -> Self {
        self.corpus_scope = Some(scope.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = WorkflowParams::default();
        assert_eq!(params.min_document_length, 20);
        assert_eq!(params.max_classification_attempts, 1);
        assert_eq!(params.agent_timeout, Duration::from_secs(60));
        assert!(params.corpus_scope.is_none());
    }

    #[test]
    fn test_builder() {
        let params = WorkflowParams::default()
            .with_max_classification_attempts(3)
            .with_agent_timeout(Duration::from_millis(500))
            .with_corpus_scope("sops");
        assert_eq!(params.max_classification_attempts, 3);
        assert_eq!(params.agent_timeout, Duration::from_millis(500));
        assert_eq!(params.corpus_scope.as_deref(), Some("sops"));
    }
}
