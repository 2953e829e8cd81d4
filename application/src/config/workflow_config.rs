//! Workflow configuration container.
//!
//! [`WorkflowConfig`] groups the three configuration slices the
//! orchestrator needs. Stage use cases receive only the slice they use.
//!
//! | Type | Classify | Escalate | Coordinate | Generate |
//! |------|----------|----------|------------|----------|
//! | `ConfidencePolicy` | Yes | No | No | No |
//! | `EscalationPolicy` | No | Yes | No | No |
//! | `WorkflowParams` | Yes | No | Yes | Yes |

use crate::config::WorkflowParams;
use valgen_domain::{ConfidencePolicy, EscalationPolicy};

#[derive(Debug, Clone, Default)]
pub struct WorkflowConfig {
    confidence: ConfidencePolicy,
    escalation: EscalationPolicy,
    params: WorkflowParams,
}

impl WorkflowConfig {
    pub fn new(
        confidence: ConfidencePolicy,
        escalation: EscalationPolicy,
        params: WorkflowParams,
    ) -> Self {
        Self {
            confidence,
            escalation,
            params,
        }
    }

    // ==================== Accessors ====================

    pub fn confidence(&self) -> &ConfidencePolicy {
        &self.confidence
    }

    pub fn escalation(&self) -> &EscalationPolicy {
        &self.escalation
    }

    pub fn params(&self) -> &WorkflowParams {
        &self.params
    }

    // ==================== Builder Methods ====================

    pub fn with_confidence(mut self, confidence: ConfidencePolicy) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_escalation(mut self, escalation: EscalationPolicy) -> Self {
        self.escalation = escalation;
        self
    }

    pub fn with_params(mut self, params: WorkflowParams) -> Self {
        self.params = params;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valgen_domain::{Category, EscalationMode};

    #[test]
    fn test_default_slices() {
        let config = WorkflowConfig::default();
        assert_eq!(config.confidence().threshold, 0.60);
        assert_eq!(config.escalation().conservative_default, Category::Custom);
        assert_eq!(config.params().retrieval_limit, 5);
    }

    #[test]
    fn test_builder_replaces_slice() {
        let config = WorkflowConfig::default()
            .with_escalation(EscalationPolicy::default().with_mode(EscalationMode::FailFast));
        assert_eq!(config.escalation().mode, EscalationMode::FailFast);
    }
}
