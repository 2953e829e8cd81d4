//! Workflow report returned to the caller

use super::state::WorkflowState;
use crate::audit::entry::AuditEntry;
use crate::classification::category::Category;
use crate::classification::result::ClassificationResult;
use crate::core::error::WorkflowError;
use crate::escalation::session::ConsultationSession;
use crate::generation::suite::TestSuite;
use serde::{Deserialize, Serialize};

/// Where the category used for generation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
    /// Accepted classifier output
    Classifier,
    /// Decided by a reviewer in a consultation session
    Human,
    /// Conservative default applied on consultation expiry (flagged)
    TimeoutFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkflowOutcome {
    Completed { suite: TestSuite },
    Failed { error: WorkflowError },
    Cancelled { reason: String },
}

/// Everything a reviewer needs to reconstruct a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowReport {
    pub workflow_id: String,
    pub document_name: String,
    pub final_state: WorkflowState,
    /// Last classification produced, if any attempt succeeded
    pub classification: Option<ClassificationResult>,
    pub escalation: Option<ConsultationSession>,
    pub effective_category: Option<Category>,
    pub category_source: Option<CategorySource>,
    pub outcome: WorkflowOutcome,
    /// Audit entries written during this run
    pub audit_trail: Vec<AuditEntry>,
}

impl WorkflowReport {
    pub fn suite(&self) -> Option<&TestSuite> {
        match &self.outcome {
            WorkflowOutcome::Completed { suite } => Some(suite),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        match &self.outcome {
            WorkflowOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, WorkflowOutcome::Completed { .. })
    }

    /// `true` when generation used the timeout fallback category
    pub fn used_fallback(&self) -> bool {
        self.category_source == Some(CategorySource::TimeoutFallback)
    }
}
