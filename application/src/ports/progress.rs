//! Progress notification port
//!
//! Defines the interface for reporting progress during a workflow run.

use valgen_domain::{
    AgentKind, Category, ClassificationResult, ConsultationSession, WorkflowState,
};

/// Callback for progress updates during a workflow run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, plain log lines, nothing).
pub trait WorkflowProgressNotifier: Send + Sync {
    /// Called after every state transition
    fn on_state_change(&self, from: WorkflowState, to: WorkflowState);

    /// Called when a classification attempt produced a result
    fn on_classified(&self, _result: &ClassificationResult) {}

    /// Called when a consultation session is presented to a reviewer
    fn on_consultation_opened(&self, _session: &ConsultationSession) {}

    /// Called when a consultation session reaches a terminal state
    fn on_consultation_closed(&self, _session: &ConsultationSession) {}

    /// Called as each advisory agent settles
    fn on_agent_complete(&self, _kind: AgentKind, _success: bool, _elapsed_ms: u64) {}

    /// Called before the generation call
    fn on_generation_start(&self, _category: Category, _required: usize) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl WorkflowProgressNotifier for NoProgress {
    fn on_state_change(&self, _from: WorkflowState, _to: WorkflowState) {}
}
