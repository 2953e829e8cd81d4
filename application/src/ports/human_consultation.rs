//! Human consultation port for low-confidence classifications.
//!
//! # Architecture
//!
//! Following the Ports and Adapters pattern:
//! - **Port**: [`HumanConsultationPort`], defined here in the application layer
//! - **Adapter**: `InteractiveConsultation`, implemented in the presentation layer
//!
//! # Flow
//!
//! ```text
//! ConfidencePolicy::evaluate() -> Err(EscalationRequired)
//!        ↓
//! EscalationService opens one ConsultationSession
//!        ↓
//! HumanConsultationPort::present(request, submitter)   (spawned)
//!        ↓                                   ↓
//! ConsultationDesk::await_decision   <──  DecisionSubmitter::submit_decision
//!        ↓
//! Resolved | TimedOut (conservative default) | Cancelled
//! ```
//!
//! The adapter never decides anything itself: it only relays a reviewer's
//! answer through the [`DecisionSubmitter`]. If nobody answers, the
//! deadline does.

use crate::escalation::desk::ConsultationDesk;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use valgen_domain::{ClassificationResult, HumanDecision, SessionId, TriggerReason};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsultationError {
    #[error("Unknown consultation session: {0}")]
    UnknownSession(SessionId),

    #[error("Consultation session {0} is closed")]
    SessionClosed(SessionId),

    #[error("Invalid decision: {0}")]
    InvalidDecision(String),

    #[error("I/O error: {0}")]
    Io(String),

    /// The adapter stopped waiting because the run was cancelled.
    #[error("Consultation cancelled")]
    Cancelled,
}

/// What a reviewer is shown.
#[derive(Debug, Clone, Serialize)]
pub struct ConsultationRequest {
    pub session_id: SessionId,
    pub document_name: String,
    pub document_excerpt: String,
    pub proposed: ClassificationResult,
    pub reason: TriggerReason,
    pub deadline: DateTime<Utc>,
}

/// Handle a consultation adapter uses to answer one session.
#[derive(Clone)]
pub struct DecisionSubmitter {
    desk: Arc<ConsultationDesk>,
    session_id: SessionId,
}

impl DecisionSubmitter {
    pub fn new(desk: Arc<ConsultationDesk>, session_id: SessionId) -> Self {
        Self { desk, session_id }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Deliver the reviewer's decision. Fails once the session has closed.
    pub fn submit_decision(&self, decision: HumanDecision) -> Result<(), ConsultationError> {
        self.desk.submit_decision(&self.session_id, decision)
    }
}

impl std::fmt::Debug for DecisionSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionSubmitter")
            .field("session_id", &self.session_id)
            .finish()
    }
}

/// Port for presenting a consultation to a human reviewer.
///
/// `present` runs in its own task while the workflow waits on the desk.
/// Returning without submitting is allowed; the session then expires.
#[async_trait]
pub trait HumanConsultationPort: Send + Sync {
    async fn present(
        &self,
        request: ConsultationRequest,
        submitter: DecisionSubmitter,
    ) -> Result<(), ConsultationError>;
}

/// No reviewer is attached; every session runs to its deadline.
pub struct UnattendedConsultation;

#[async_trait]
impl HumanConsultationPort for UnattendedConsultation {
    async fn present(
        &self,
        _request: ConsultationRequest,
        _submitter: DecisionSubmitter,
    ) -> Result<(), ConsultationError> {
        Ok(())
    }
}
