//! Escalation service
//!
//! Opens consultation sessions, presents them to the consultation adapter and
//! waits on the desk. It never writes the audit ledger and never decides a
//! category itself; the orchestrator applies and audits every outcome.

use crate::escalation::desk::{ConsultationDesk, DeskOutcome};
use crate::ports::human_consultation::{
    ConsultationError, ConsultationRequest, DecisionSubmitter, HumanConsultationPort,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use valgen_domain::{
    ConsultationSession, Document, EscalationPolicy, EscalationRequired, SessionId,
    SessionRegistry, SessionTransitionError,
};

pub struct EscalationService {
    consultation: Arc<dyn HumanConsultationPort>,
    desk: Arc<ConsultationDesk>,
    policy: EscalationPolicy,
}

impl EscalationService {
    pub fn new(
        consultation: Arc<dyn HumanConsultationPort>,
        desk: Arc<ConsultationDesk>,
        policy: EscalationPolicy,
    ) -> Self {
        Self {
            consultation,
            desk,
            policy,
        }
    }

    /// Open the one session allowed for `required`'s attempt.
    pub fn open(
        &self,
        registry: &mut SessionRegistry,
        required: &EscalationRequired,
    ) -> Result<SessionId, SessionTransitionError> {
        let timeout = chrono::Duration::from_std(self.policy.consultation_timeout)
            .unwrap_or_else(|_| chrono::Duration::weeks(52));
        let session = registry.open(required, Utc::now(), timeout)?;
        self.desk.register(session.id());
        info!(
            "Consultation session {} opened for attempt {} ({})",
            session.id(),
            session.attempt_id(),
            session.trigger_reason()
        );
        Ok(session.id().clone())
    }

    pub fn request_for(
        &self,
        session: &ConsultationSession,
        document: &Document,
        excerpt_chars: usize,
    ) -> ConsultationRequest {
        ConsultationRequest {
            session_id: session.id().clone(),
            document_name: document.name().to_string(),
            document_excerpt: document.excerpt(excerpt_chars),
            proposed: session.proposed().clone(),
            reason: session.trigger_reason().clone(),
            deadline: session.deadline(),
        }
    }

    /// Hand the request to the consultation adapter in a detached task.
    pub fn present(&self, request: ConsultationRequest) {
        let port = Arc::clone(&self.consultation);
        let submitter = DecisionSubmitter::new(Arc::clone(&self.desk), request.session_id.clone());
        let span = info_span!("consultation", session = %request.session_id);
        tokio::spawn(
            async move {
                match port.present(request, submitter).await {
                    Ok(()) => {}
                    Err(ConsultationError::Cancelled) => debug!("Consultation prompt withdrawn"),
                    Err(e) => warn!("Consultation adapter failed: {}", e),
                }
            }
            .instrument(span),
        );
    }

    /// Wait for a decision until the session deadline or cancellation.
    pub async fn await_decision(
        &self,
        session: &ConsultationSession,
        cancel: &CancellationToken,
    ) -> Result<DeskOutcome, ConsultationError> {
        let remaining = (session.deadline() - Utc::now())
            .to_std()
            .unwrap_or_default();
        let outcome = self
            .desk
            .await_decision(session.id(), Instant::now() + remaining, cancel)
            .await;
        self.desk.release(session.id());
        outcome
    }

    pub fn desk(&self) -> Arc<ConsultationDesk> {
        Arc::clone(&self.desk)
    }
}
