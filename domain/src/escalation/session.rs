//! Consultation session state machine
//!
//! ```text
//! Pending ──> AwaitingResponse ──> Resolved
//!    │                │       └──> TimedOut
//!    └────────────────┴──────────> Cancelled
//! ```
//!
//! Resolved, TimedOut and Cancelled are terminal. Every transition out of a
//! terminal state is rejected with [`SessionTransitionError`].

use super::trigger::TriggerReason;
use crate::classification::category::Category;
use crate::classification::result::{AttemptId, ClassificationResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity recorded for decisions made by deadline expiry
pub const SYSTEM_TIMEOUT_IDENTITY: &str = "system-timeout";

/// Unique identifier for a consultation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    AwaitingResponse,
    Resolved,
    TimedOut,
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Resolved | SessionStatus::TimedOut | SessionStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::AwaitingResponse => "awaiting_response",
            SessionStatus::Resolved => "resolved",
            SessionStatus::TimedOut => "timed_out",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who settled a consultation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecidedBy {
    Human { identity: String },
    SystemTimeout,
}

impl DecidedBy {
    pub fn is_human(&self) -> bool {
        matches!(self, DecidedBy::Human { .. })
    }
}

impl std::fmt::Display for DecidedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecidedBy::Human { identity } => write!(f, "{}", identity),
            DecidedBy::SystemTimeout => write!(f, "{}", SYSTEM_TIMEOUT_IDENTITY),
        }
    }
}

/// A reviewer's answer to a consultation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanDecision {
    pub reviewer: String,
    pub category: Category,
    /// Reviewer's own confidence, if they gave one
    pub confidence: Option<f64>,
    pub rationale: String,
}

impl HumanDecision {
    pub fn new(
        reviewer: impl Into<String>,
        category: Category,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            reviewer: reviewer.into(),
            category,
            confidence: None,
            rationale: rationale.into(),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Reject decisions without a reviewer, without a rationale, or with an
    /// out-of-range confidence.
    pub fn validate(&self) -> Result<(), SessionTransitionError> {
        if self.reviewer.trim().is_empty() {
            return Err(SessionTransitionError::InvalidDecision(
                "reviewer identity is required".into(),
            ));
        }
        if self.rationale.trim().is_empty() {
            return Err(SessionTransitionError::InvalidDecision(
                "rationale is required".into(),
            ));
        }
        if let Some(c) = self.confidence
            && !(0.0..=1.0).contains(&c)
        {
            return Err(SessionTransitionError::InvalidDecision(format!(
                "confidence {} is outside [0, 1]",
                c
            )));
        }
        Ok(())
    }
}

/// Final decision recorded on a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub decided_by: DecidedBy,
    pub decided_category: Category,
    /// `None` for timeout fallbacks and for humans who gave no value
    pub confidence: Option<f64>,
    pub rationale: String,
    /// `true` only when the conservative default was applied on expiry
    pub is_fallback: bool,
    pub resolved_at: DateTime<Utc>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionTransitionError {
    #[error("Cannot {action} session in state '{from}'")]
    InvalidTransition {
        from: SessionStatus,
        action: &'static str,
    },

    #[error("Decision arrived after the deadline ({deadline})")]
    DeadlinePassed { deadline: DateTime<Utc> },

    #[error("Invalid decision: {0}")]
    InvalidDecision(String),

    #[error("Attempt {attempt_id} already escalated in session {existing}")]
    DuplicateEscalation {
        attempt_id: AttemptId,
        existing: SessionId,
    },

    #[error("Unknown consultation session: {0}")]
    UnknownSession(SessionId),
}

/// One human consultation for one classification attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationSession {
    id: SessionId,
    attempt_id: AttemptId,
    status: SessionStatus,
    trigger_reason: TriggerReason,
    proposed: ClassificationResult,
    created_at: DateTime<Utc>,
    deadline: DateTime<Utc>,
    resolution: Option<Resolution>,
    cancellation_reason: Option<String>,
}

impl ConsultationSession {
    pub fn new(
        proposed: ClassificationResult,
        trigger_reason: TriggerReason,
        created_at: DateTime<Utc>,
        timeout: Duration,
    ) -> Self {
        Self {
            id: SessionId::new(),
            attempt_id: proposed.attempt_id().clone(),
            status: SessionStatus::Pending,
            trigger_reason,
            proposed,
            created_at,
            deadline: created_at + timeout,
            resolution: None,
            cancellation_reason: None,
        }
    }

    // ==================== Accessors ====================

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn attempt_id(&self) -> &AttemptId {
        &self.attempt_id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn trigger_reason(&self) -> &TriggerReason {
        &self.trigger_reason
    }

    /// The classifier's proposal that failed the gate
    pub fn proposed(&self) -> &ClassificationResult {
        &self.proposed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    // ==================== Transitions ====================

    /// Pending -> AwaitingResponse, once the request has been presented.
    pub fn begin_awaiting(&mut self) -> Result<(), SessionTransitionError> {
        if self.status != SessionStatus::Pending {
            return Err(self.invalid("await"));
        }
        self.status = SessionStatus::AwaitingResponse;
        Ok(())
    }

    /// AwaitingResponse -> Resolved with the reviewer's decision recorded verbatim.
    pub fn resolve(
        &mut self,
        decision: HumanDecision,
        now: DateTime<Utc>,
    ) -> Result<&Resolution, SessionTransitionError> {
        if self.status != SessionStatus::AwaitingResponse {
            return Err(self.invalid("resolve"));
        }
        if now > self.deadline {
            return Err(SessionTransitionError::DeadlinePassed {
                deadline: self.deadline,
            });
        }
        decision.validate()?;

        self.status = SessionStatus::Resolved;
        Ok(&*self.resolution.insert(Resolution {
            decided_by: DecidedBy::Human {
                identity: decision.reviewer,
            },
            decided_category: decision.category,
            confidence: decision.confidence,
            rationale: decision.rationale,
            is_fallback: false,
            resolved_at: now,
        }))
    }

    /// Pending/AwaitingResponse -> TimedOut with the conservative default applied.
    pub fn expire(
        &mut self,
        conservative_default: Category,
        now: DateTime<Utc>,
    ) -> Result<&Resolution, SessionTransitionError> {
        if self.status.is_terminal() {
            return Err(self.invalid("expire"));
        }
        self.status = SessionStatus::TimedOut;
        Ok(&*self.resolution.insert(Resolution {
            decided_by: DecidedBy::SystemTimeout,
            decided_category: conservative_default,
            confidence: None,
            rationale: format!(
                "No decision before deadline {}; applied conservative default {}",
                self.deadline.to_rfc3339(),
                conservative_default
            ),
            is_fallback: true,
            resolved_at: now,
        }))
    }

    /// Any non-terminal state -> Cancelled. Only the orchestrator calls this.
    pub fn cancel(
        &mut self,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), SessionTransitionError> {
        if self.status.is_terminal() {
            return Err(self.invalid("cancel"));
        }
        let reason = reason.into();
        self.status = SessionStatus::Cancelled;
        self.cancellation_reason = Some(format!("{} (at {})", reason, now.to_rfc3339()));
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> SessionTransitionError {
        SessionTransitionError::InvalidTransition {
            from: self.status,
            action,
        }
    }
}
