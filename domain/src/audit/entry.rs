//! Audit entries and their hashing

use crate::coordination::agent::AgentKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// `prev_entry_hash` of the first entry in a chain
pub const GENESIS_PREV_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Who caused an audited event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Actor {
    Orchestrator,
    Classifier,
    Agent { kind: AgentKind },
    Generator,
    Human { identity: String },
    SystemTimeout,
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Actor::Orchestrator => write!(f, "orchestrator"),
            Actor::Classifier => write!(f, "classifier"),
            Actor::Agent { kind } => write!(f, "agent:{}", kind),
            Actor::Generator => write!(f, "generator"),
            Actor::Human { identity } => write!(f, "human:{}", identity),
            Actor::SystemTimeout => write!(f, "system-timeout"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    WorkflowStarted,
    StateTransition,
    ClassificationCompleted,
    ClassificationAttemptFailed,
    EscalationTriggered,
    ConsultationAwaiting,
    ConsultationResolved,
    ConsultationTimedOut,
    FallbackApplied,
    ConsultationCancelled,
    CoordinationStarted,
    AgentCompleted,
    CoordinationCompleted,
    GenerationCompleted,
    ValidationFailed,
    WorkflowCompleted,
    WorkflowFailed,
    WorkflowCancelled,
}

impl AuditEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventKind::WorkflowStarted => "workflow_started",
            AuditEventKind::StateTransition => "state_transition",
            AuditEventKind::ClassificationCompleted => "classification_completed",
            AuditEventKind::ClassificationAttemptFailed => "classification_attempt_failed",
            AuditEventKind::EscalationTriggered => "escalation_triggered",
            AuditEventKind::ConsultationAwaiting => "consultation_awaiting",
            AuditEventKind::ConsultationResolved => "consultation_resolved",
            AuditEventKind::ConsultationTimedOut => "consultation_timed_out",
            AuditEventKind::FallbackApplied => "fallback_applied",
            AuditEventKind::ConsultationCancelled => "consultation_cancelled",
            AuditEventKind::CoordinationStarted => "coordination_started",
            AuditEventKind::AgentCompleted => "agent_completed",
            AuditEventKind::CoordinationCompleted => "coordination_completed",
            AuditEventKind::GenerationCompleted => "generation_completed",
            AuditEventKind::ValidationFailed => "validation_failed",
            AuditEventKind::WorkflowCompleted => "workflow_completed",
            AuditEventKind::WorkflowFailed => "workflow_failed",
            AuditEventKind::WorkflowCancelled => "workflow_cancelled",
        }
    }
}

impl std::fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One link of the audit chain.
///
/// The payload itself is not stored; `payload_digest` commits to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub sequence_number: u64,
    pub timestamp: DateTime<Utc>,
    pub actor: Actor,
    pub event_kind: AuditEventKind,
    pub payload_digest: String,
    pub prev_entry_hash: String,
}

impl AuditEntry {
    /// SHA-256 (hex) of this entry's canonical JSON form.
    pub fn hash(&self) -> Result<String, serde_json::Error> {
        digest_of(self)
    }
}

/// Canonical JSON bytes: object keys sorted, no insignificant whitespace.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    serde_json::to_vec(&value)
}

/// SHA-256 (hex) of the canonical JSON form of `value`.
pub fn digest_of<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = canonical_json(value)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_digest_ignores_key_order() {
        let a = json!({"category": "custom", "confidence": 0.4});
        let b: serde_json::Value =
            serde_json::from_str(r#"{"confidence": 0.4, "category": "custom"}"#).unwrap();
        assert_eq!(digest_of(&a).unwrap(), digest_of(&b).unwrap());
        assert_eq!(digest_of(&a).unwrap().len(), 64);
    }

    #[test]
    fn test_entry_hash_changes_with_content() {
        let entry = AuditEntry {
            sequence_number: 1,
            timestamp: Utc::now(),
            actor: Actor::Orchestrator,
            event_kind: AuditEventKind::WorkflowStarted,
            payload_digest: digest_of(&json!({})).unwrap(),
            prev_entry_hash: GENESIS_PREV_HASH.to_string(),
        };
        let mut tampered = entry.clone();
        tampered.actor = Actor::Human {
            identity: "mallory".into(),
        };
        assert_ne!(entry.hash().unwrap(), tampered.hash().unwrap());
    }

    #[test]
    fn test_actor_display() {
        assert_eq!(Actor::SystemTimeout.to_string(), "system-timeout");
        assert_eq!(
            Actor::Agent {
                kind: AgentKind::Sme
            }
            .to_string(),
            "agent:sme"
        );
    }
}
