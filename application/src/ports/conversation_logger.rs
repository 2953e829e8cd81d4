//! Port for the collaborator transcript.
//!
//! Defines the [`ConversationLogger`] trait for recording every exchange
//! with an external collaborator (inference prompts and responses,
//! retrieval results) to a structured log.
//!
//! This is separate from `tracing`-based operation logs and from the audit
//! ledger: the ledger commits to payload digests, the transcript keeps the
//! payloads themselves.

use serde_json::Value;

/// One collaborator exchange to record.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "inference_request", "retrieval_result").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging collaborator exchanges.
///
/// `log` is synchronous and infallible; adapters drop records they cannot
/// write rather than interrupt the workflow.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when the transcript is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
