//! Application layer for valgen
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod agents;
pub mod audit;
pub mod config;
pub mod escalation;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use audit::AuditLedger;
pub use config::{WorkflowConfig, WorkflowParams};
pub use escalation::{ConsultationDesk, DeskOutcome};
pub use ports::{
    audit_store::{AuditStore, AuditStoreError, InMemoryAuditStore},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    human_consultation::{
        ConsultationError, ConsultationRequest, DecisionSubmitter, HumanConsultationPort,
        UnattendedConsultation,
    },
    inference::{
        GatewayError, InferenceGateway, InferencePurpose, InferenceRequest, InferenceResponse,
        TokenUsage,
    },
    progress::{NoProgress, WorkflowProgressNotifier},
    retrieval::{RetrievalError, RetrievalPort, RetrievalQuery},
};
pub use use_cases::run_workflow::RunWorkflowUseCase;
