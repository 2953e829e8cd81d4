//! Domain layer for valgen
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Workflow
//!
//! A requirement document moves through a fixed sequence of stages:
//!
//! - **Classification**: assign one [`Category`] with a self-reported confidence
//! - **Escalation**: low-confidence or ambiguous results go to a human, bounded
//!   by a deadline after which the conservative default applies (flagged)
//! - **Coordination**: three advisory agents run in parallel; all must succeed
//! - **Generation**: exactly [`Category::required_test_count`] cases, or failure
//!
//! ## Audit
//!
//! Every decision and state transition is appended to a SHA-256 hash chain
//! ([`AuditChain`]) that can be re-verified independently.

pub mod audit;
pub mod classification;
pub mod coordination;
pub mod core;
pub mod escalation;
pub mod generation;
pub mod prompt;
pub mod workflow;

// Re-export commonly used types
pub use audit::{Actor, AuditChain, AuditEntry, AuditEventKind, ChainError, verify_chain};
pub use classification::{
    AttemptId, Category, CategoryScore, ClassificationResult, ConfidencePolicy,
    parse_classification,
};
pub use coordination::{
    AgentFailure, AgentKind, AgentOutcome, AgentPayload, AgentRequest, AgentResponse,
    AggregatedContext, AggregationError, CorrelationId, RankedPassage,
};
pub use self::core::{
    document::Document,
    error::{ErrorKind, ValidationFailure, WorkflowError},
};
pub use escalation::{
    ConsultationSession, DecidedBy, EscalationMode, EscalationPolicy, EscalationRequired,
    HumanDecision, Resolution, SessionId, SessionRegistry, SessionStatus, SessionTransitionError,
    TriggerReason,
};
pub use generation::{TestCase, TestStep, TestSuite, parse_test_cases};
pub use prompt::PromptTemplate;
pub use workflow::{
    CategorySource, OutputFormat, WorkflowMachine, WorkflowOutcome, WorkflowReport, WorkflowState,
};
