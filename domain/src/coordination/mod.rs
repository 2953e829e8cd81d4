//! Parallel coordination subdomain: agent requests, typed responses and fan-in

pub mod agent;
pub mod aggregate;
pub mod parsing;
pub mod passage;

pub use agent::{
    AgentFailure, AgentFailureKind, AgentKind, AgentOutcome, AgentPayload, AgentRequest,
    AgentResponse, ContextPayload, CorrelationId, ResearchPayload, SmePayload,
};
pub use aggregate::{AggregatedContext, AggregationError};
pub use parsing::{parse_research_payload, parse_sme_payload};
pub use passage::{RankedPassage, rank};
