//! Escalation subdomain
//!
//! A classification that fails the confidence gate becomes an
//! [`EscalationRequired`]. In interactive mode it opens exactly one
//! [`ConsultationSession`] per attempt; the session ends with a human
//! resolution, a flagged conservative fallback on deadline expiry, or a
//! cancellation by the orchestrator.

pub mod policy;
pub mod registry;
pub mod session;
pub mod trigger;

pub use policy::{EscalationMode, EscalationPolicy};
pub use registry::SessionRegistry;
pub use session::{
    ConsultationSession, DecidedBy, HumanDecision, Resolution, SYSTEM_TIMEOUT_IDENTITY, SessionId,
    SessionStatus, SessionTransitionError,
};
pub use trigger::{EscalationRequired, TriggerReason};
