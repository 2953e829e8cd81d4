//! Port definitions (interfaces) for external collaborators

pub mod audit_store;
pub mod conversation_logger;
pub mod human_consultation;
pub mod inference;
pub mod progress;
pub mod retrieval;
