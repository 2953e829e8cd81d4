//! Advisory agents consulted in the coordination stage
//!
//! Each agent turns one [`AgentRequest`] into a typed [`AgentPayload`]. All
//! collaborator output is decoded here, once; a decode failure is reported
//! as [`AgentFailure`] and never patched up.

mod context;
mod research;
mod sme;

pub use context::ContextAgent;
pub use research::ResearchAgent;
pub use sme::SmeAgent;

use async_trait::async_trait;
use valgen_domain::{AgentFailure, AgentKind, AgentPayload, AgentRequest};

#[async_trait]
pub trait AdvisoryAgent: Send + Sync {
    fn kind(&self) -> AgentKind;

    async fn advise(&self, request: &AgentRequest) -> Result<AgentPayload, AgentFailure>;
}
