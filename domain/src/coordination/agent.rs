//! Advisory agent requests and responses
//!
//! Responses are a closed tagged enum. Collaborator output is decoded into an
//! [`AgentPayload`] exactly once, at the agent boundary; everything past that
//! point works with typed payloads only.

use super::passage::RankedPassage;
use crate::classification::category::Category;
use serde::{Deserialize, Serialize};

/// The three advisory roles consulted for every generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Retrieves relevant passages from the reference corpus
    Context,
    /// Summarises regulatory and domain research for the category
    Research,
    /// Subject-matter-expert review of risks and test focus
    Sme,
}

impl AgentKind {
    pub const ALL: [AgentKind; 3] = [AgentKind::Context, AgentKind::Research, AgentKind::Sme];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Context => "context",
            AgentKind::Research => "research",
            AgentKind::Sme => "sme",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared identifier of one coordination round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for CorrelationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub correlation_id: CorrelationId,
    pub kind: AgentKind,
    pub category: Category,
    pub document_excerpt: String,
}

impl AgentRequest {
    /// Build the three requests of one round, sharing `correlation_id`.
    pub fn fan_out(
        correlation_id: &CorrelationId,
        category: Category,
        document_excerpt: &str,
    ) -> [AgentRequest; 3] {
        AgentKind::ALL.map(|kind| AgentRequest {
            correlation_id: correlation_id.clone(),
            kind,
            category,
            document_excerpt: document_excerpt.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextPayload {
    pub passages: Vec<RankedPassage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchPayload {
    pub findings: Vec<String>,
    pub references: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmePayload {
    pub recommendations: Vec<String>,
    pub risk_notes: Vec<String>,
}

/// Decoded result of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "agent", rename_all = "snake_case")]
pub enum AgentPayload {
    Context(ContextPayload),
    Research(ResearchPayload),
    Sme(SmePayload),
}

impl AgentPayload {
    pub fn kind(&self) -> AgentKind {
        match self {
            AgentPayload::Context(_) => AgentKind::Context,
            AgentPayload::Research(_) => AgentKind::Research,
            AgentPayload::Sme(_) => AgentKind::Sme,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentFailureKind {
    /// The collaborator call itself failed
    Tool,
    /// The per-agent deadline elapsed
    Timeout,
    /// The collaborator answered with something that does not decode
    Malformed,
    /// The agent task aborted unexpectedly
    Panicked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentFailure {
    pub kind: AgentFailureKind,
    pub message: String,
}

impl AgentFailure {
    pub fn tool(message: impl Into<String>) -> Self {
        Self {
            kind: AgentFailureKind::Tool,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: AgentFailureKind::Timeout,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: AgentFailureKind::Malformed,
            message: message.into(),
        }
    }

    pub fn panicked(message: impl Into<String>) -> Self {
        Self {
            kind: AgentFailureKind::Panicked,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AgentFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.kind {
            AgentFailureKind::Tool => "tool failure",
            AgentFailureKind::Timeout => "timed out",
            AgentFailureKind::Malformed => "malformed output",
            AgentFailureKind::Panicked => "task aborted",
        };
        write!(f, "{}: {}", label, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum AgentOutcome {
    Success(AgentPayload),
    Failure(AgentFailure),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub correlation_id: CorrelationId,
    pub kind: AgentKind,
    pub outcome: AgentOutcome,
    pub elapsed_ms: u64,
}

impl AgentResponse {
    pub fn success(request: &AgentRequest, payload: AgentPayload, elapsed_ms: u64) -> Self {
        Self {
            correlation_id: request.correlation_id.clone(),
            kind: request.kind,
            outcome: AgentOutcome::Success(payload),
            elapsed_ms,
        }
    }

    pub fn failure(request: &AgentRequest, failure: AgentFailure, elapsed_ms: u64) -> Self {
        Self {
            correlation_id: request.correlation_id.clone(),
            kind: request.kind,
            outcome: AgentOutcome::Failure(failure),
            elapsed_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AgentOutcome::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_out_shares_correlation_id() {
        let id = CorrelationId::from("round-1");
        let requests = AgentRequest::fan_out(&id, Category::Configured, "excerpt");
        let kinds: Vec<_> = requests.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, AgentKind::ALL.to_vec());
        assert!(requests.iter().all(|r| r.correlation_id == id));
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let request = AgentRequest::fan_out(&CorrelationId::from("c"), Category::Custom, "x")[1].clone();
        let response = AgentResponse::success(
            &request,
            AgentPayload::Research(ResearchPayload {
                findings: vec!["audit trail review".into()],
                references: vec![],
            }),
            12,
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["kind"], "research");
        assert_eq!(json["outcome"]["status"], "success");
        assert_eq!(json["outcome"]["value"]["agent"], "research");
    }

    #[test]
    fn test_failure_display() {
        let failure = AgentFailure::timeout("no answer within 30s");
        assert_eq!(failure.to_string(), "timed out: no answer within 30s");
    }
}
