//! Fan-in: combine three successful agent responses

use super::agent::{
    AgentFailure, AgentKind, AgentOutcome, AgentPayload, AgentResponse, ContextPayload,
    CorrelationId, ResearchPayload, SmePayload,
};
use crate::classification::category::Category;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    #[error("Agents failed: {}", describe_failures(.failures))]
    AgentsFailed {
        failures: Vec<(AgentKind, AgentFailure)>,
    },

    #[error("No response from agent '{0}'")]
    MissingResponse(AgentKind),

    #[error("More than one response from agent '{0}'")]
    DuplicateResponse(AgentKind),

    #[error("Response from '{kind}' belongs to round {actual}, expected {expected}")]
    CorrelationMismatch {
        kind: AgentKind,
        expected: CorrelationId,
        actual: CorrelationId,
    },

    #[error("Agent '{kind}' returned a {payload} payload")]
    PayloadMismatch { kind: AgentKind, payload: AgentKind },
}

impl AggregationError {
    /// Agents this error is about, in role order.
    pub fn failing_agents(&self) -> Vec<AgentKind> {
        match self {
            AggregationError::AgentsFailed { failures } => {
                failures.iter().map(|(kind, _)| *kind).collect()
            }
            AggregationError::MissingResponse(kind)
            | AggregationError::DuplicateResponse(kind)
            | AggregationError::CorrelationMismatch { kind, .. }
            | AggregationError::PayloadMismatch { kind, .. } => vec![*kind],
        }
    }
}

fn describe_failures(failures: &[(AgentKind, AgentFailure)]) -> String {
    failures
        .iter()
        .map(|(kind, failure)| format!("{} ({})", kind, failure))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Combined advice from all three agents of one round.
///
/// Only [`AggregatedContext::from_responses`] builds one, and only from three
/// successful responses sharing the round's correlation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedContext {
    correlation_id: CorrelationId,
    category: Category,
    context: ContextPayload,
    research: ResearchPayload,
    sme: SmePayload,
}

impl AggregatedContext {
    pub fn from_responses(
        correlation_id: &CorrelationId,
        category: Category,
        responses: Vec<AgentResponse>,
    ) -> Result<Self, AggregationError> {
        let mut context = None;
        let mut research = None;
        let mut sme = None;
        let mut failures = Vec::new();
        let mut seen = Vec::with_capacity(3);

        for response in responses {
            if seen.contains(&response.kind) {
                return Err(AggregationError::DuplicateResponse(response.kind));
            }
            seen.push(response.kind);

            if &response.correlation_id != correlation_id {
                return Err(AggregationError::CorrelationMismatch {
                    kind: response.kind,
                    expected: correlation_id.clone(),
                    actual: response.correlation_id,
                });
            }

            match (response.kind, response.outcome) {
                (kind, AgentOutcome::Failure(failure)) => failures.push((kind, failure)),
                (AgentKind::Context, AgentOutcome::Success(AgentPayload::Context(p))) => {
                    context = Some(p)
                }
                (AgentKind::Research, AgentOutcome::Success(AgentPayload::Research(p))) => {
                    research = Some(p)
                }
                (AgentKind::Sme, AgentOutcome::Success(AgentPayload::Sme(p))) => sme = Some(p),
                (kind, AgentOutcome::Success(other)) => {
                    return Err(AggregationError::PayloadMismatch {
                        kind,
                        payload: other.kind(),
                    });
                }
            }
        }

        if !failures.is_empty() {
            failures.sort_by_key(|(kind, _)| *kind);
            return Err(AggregationError::AgentsFailed { failures });
        }

        match (context, research, sme) {
            (Some(context), Some(research), Some(sme)) => Ok(Self {
                correlation_id: correlation_id.clone(),
                category,
                context,
                research,
                sme,
            }),
            (None, _, _) => Err(AggregationError::MissingResponse(AgentKind::Context)),
            (_, None, _) => Err(AggregationError::MissingResponse(AgentKind::Research)),
            (_, _, None) => Err(AggregationError::MissingResponse(AgentKind::Sme)),
        }
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn context(&self) -> &ContextPayload {
        &self.context
    }

    pub fn research(&self) -> &ResearchPayload {
        &self.research
    }

    pub fn sme(&self) -> &SmePayload {
        &self.sme
    }

    /// Always `true`: a context with a failed agent cannot be constructed.
    pub fn all_succeeded(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::agent::AgentRequest;
    use crate::coordination::passage::RankedPassage;

    fn successes(id: &CorrelationId) -> Vec<AgentResponse> {
        let [context, research, sme] = AgentRequest::fan_out(id, Category::Configured, "doc");
        vec![
            AgentResponse::success(
                &context,
                AgentPayload::Context(ContextPayload {
                    passages: vec![RankedPassage::new("sop.md", "Backups are verified", 0.8)],
                }),
                5,
            ),
            AgentResponse::success(
                &research,
                AgentPayload::Research(ResearchPayload {
                    findings: vec!["finding".into()],
                    references: vec![],
                }),
                7,
            ),
            AgentResponse::success(
                &sme,
                AgentPayload::Sme(SmePayload {
                    recommendations: vec!["rec".into()],
                    risk_notes: vec![],
                }),
                9,
            ),
        ]
    }

    #[test]
    fn test_aggregate_all_successful() {
        let id = CorrelationId::from("round");
        let aggregated =
            AggregatedContext::from_responses(&id, Category::Configured, successes(&id)).unwrap();
        assert!(aggregated.all_succeeded());
        assert_eq!(aggregated.context().passages.len(), 1);
        assert_eq!(aggregated.research().findings, vec!["finding"]);
        assert_eq!(aggregated.sme().recommendations, vec!["rec"]);
        assert_eq!(aggregated.correlation_id(), &id);
    }

    #[test]
    fn test_any_failure_rejects_and_names_agents() {
        let id = CorrelationId::from("round");
        let mut responses = successes(&id);
        responses[2].outcome = AgentOutcome::Failure(AgentFailure::timeout("30s"));
        responses[0].outcome = AgentOutcome::Failure(AgentFailure::tool("index offline"));

        let err = AggregatedContext::from_responses(&id, Category::Configured, responses)
            .unwrap_err();
        assert_eq!(err.failing_agents(), vec![AgentKind::Context, AgentKind::Sme]);
        let message = err.to_string();
        assert!(message.contains("context (tool failure: index offline)"));
        assert!(message.contains("sme (timed out: 30s)"));
    }

    #[test]
    fn test_missing_response() {
        let id = CorrelationId::from("round");
        let mut responses = successes(&id);
        responses.remove(1);
        assert_eq!(
            AggregatedContext::from_responses(&id, Category::Configured, responses).unwrap_err(),
            AggregationError::MissingResponse(AgentKind::Research)
        );
    }

    #[test]
    fn test_stale_correlation_rejected() {
        let id = CorrelationId::from("round-2");
        let stale = successes(&CorrelationId::from("round-1"));
        let err = AggregatedContext::from_responses(&id, Category::Configured, stale).unwrap_err();
        assert!(matches!(err, AggregationError::CorrelationMismatch { .. }));
    }

    #[test]
    fn test_duplicate_response_rejected() {
        let id = CorrelationId::from("round");
        let mut responses = successes(&id);
        responses.push(responses[0].clone());
        assert_eq!(
            AggregatedContext::from_responses(&id, Category::Configured, responses).unwrap_err(),
            AggregationError::DuplicateResponse(AgentKind::Context)
        );
    }

    #[test]
    fn test_payload_for_wrong_agent_rejected() {
        let id = CorrelationId::from("round");
        let mut responses = successes(&id);
        responses[1].outcome = responses[2].outcome.clone();
        assert_eq!(
            AggregatedContext::from_responses(&id, Category::Configured, responses).unwrap_err(),
            AggregationError::PayloadMismatch {
                kind: AgentKind::Research,
                payload: AgentKind::Sme
            }
        );
    }
}
