//! Coordinate Agents use case
//!
//! Fans out to the three advisory agents concurrently and waits for all of
//! them to settle. Each agent runs in its own task under its own deadline.
//! On cancellation the round is abandoned: the tasks are detached (not
//! aborted) and whatever they produce is discarded.

use crate::agents::AdvisoryAgent;
use crate::ports::progress::WorkflowProgressNotifier;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, warn};
use valgen_domain::{
    AgentFailure, AgentRequest, AgentResponse, AggregatedContext, AggregationError, Category,
    CorrelationId, WorkflowError,
};

/// Tool name reported when coordination fails
pub const COORDINATION_TOOL: &str = "coordination";

/// All three settled responses of one round.
#[derive(Debug, Clone)]
pub struct CoordinationRound {
    pub correlation_id: CorrelationId,
    pub category: Category,
    pub responses: Vec<AgentResponse>,
}

impl CoordinationRound {
    /// Fan-in. Fails unless every agent succeeded.
    pub fn aggregate(self) -> Result<AggregatedContext, AggregationError> {
        AggregatedContext::from_responses(&self.correlation_id, self.category, self.responses)
    }
}

pub struct CoordinateAgentsUseCase {
    agents: Vec<Arc<dyn AdvisoryAgent>>,
    agent_timeout: Duration,
}

impl CoordinateAgentsUseCase {
    pub fn new(
        context: Arc<dyn AdvisoryAgent>,
        research: Arc<dyn AdvisoryAgent>,
        sme: Arc<dyn AdvisoryAgent>,
        agent_timeout: Duration,
    ) -> Self {
        Self {
            agents: vec![context, research, sme],
            agent_timeout,
        }
    }

    /// Run one round under `correlation_id`. A fresh id must be used per call.
    pub async fn execute(
        &self,
        correlation_id: CorrelationId,
        category: Category,
        document_excerpt: &str,
        cancellation: &Option<CancellationToken>,
        progress: &dyn WorkflowProgressNotifier,
    ) -> Result<CoordinationRound, WorkflowError> {
        let span = info_span!("coordinate", correlation = %correlation_id, %category);
        async {
            let requests = AgentRequest::fan_out(&correlation_id, category, document_excerpt);
            let mut handles = Vec::with_capacity(requests.len());

            for request in requests {
                let agent = self
                    .agents
                    .iter()
                    .find(|a| a.kind() == request.kind)
                    .cloned()
                    .ok_or_else(|| {
                        WorkflowError::tool(
                            COORDINATION_TOOL,
                            format!("no agent registered for '{}'", request.kind),
                        )
                    })?;
                let timeout = self.agent_timeout;
                let agent_span = info_span!("agent", kind = %request.kind);
                let task_request = request.clone();
                let handle = tokio::spawn(
                    async move { run_agent(agent, task_request, timeout).await }
                        .instrument(agent_span),
                );
                handles.push((request, handle));
            }

            info!("Launched {} agents", handles.len());

            let settle = join_all(handles.into_iter().map(|(request, handle)| async move {
                match handle.await {
                    Ok(response) => response,
                    Err(e) => AgentResponse::failure(&request, AgentFailure::panicked(e.to_string()), 0),
                }
            }));

            let responses = match cancellation {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        warn!("Coordination cancelled; detaching in-flight agents");
                        return Err(WorkflowError::cancelled("cancellation requested during coordinate"));
                    }
                    responses = settle => responses,
                },
                None => settle.await,
            };

            for response in &responses {
                progress.on_agent_complete(response.kind, response.is_success(), response.elapsed_ms);
            }

            Ok(CoordinationRound {
                correlation_id: correlation_id.clone(),
                category,
                responses,
            })
        }
        .instrument(span)
        .await
    }
}

async fn run_agent(
    agent: Arc<dyn AdvisoryAgent>,
    request: AgentRequest,
    timeout: Duration,
) -> AgentResponse {
    let started = Instant::now();
    let result = tokio::time::timeout(timeout, agent.advise(&request)).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(Ok(payload)) => {
            info!("Agent {} succeeded in {}ms", request.kind, elapsed_ms);
            AgentResponse::success(&request, payload, elapsed_ms)
        }
        Ok(Err(failure)) => {
            warn!("Agent {} failed: {}", request.kind, failure);
            AgentResponse::failure(&request, failure, elapsed_ms)
        }
        Err(_) => {
            warn!("Agent {} timed out after {:?}", request.kind, timeout);
            AgentResponse::failure(
                &request,
                AgentFailure::timeout(format!("no response within {:?}", timeout)),
                elapsed_ms,
            )
        }
    }
}
