//! Scripted collaborators shared by the use-case tests.

use crate::ports::human_consultation::{
    ConsultationError, ConsultationRequest, DecisionSubmitter, HumanConsultationPort,
};
use crate::ports::inference::{
    GatewayError, InferenceGateway, InferencePurpose, InferenceRequest, InferenceResponse,
};
use crate::ports::retrieval::{RetrievalError, RetrievalPort, RetrievalQuery};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use valgen_domain::{Category, HumanDecision, RankedPassage};

/// Answers each purpose with a fixed response, optionally after a delay.
///
/// Queued responses for a purpose are used first, one per call.
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    responses: HashMap<InferencePurpose, Result<String, GatewayError>>,
    queued: Mutex<HashMap<InferencePurpose, VecDeque<Result<String, GatewayError>>>>,
    delays: HashMap<InferencePurpose, Duration>,
    calls: Mutex<Vec<InferencePurpose>>,
    schemas: Mutex<HashMap<InferencePurpose, Value>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, purpose: InferencePurpose, content: impl Into<String>) -> Self {
        self.responses.insert(purpose, Ok(content.into()));
        self
    }

    pub fn with_error(mut self, purpose: InferencePurpose, error: GatewayError) -> Self {
        self.responses.insert(purpose, Err(error));
        self
    }

    pub fn with_sequence(
        self,
        purpose: InferencePurpose,
        responses: Vec<Result<String, GatewayError>>,
    ) -> Self {
        self.queued
            .lock()
            .unwrap()
            .insert(purpose, responses.into_iter().collect());
        self
    }

    pub fn with_delay(mut self, purpose: InferencePurpose, delay: Duration) -> Self {
        self.delays.insert(purpose, delay);
        self
    }

    /// A gateway that drives a full run for `category` at `confidence`.
    pub fn happy(category: Category, confidence: f64, generated: usize) -> Self {
        Self::new()
            .with(InferencePurpose::Classification, classification_json(category, confidence))
            .with(InferencePurpose::Research, research_json())
            .with(InferencePurpose::Sme, sme_json())
            .with(InferencePurpose::Generation, cases_json(generated))
    }

    pub fn calls(&self, purpose: InferencePurpose) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|p| **p == purpose)
            .count()
    }

    /// Response schema attached to the last request for `purpose`
    pub fn schema_for(&self, purpose: InferencePurpose) -> Option<Value> {
        self.schemas.lock().unwrap().get(&purpose).cloned()
    }
}

#[async_trait]
impl InferenceGateway for ScriptedGateway {
    async fn infer(&self, request: &InferenceRequest) -> Result<InferenceResponse, GatewayError> {
        self.calls.lock().unwrap().push(request.purpose);
        if let Some(schema) = &request.response_schema {
            self.schemas
                .lock()
                .unwrap()
                .insert(request.purpose, schema.clone());
        }
        if let Some(delay) = self.delays.get(&request.purpose) {
            tokio::time::sleep(*delay).await;
        }
        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(&request.purpose)
            .and_then(VecDeque::pop_front);
        if let Some(response) = queued {
            return response.map(|content| InferenceResponse::new(content, "scripted"));
        }
        match self.responses.get(&request.purpose) {
            Some(Ok(content)) => Ok(InferenceResponse::new(content.clone(), "scripted")),
            Some(Err(e)) => Err(e.clone()),
            None => Err(GatewayError::Other(format!(
                "no scripted response for {}",
                request.purpose
            ))),
        }
    }
}

pub(crate) fn classification_json(category: Category, confidence: f64) -> String {
    json!({
        "category": category.as_str(),
        "confidence": confidence,
        "rationale": "scripted rationale",
        "indicators": ["configuration tables"],
    })
    .to_string()
}

pub(crate) fn research_json() -> String {
    json!({"findings": ["Audit trails are required"], "references": ["Annex 11"]}).to_string()
}

pub(crate) fn sme_json() -> String {
    json!({"recommendations": ["Test role segregation"], "risk_notes": ["data integrity"]})
        .to_string()
}

pub(crate) fn cases_json(n: usize) -> String {
    let cases: Vec<_> = (1..=n)
        .map(|i| {
            json!({
                "id": format!("TC-{:03}", i),
                "title": format!("Case {}", i),
                "objective": "Verify requirement",
                "preconditions": [],
                "steps": [{"action": "Do it", "expected": "It works"}],
                "expected_result": "Requirement met",
                "traceability": ["URS-001"],
            })
        })
        .collect();
    json!({ "test_cases": cases }).to_string()
}

/// Returns fixed passages, or a fixed error.
pub(crate) struct StaticRetriever {
    pub result: Result<Vec<RankedPassage>, RetrievalError>,
}

impl StaticRetriever {
    pub fn ok() -> Self {
        Self {
            result: Ok(vec![RankedPassage::new("sop.md", "Backups are verified", 0.8)]),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(RetrievalError::Unavailable("index offline".into())),
        }
    }
}

#[async_trait]
impl RetrievalPort for StaticRetriever {
    async fn retrieve(&self, _query: &RetrievalQuery) -> Result<Vec<RankedPassage>, RetrievalError> {
        self.result.clone()
    }
}

/// Submits a fixed decision after a delay.
pub(crate) struct ScriptedReviewer {
    pub decision: HumanDecision,
    pub delay: Duration,
}

#[async_trait]
impl HumanConsultationPort for ScriptedReviewer {
    async fn present(
        &self,
        _request: ConsultationRequest,
        submitter: DecisionSubmitter,
    ) -> Result<(), ConsultationError> {
        tokio::time::sleep(self.delay).await;
        submitter.submit_decision(self.decision.clone())
    }
}

/// Answers only after the deadline has passed on the wall clock.
///
/// Blocks the runtime thread so the waiting side cannot time out first;
/// the decision is already in the channel when the workflow is polled again.
pub(crate) struct LateReviewer {
    pub decision: HumanDecision,
    pub overrun: Duration,
}

#[async_trait]
impl HumanConsultationPort for LateReviewer {
    async fn present(
        &self,
        _request: ConsultationRequest,
        submitter: DecisionSubmitter,
    ) -> Result<(), ConsultationError> {
        std::thread::sleep(self.overrun);
        submitter.submit_decision(self.decision.clone())
    }
}
