//! Generate Suite use case
//!
//! One synthesis call, then strict decoding and validation. The suite is
//! returned only if it has exactly the category's required number of valid
//! cases.

use crate::ports::conversation_logger::{ConversationLogger, NoConversationLogger};
use crate::ports::inference::{InferenceGateway, InferencePurpose, InferenceRequest};
use crate::use_cases::shared::infer_logged;
use std::sync::Arc;
use tracing::{Instrument, info, info_span};
use valgen_domain::{
    AggregatedContext, PromptTemplate, TestSuite, WorkflowError, parse_test_cases,
};

/// Tool name reported when the generation call fails
pub const GENERATOR_TOOL: &str = "generator";

pub struct GenerateSuiteUseCase {
    gateway: Arc<dyn InferenceGateway>,
    logger: Arc<dyn ConversationLogger>,
}

impl GenerateSuiteUseCase {
    pub fn new(gateway: Arc<dyn InferenceGateway>) -> Self {
        Self {
            gateway,
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub async fn execute(
        &self,
        context: &AggregatedContext,
        document_excerpt: &str,
    ) -> Result<TestSuite, WorkflowError> {
        let category = context.category();
        let span = info_span!(
            "generate",
            %category,
            required = category.required_test_count()
        );
        async {
            let request = InferenceRequest::new(
                InferencePurpose::Generation,
                PromptTemplate::generation_system(),
                PromptTemplate::generation_prompt(context, document_excerpt),
            )
            .with_response_schema(PromptTemplate::generation_schema(category));
            let response = infer_logged(self.gateway.as_ref(), self.logger.as_ref(), &request)
                .await
                .map_err(|e| WorkflowError::tool(GENERATOR_TOOL, e.to_string()))?;

            let cases = parse_test_cases(&response.content)?;
            let suite = TestSuite::validate(category, cases, &response.content)?;
            info!("Generated {} valid test cases", suite.len());
            Ok(suite)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedGateway, cases_json};
    use valgen_domain::{
        AgentPayload, AgentRequest, AgentResponse, Category, CorrelationId, ErrorKind,
    };
    use valgen_domain::coordination::{ContextPayload, ResearchPayload, SmePayload};

    fn context(category: Category) -> AggregatedContext {
        let id = CorrelationId::new();
        let [c, r, s] = AgentRequest::fan_out(&id, category, "excerpt");
        AggregatedContext::from_responses(
            &id,
            category,
            vec![
                AgentResponse::success(&c, AgentPayload::Context(ContextPayload::default()), 1),
                AgentResponse::success(
                    &r,
                    AgentPayload::Research(ResearchPayload {
                        findings: vec!["f".into()],
                        references: vec![],
                    }),
                    1,
                ),
                AgentResponse::success(
                    &s,
                    AgentPayload::Sme(SmePayload {
                        recommendations: vec!["r".into()],
                        risk_notes: vec![],
                    }),
                    1,
                ),
            ],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_exact_count_produces_suite() {
        let gateway = ScriptedGateway::new().with(InferencePurpose::Generation, cases_json(10));
        let gateway = Arc::new(gateway);
        let suite = GenerateSuiteUseCase::new(gateway.clone())
            .execute(&context(Category::NonConfigured), "excerpt")
            .await
            .unwrap();
        assert!(suite.is_valid());
        assert_eq!(suite.len(), 10);
        let schema = gateway.schema_for(InferencePurpose::Generation).unwrap();
        assert_eq!(schema["properties"]["test_cases"]["maxItems"], 10);
    }

    #[tokio::test]
    async fn test_surplus_is_validation_error_with_raw_output() {
        let raw = cases_json(27);
        let gateway = ScriptedGateway::new().with(InferencePurpose::Generation, raw.clone());
        let err = GenerateSuiteUseCase::new(Arc::new(gateway))
            .execute(&context(Category::Custom), "excerpt")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.cardinality(), Some((25, 27)));
        match err {
            WorkflowError::Validation { raw_output, .. } => assert_eq!(raw_output, raw),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_output_is_validation_error() {
        let gateway = ScriptedGateway::new().with(InferencePurpose::Generation, "Sorry, no.");
        let err = GenerateSuiteUseCase::new(Arc::new(gateway))
            .execute(&context(Category::Infrastructure), "excerpt")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.cardinality().is_none());
    }
}
