use super::AdvisoryAgent;
use crate::ports::conversation_logger::{ConversationLogger, NoConversationLogger};
use crate::ports::inference::{InferenceGateway, InferencePurpose, InferenceRequest};
use crate::use_cases::shared::infer_logged;
use async_trait::async_trait;
use std::sync::Arc;
use valgen_domain::coordination::parse_research_payload;
use valgen_domain::{AgentFailure, AgentKind, AgentPayload, AgentRequest, PromptTemplate};

/// Summarises regulatory expectations for the category.
pub struct ResearchAgent {
    gateway: Arc<dyn InferenceGateway>,
    logger: Arc<dyn ConversationLogger>,
}

impl ResearchAgent {
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
}

#[async_trait]
impl AdvisoryAgent for ResearchAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Research
    }

    async fn advise(&self, request: &AgentRequest) -> Result<AgentPayload, AgentFailure> {
        let inference = InferenceRequest::new(
            InferencePurpose::Research,
            PromptTemplate::research_system(),
            PromptTemplate::research_prompt(request.category, &request.document_excerpt),
        );
        let response = infer_logged(self.gateway.as_ref(), self.logger.as_ref(), &inference)
            .await
            .map_err(|e| AgentFailure::tool(e.to_string()))?;
        parse_research_payload(&response.content).map(AgentPayload::Research)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::inference::GatewayError;
    use crate::testing::{ScriptedGateway, research_json};
    use valgen_domain::coordination::AgentFailureKind;
    use valgen_domain::{Category, CorrelationId};

    fn request() -> AgentRequest {
        AgentRequest::fan_out(&CorrelationId::new(), Category::Custom, "bespoke MES")[1].clone()
    }

    #[tokio::test]
    async fn test_research_payload() {
        let gateway = ScriptedGateway::new().with(InferencePurpose::Research, research_json());
        let agent = ResearchAgent::new(Arc::new(gateway));
        assert!(matches!(
            agent.advise(&request()).await.unwrap(),
            AgentPayload::Research(_)
        ));
    }

    #[tokio::test]
    async fn test_gateway_error_is_tool_failure() {
        let gateway =
            ScriptedGateway::new().with_error(InferencePurpose::Research, GatewayError::Timeout);
        let agent = ResearchAgent::new(Arc::new(gateway));
        let failure = agent.advise(&request()).await.unwrap_err();
        assert_eq!(failure.kind, AgentFailureKind::Tool);
    }

    #[tokio::test]
    async fn test_prose_is_malformed() {
        let gateway = ScriptedGateway::new().with(InferencePurpose::Research, "No idea.");
        let agent = ResearchAgent::new(Arc::new(gateway));
        let failure = agent.advise(&request()).await.unwrap_err();
        assert_eq!(failure.kind, AgentFailureKind::Malformed);
    }
}
