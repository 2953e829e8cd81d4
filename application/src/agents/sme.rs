use super::AdvisoryAgent;
use crate::ports::conversation_logger::{ConversationLogger, NoConversationLogger};
use crate::ports::inference::{InferenceGateway, InferencePurpose, InferenceRequest};
use crate::use_cases::shared::infer_logged;
use async_trait::async_trait;
use std::sync::Arc;
use valgen_domain::coordination::parse_sme_payload;
use valgen_domain::{AgentFailure, AgentKind, AgentPayload, AgentRequest, PromptTemplate};

/// Subject-matter-expert review of risk and test focus.
pub struct SmeAgent {
    gateway: Arc<dyn InferenceGateway>,
    logger: Arc<dyn ConversationLogger>,
}

impl SmeAgent {
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
impl AdvisoryAgent for SmeAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Sme
    }

    async fn advise(&self, request: &AgentRequest) -> Result<AgentPayload, AgentFailure> {
        let inference = InferenceRequest::new(
            InferencePurpose::Sme,
            PromptTemplate::sme_system(),
            PromptTemplate::sme_prompt(request.category, &request.document_excerpt),
        );
        let response = infer_logged(self.gateway.as_ref(), self.logger.as_ref(), &inference)
            .await
            .map_err(|e| AgentFailure::tool(e.to_string()))?;
        parse_sme_payload(&response.content).map(AgentPayload::Sme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedGateway, sme_json};
    use valgen_domain::{Category, CorrelationId};

    #[tokio::test]
    async fn test_sme_payload() {
        let gateway = ScriptedGateway::new().with(InferencePurpose::Sme, sme_json());
        let agent = SmeAgent::new(Arc::new(gateway));
        let request =
            AgentRequest::fan_out(&CorrelationId::new(), Category::NonConfigured, "COTS")[2].clone();
        match agent.advise(&request).await.unwrap() {
            AgentPayload::Sme(payload) => {
                assert_eq!(payload.recommendations, vec!["Test role segregation"]);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
