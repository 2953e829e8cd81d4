use super::AdvisoryAgent;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::retrieval::{RetrievalPort, RetrievalQuery};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use valgen_domain::coordination::{ContextPayload, rank};
use valgen_domain::{AgentFailure, AgentKind, AgentPayload, AgentRequest};

/// Retrieves reference passages relevant to the document.
pub struct ContextAgent {
    retriever: Arc<dyn RetrievalPort>,
    limit: usize,
    corpus_scope: Option<String>,
    logger: Arc<dyn ConversationLogger>,
}

impl ContextAgent {
    pub fn new(retriever: Arc<dyn RetrievalPort>, limit: usize) -> Self {
        Self {
            retriever,
            limit,
            corpus_scope: None,
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_corpus_scope(mut self, scope: Option<String>) -> Self {
        self.corpus_scope = scope;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }
}

#[async_trait]
impl AdvisoryAgent for ContextAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Context
    }

    async fn advise(&self, request: &AgentRequest) -> Result<AgentPayload, AgentFailure> {
        let query = RetrievalQuery {
            query: request.document_excerpt.clone(),
            category: request.category,
            corpus_scope: self.corpus_scope.clone(),
            limit: self.limit,
        };

        let passages = self
            .retriever
            .retrieve(&query)
            .await
            .map_err(|e| AgentFailure::tool(e.to_string()))?;

        // Adapters should already respect the limit; enforce ordering here.
        let passages = rank(passages, self.limit);
        debug!("Context agent retrieved {} passages", passages.len());

        self.logger.log(ConversationEvent::new(
            "retrieval_result",
            json!({
                "correlation_id": request.correlation_id.as_str(),
                "category": request.category.as_str(),
                "passages": passages,
            }),
        ));

        Ok(AgentPayload::Context(ContextPayload { passages }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticRetriever;
    use valgen_domain::coordination::AgentFailureKind;
    use valgen_domain::{Category, CorrelationId};

    fn request() -> AgentRequest {
        AgentRequest::fan_out(&CorrelationId::new(), Category::Configured, "backup policy")[0]
            .clone()
    }

    #[tokio::test]
    async fn test_context_payload() {
        let agent = ContextAgent::new(Arc::new(StaticRetriever::ok()), 3);
        match agent.advise(&request()).await.unwrap() {
            AgentPayload::Context(payload) => assert_eq!(payload.passages.len(), 1),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retrieval_error_is_tool_failure() {
        let agent = ContextAgent::new(Arc::new(StaticRetriever::failing()), 3);
        let failure = agent.advise(&request()).await.unwrap_err();
        assert_eq!(failure.kind, AgentFailureKind::Tool);
        assert!(failure.message.contains("index offline"));
    }
}
