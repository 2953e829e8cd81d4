//! Classify Document use case
//!
//! One inference call per attempt. The result is returned as-is; the
//! confidence gate is applied by the caller.

use crate::ports::conversation_logger::{ConversationLogger, NoConversationLogger};
use crate::ports::inference::{InferenceGateway, InferencePurpose, InferenceRequest};
use crate::use_cases::shared::infer_logged;
use std::sync::Arc;
use tracing::{Instrument, debug, info_span};
use valgen_domain::classification::CLASSIFIER_TOOL;
use valgen_domain::{
    AttemptId, ClassificationResult, Document, PromptTemplate, WorkflowError, parse_classification,
};

pub struct ClassifyDocumentUseCase {
    gateway: Arc<dyn InferenceGateway>,
    logger: Arc<dyn ConversationLogger>,
    min_document_length: usize,
}

impl ClassifyDocumentUseCase {
    pub fn new(gateway: Arc<dyn InferenceGateway>) -> Self {
        Self {
            gateway,
            logger: Arc::new(NoConversationLogger),
            min_document_length: 1,
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_min_document_length(mut self, len: usize) -> Self {
        self.min_document_length = len;
        self
    }

    /// Classify `document` for one attempt.
    ///
    /// Short input fails with a parsing error before any inference call.
    /// Gateway failures and undecodable output fail with a tool error that
    /// carries the raw response when there is one.
    pub async fn execute(
        &self,
        document: &Document,
        attempt_id: AttemptId,
    ) -> Result<ClassificationResult, WorkflowError> {
        let span = info_span!("classify", attempt = %attempt_id, document = document.name());
        async {
            document.validate(self.min_document_length)?;

            let request = InferenceRequest::new(
                InferencePurpose::Classification,
                PromptTemplate::classification_system(),
                PromptTemplate::classification_prompt(document.name(), document.content()),
            )
            .with_response_schema(PromptTemplate::classification_schema());
            let response = infer_logged(self.gateway.as_ref(), self.logger.as_ref(), &request)
                .await
                .map_err(|e| WorkflowError::tool(CLASSIFIER_TOOL, e.to_string()))?;

            let result = parse_classification(&response.content, attempt_id)?;
            debug!(
                "Classified as {} ({:.2})",
                result.category(),
                result.confidence()
            );
            Ok(result)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::inference::GatewayError;
    use crate::testing::{ScriptedGateway, classification_json};
    use valgen_domain::{Category, ErrorKind};

    fn document() -> Document {
        Document::new("urs.md", "The system shall record every change to batch records.")
    }

    #[tokio::test]
    async fn test_classify_success() {
        let gateway = Arc::new(ScriptedGateway::new().with(
            InferencePurpose::Classification,
            classification_json(Category::Configured, 0.92),
        ));
        let use_case = ClassifyDocumentUseCase::new(gateway.clone());
        let result = use_case
            .execute(&document(), AttemptId::from("a1"))
            .await
            .unwrap();
        assert_eq!(result.category(), Category::Configured);
        assert_eq!(result.confidence(), 0.92);
        assert_eq!(result.attempt_id().as_str(), "a1");
        assert_eq!(gateway.calls(InferencePurpose::Classification), 1);
        let schema = gateway.schema_for(InferencePurpose::Classification).unwrap();
        assert!(schema["required"].as_array().unwrap().contains(&"category".into()));
    }

    #[tokio::test]
    async fn test_short_document_is_parsing_error_without_call() {
        let gateway = Arc::new(ScriptedGateway::new());
        let use_case = ClassifyDocumentUseCase::new(gateway.clone()).with_min_document_length(20);
        let err = use_case
            .execute(&Document::new("x.md", "too short"), AttemptId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parsing);
        assert_eq!(gateway.calls(InferencePurpose::Classification), 0);
    }

    #[tokio::test]
    async fn test_gateway_failure_is_tool_error() {
        let gateway = Arc::new(ScriptedGateway::new().with_error(
            InferencePurpose::Classification,
            GatewayError::ConnectionError("refused".into()),
        ));
        let err = ClassifyDocumentUseCase::new(gateway)
            .execute(&document(), AttemptId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Tool);
        assert!(err.to_string().contains("refused"));
    }

    #[tokio::test]
    async fn test_malformed_output_is_tool_error_with_raw() {
        let gateway = Arc::new(
            ScriptedGateway::new().with(InferencePurpose::Classification, "probably custom"),
        );
        let err = ClassifyDocumentUseCase::new(gateway)
            .execute(&document(), AttemptId::new())
            .await
            .unwrap_err();
        match err {
            WorkflowError::Tool { raw_response, .. } => {
                assert_eq!(raw_response.as_deref(), Some("probably custom"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
