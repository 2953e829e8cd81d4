//! Shared utilities for use cases.
//!
//! Cancellation checking and transcript-logged collaborator calls used by
//! every stage.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::inference::{GatewayError, InferenceGateway, InferenceRequest, InferenceResponse};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use std::future::Future;
use valgen_domain::WorkflowError;

/// Check if cancellation has been requested.
///
/// Returns `Err(WorkflowError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(
    token: &Option<CancellationToken>,
    stage: &str,
) -> Result<(), WorkflowError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(WorkflowError::cancelled(format!(
            "cancellation requested during {}",
            stage
        )));
    }
    Ok(())
}

/// Run `fut` unless cancellation is requested first.
///
/// On cancellation `fut` is dropped at its current suspension point.
pub(crate) async fn run_cancellable<T>(
    token: &Option<CancellationToken>,
    stage: &str,
    fut: impl Future<Output = Result<T, WorkflowError>>,
) -> Result<T, WorkflowError> {
    match token {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(WorkflowError::cancelled(format!(
                "cancellation requested during {}",
                stage
            ))),
            result = fut => result,
        },
        None => fut.await,
    }
}

/// Send one inference request, recording request and response in the transcript.
pub(crate) async fn infer_logged(
    gateway: &dyn InferenceGateway,
    logger: &dyn ConversationLogger,
    request: &InferenceRequest,
) -> Result<InferenceResponse, GatewayError> {
    logger.log(ConversationEvent::new(
        "inference_request",
        json!({
            "purpose": request.purpose.as_str(),
            "system_prompt": request.system_prompt,
            "prompt": request.prompt,
        }),
    ));

    let result = gateway.infer(request).await;

    match &result {
        Ok(response) => logger.log(ConversationEvent::new(
            "inference_response",
            json!({
                "purpose": request.purpose.as_str(),
                "model": response.model,
                "content": response.content,
                "usage": response.usage,
            }),
        )),
        Err(e) => logger.log(ConversationEvent::new(
            "inference_error",
            json!({
                "purpose": request.purpose.as_str(),
                "error": e.to_string(),
            }),
        )),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_cancelled() {
        assert!(check_cancelled(&None, "classify").is_ok());

        let token = CancellationToken::new();
        assert!(check_cancelled(&Some(token.clone()), "classify").is_ok());

        token.cancel();
        let err = check_cancelled(&Some(token), "coordinate").unwrap_err();
        assert!(err.is_cancelled());
        assert!(err.to_string().contains("coordinate"));
    }

    #[tokio::test]
    async fn test_run_cancellable() {
        let value = run_cancellable(&None, "generate", async { Ok::<_, WorkflowError>(7) }).await;
        assert_eq!(value.unwrap(), 7);

        let token = CancellationToken::new();
        token.cancel();
        let err = run_cancellable(&Some(token), "generate", std::future::pending::<Result<(), _>>())
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
