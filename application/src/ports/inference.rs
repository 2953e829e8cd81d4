//! Inference gateway port
//!
//! Defines the interface for text-generation calls made by the workflow.
//! The core owns no retries: a failed call surfaces as a [`GatewayError`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during inference calls
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Which workflow step a call serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferencePurpose {
    Classification,
    Research,
    Sme,
    Generation,
}

impl InferencePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            InferencePurpose::Classification => "classification",
            InferencePurpose::Research => "research",
            InferencePurpose::Sme => "sme",
            InferencePurpose::Generation => "generation",
        }
    }
}

impl std::fmt::Display for InferencePurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InferenceRequest {
    pub purpose: InferencePurpose,
    pub system_prompt: String,
    pub prompt: String,
    /// JSON schema the response should follow, if the backend supports it
    pub response_schema: Option<Value>,
}

impl InferenceRequest {
    pub fn new(
        purpose: InferencePurpose,
        system_prompt: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            purpose,
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
            response_schema: None,
        }
    }

    pub fn with_response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InferenceResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

impl InferenceResponse {
    pub fn new(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            usage: None,
        }
    }
}

/// Gateway for inference calls
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    async fn infer(&self, request: &InferenceRequest) -> Result<InferenceResponse, GatewayError>;
}
