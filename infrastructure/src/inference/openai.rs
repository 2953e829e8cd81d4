//! OpenAI-compatible chat-completions gateway
//!
//! Works against any server exposing `POST {endpoint}/chat/completions`
//! (OpenAI, vLLM, Ollama, llama.cpp). The gateway makes exactly one request
//! per call; retries are the caller's decision.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;
use valgen_application::ports::inference::{
    GatewayError, InferenceGateway, InferenceRequest, InferenceResponse, TokenUsage,
};

pub struct OpenAiCompatibleGateway {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f64,
}

impl OpenAiCompatibleGateway {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Other(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
            temperature: 0.2,
        })
    }

    // ==================== Builder Methods ====================

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }

    fn request_body(&self, request: &InferenceRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system_prompt},
                {"role": "user", "content": request.prompt},
            ],
            "temperature": self.temperature,
        });
        if let Some(schema) = &request.response_schema {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": {"name": request.purpose.as_str(), "schema": schema},
            });
        }
        body
    }
}

#[async_trait]
impl InferenceGateway for OpenAiCompatibleGateway {
    async fn infer(&self, request: &InferenceRequest) -> Result<InferenceResponse, GatewayError> {
        debug!("POST {} ({})", self.completions_url(), request.purpose);

        let mut http = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json")
            .json(&self.request_body(request));
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let response = http.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else if e.is_connect() {
                GatewayError::ConnectionError(e.to_string())
            } else {
                GatewayError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        if !status.is_success() {
            return Err(GatewayError::RequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        parse_chat_response(&body, &self.model)
    }
}

/// Decode a chat-completions response body.
///
/// An empty or missing message content is an error, not an empty answer.
pub fn parse_chat_response(body: &str, requested_model: &str) -> Result<InferenceResponse, GatewayError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| GatewayError::InvalidResponse(format!("not JSON: {}", e)))?;

    let content = value["choices"][0]["message"]["content"]
        .as_str()
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| GatewayError::InvalidResponse("response has no message content".into()))?;

    let model = value["model"].as_str().unwrap_or(requested_model);
    let mut response = InferenceResponse::new(content, model);
    if let Some(usage) = value.get("usage") {
        response.usage = Some(TokenUsage {
            prompt_tokens: usage["prompt_tokens"].as_u64().unwrap_or(0),
            completion_tokens: usage["completion_tokens"].as_u64().unwrap_or(0),
        });
    }
    Ok(response)
}
