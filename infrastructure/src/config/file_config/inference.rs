//! Inference configuration from TOML (`[inference]` section)

use serde::{Deserialize, Serialize};

/// Raw settings for the OpenAI-compatible inference endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileInferenceConfig {
    /// Base URL; `/chat/completions` is appended
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key (unset means no auth header)
    pub api_key_env: Option<String>,
    pub timeout_seconds: u64,
    pub temperature: f64,
}

impl Default for FileInferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/v1".to_string(),
            model: "llama3.1".to_string(),
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            timeout_seconds: 120,
            temperature: 0.2,
        }
    }
}
