//! Coordination configuration from TOML (`[coordination]` section)

use serde::{Deserialize, Serialize};

/// Raw advisory-agent settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCoordinationConfig {
    /// Per-agent deadline in seconds
    pub agent_timeout_seconds: u64,
    /// Document excerpt length sent to agents and generation
    pub excerpt_chars: usize,
    /// Passages requested by the context agent
    pub retrieval_limit: usize,
    /// Corpus sub-collection searched by the context agent
    pub corpus_scope: Option<String>,
}

impl Default for FileCoordinationConfig {
    fn default() -> Self {
        Self {
            agent_timeout_seconds: 60,
            excerpt_chars: 4000,
            retrieval_limit: 5,
            corpus_scope: None,
        }
    }
}
