//! Escalation configuration from TOML (`[escalation]` section)

use super::ConfigValidationError;
use serde::{Deserialize, Serialize};
use valgen_domain::{Category, EscalationMode};

/// Raw escalation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEscalationConfig {
    /// "interactive" or "fail-fast"
    pub mode: String,
    /// Consultation deadline in seconds
    pub timeout_seconds: u64,
    /// Category applied (and flagged) when a consultation expires
    pub conservative_category: String,
    /// Reviewer identity recorded for interactive decisions
    pub reviewer: Option<String>,
}

impl Default for FileEscalationConfig {
    fn default() -> Self {
        Self {
            mode: "interactive".to_string(),
            timeout_seconds: 300,
            conservative_category: Category::most_conservative().as_str().to_string(),
            reviewer: None,
        }
    }
}

impl FileEscalationConfig {
    pub fn parse_mode(&self) -> Result<EscalationMode, ConfigValidationError> {
        self.mode
            .parse()
            .map_err(|_| ConfigValidationError::UnknownMode(self.mode.clone()))
    }

    pub fn parse_conservative_category(&self) -> Result<Category, ConfigValidationError> {
        self.conservative_category
            .parse()
            .map_err(|_| ConfigValidationError::UnknownCategory(self.conservative_category.clone()))
    }
}
