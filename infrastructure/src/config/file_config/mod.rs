//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly; [`FileConfig::to_workflow_config`] turns
//! them into the application's [`WorkflowConfig`] after validation.

mod classification;
mod coordination;
mod escalation;
mod inference;
mod output;
mod storage;

pub use classification::FileClassificationConfig;
pub use coordination::FileCoordinationConfig;
pub use escalation::FileEscalationConfig;
pub use inference::FileInferenceConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use storage::{FileAuditConfig, FileLoggingConfig, FileRetrievalConfig};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use valgen_application::{WorkflowConfig, WorkflowParams};
use valgen_domain::{ConfidencePolicy, EscalationPolicy};

/// Configuration validation errors
///
/// Invalid configuration is fatal; nothing is silently replaced by a default.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("{field} cannot be 0")]
    Zero { field: &'static str },

    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("unknown category '{0}' (expected infrastructure, non_configured, configured, custom or a code 1/3/4/5)")]
    UnknownCategory(String),

    #[error("unknown escalation mode '{0}' (expected interactive or fail-fast)")]
    UnknownMode(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub classification: FileClassificationConfig,
    pub escalation: FileEscalationConfig,
    pub coordination: FileCoordinationConfig,
    pub inference: FileInferenceConfig,
    pub retrieval: FileRetrievalConfig,
    pub audit: FileAuditConfig,
    pub logging: FileLoggingConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        let unit = [
            ("classification.threshold", self.classification.threshold),
            ("classification.ambiguity_band", self.classification.ambiguity_band),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                errors.push(ConfigValidationError::OutOfRange { field, value });
            }
        }

        let counts = [
            ("classification.max_attempts", self.classification.max_attempts as u64),
            ("escalation.timeout_seconds", self.escalation.timeout_seconds),
            ("coordination.agent_timeout_seconds", self.coordination.agent_timeout_seconds),
            ("coordination.excerpt_chars", self.coordination.excerpt_chars as u64),
            ("coordination.retrieval_limit", self.coordination.retrieval_limit as u64),
            ("inference.timeout_seconds", self.inference.timeout_seconds),
            ("retrieval.passage_chars", self.retrieval.passage_chars as u64),
        ];
        for (field, value) in counts {
            if value == 0 {
                errors.push(ConfigValidationError::Zero { field });
            }
        }

        if self.inference.endpoint.trim().is_empty() {
            errors.push(ConfigValidationError::Empty {
                field: "inference.endpoint",
            });
        }
        if self.inference.model.trim().is_empty() {
            errors.push(ConfigValidationError::Empty {
                field: "inference.model",
            });
        }

        if let Err(e) = self.escalation.parse_mode() {
            errors.push(e);
        }
        if let Err(e) = self.escalation.parse_conservative_category() {
            errors.push(e);
        }

        errors
    }

    /// Build the orchestrator's configuration. Fails on the first invalid value.
    pub fn to_workflow_config(&self) -> Result<WorkflowConfig, ConfigValidationError> {
        if let Some(error) = self.validate().into_iter().next() {
            return Err(error);
        }

        let confidence = ConfidencePolicy::new(
            self.classification.threshold,
            self.classification.ambiguity_band,
        );
        let escalation = EscalationPolicy::default()
            .with_mode(self.escalation.parse_mode()?)
            .with_conservative_default(self.escalation.parse_conservative_category()?)
            .with_consultation_timeout(Duration::from_secs(self.escalation.timeout_seconds));

        let mut params = WorkflowParams::default()
            .with_min_document_length(self.classification.min_document_length)
            .with_max_classification_attempts(self.classification.max_attempts)
            .with_agent_timeout(Duration::from_secs(self.coordination.agent_timeout_seconds))
            .with_excerpt_chars(self.coordination.excerpt_chars)
            .with_retrieval_limit(self.coordination.retrieval_limit);
        if let Some(scope) = &self.coordination.corpus_scope {
            params = params.with_corpus_scope(scope.clone());
        }

        Ok(WorkflowConfig::new(confidence, escalation, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valgen_domain::{Category, EscalationMode};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[classification]
threshold = 0.75
max_attempts = 2

[escalation]
mode = "fail-fast"
timeout_seconds = 30
conservative_category = "configured"
reviewer = "qa.lead"

[coordination]
agent_timeout_seconds = 10
corpus_scope = "sops"

[inference]
endpoint = "https://api.openai.com/v1"
model = "gpt-4o"

[audit]
ledger_path = "/var/lib/valgen/audit.jsonl"

[output]
format = "full"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.classification.threshold, 0.75);
        assert_eq!(config.classification.ambiguity_band, 0.10);
        assert_eq!(config.escalation.reviewer.as_deref(), Some("qa.lead"));
        assert_eq!(config.output.format, Some(FileOutputFormat::Full));
        assert!(!config.output.color);
        assert!(config.validate().is_empty());

        let workflow = config.to_workflow_config().unwrap();
        assert_eq!(workflow.confidence().threshold, 0.75);
        assert_eq!(workflow.escalation().mode, EscalationMode::FailFast);
        assert_eq!(workflow.escalation().conservative_default, Category::Configured);
        assert_eq!(
            workflow.escalation().consultation_timeout,
            Duration::from_secs(30)
        );
        assert_eq!(workflow.params().max_classification_attempts, 2);
        assert_eq!(workflow.params().agent_timeout, Duration::from_secs(10));
        assert_eq!(workflow.params().corpus_scope.as_deref(), Some("sops"));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
        let workflow = config.to_workflow_config().unwrap();
        assert_eq!(workflow.escalation().conservative_default, Category::Custom);
        assert_eq!(workflow.escalation().mode, EscalationMode::Interactive);
    }

    #[test]
    fn test_validate_collects_every_problem() {
        let toml_str = r#"
[classification]
threshold = 1.5

[escalation]
timeout_seconds = 0
conservative_category = "bespoke"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ConfigValidationError::OutOfRange {
            field: "classification.threshold",
            value: 1.5
        }));
        assert!(errors.contains(&ConfigValidationError::Zero {
            field: "escalation.timeout_seconds"
        }));
        assert!(errors.contains(&ConfigValidationError::UnknownCategory("bespoke".into())));
        assert!(config.to_workflow_config().is_err());
    }
}
