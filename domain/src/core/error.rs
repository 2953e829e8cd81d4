//! Workflow error taxonomy
//!
//! Every stage fails through [`WorkflowError`]. Each variant carries the
//! diagnostic context a reviewer needs to reconstruct the failure without
//! re-running the workflow: input excerpts, raw collaborator output,
//! expected vs. actual counts and timestamps.

use crate::classification::category::{Category, CategoryScore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse failure kind, used for audit payloads and exit reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Parsing,
    Tool,
    Confidence,
    Ambiguity,
    Validation,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Parsing => "parsing_error",
            ErrorKind::Tool => "tool_error",
            ErrorKind::Confidence => "confidence_error",
            ErrorKind::Ambiguity => "ambiguity_error",
            ErrorKind::Validation => "validation_error",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What exactly failed strict validation of generated output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationFailure {
    /// The number of generated cases differs from the category's required count.
    Cardinality {
        category: Category,
        expected: usize,
        actual: usize,
    },
    /// A single test case is missing a required field or breaks the schema.
    Schema {
        case_index: usize,
        case_id: Option<String>,
        field: String,
        reason: String,
    },
    /// The output could not be decoded into test cases at all.
    MalformedOutput { reason: String },
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationFailure::Cardinality {
                category,
                expected,
                actual,
            } => write!(
                f,
                "expected exactly {} test cases for {}, got {}",
                expected, category, actual
            ),
            ValidationFailure::Schema {
                case_index,
                case_id,
                field,
                reason,
            } => write!(
                f,
                "test case #{} ({}) field '{}': {}",
                case_index + 1,
                case_id.as_deref().unwrap_or("no id"),
                field,
                reason
            ),
            ValidationFailure::MalformedOutput { reason } => {
                write!(f, "malformed generation output: {}", reason)
            }
        }
    }
}

/// Errors raised by workflow stages.
///
/// No stage recovers locally from any of these. The only default the system
/// ever applies is the flagged conservative category on consultation timeout,
/// and that path does not go through this type.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowError {
    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        input_excerpt: String,
        occurred_at: DateTime<Utc>,
    },

    #[error("Tool error ({tool}): {message}")]
    Tool {
        tool: String,
        message: String,
        raw_response: Option<String>,
        occurred_at: DateTime<Utc>,
    },

    #[error("Confidence error: {confidence:.2} for {category} is below threshold {threshold:.2}")]
    Confidence {
        category: Category,
        confidence: f64,
        threshold: f64,
        occurred_at: DateTime<Utc>,
    },

    #[error("Ambiguity error: {} categories scored within {band:.2} of each other", .candidates.len())]
    Ambiguity {
        candidates: Vec<CategoryScore>,
        band: f64,
        occurred_at: DateTime<Utc>,
    },

    #[error("Validation error: {failure}")]
    Validation {
        failure: ValidationFailure,
        raw_output: String,
        occurred_at: DateTime<Utc>,
    },

    #[error("Operation cancelled: {reason}")]
    Cancelled {
        reason: String,
        occurred_at: DateTime<Utc>,
    },
}

impl WorkflowError {
    pub fn parsing(message: impl Into<String>, input_excerpt: impl Into<String>) -> Self {
        WorkflowError::Parsing {
            message: message.into(),
            input_excerpt: input_excerpt.into(),
            occurred_at: Utc::now(),
        }
    }

    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        WorkflowError::Tool {
            tool: tool.into(),
            message: message.into(),
            raw_response: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn tool_with_response(
        tool: impl Into<String>,
        message: impl Into<String>,
        raw_response: impl Into<String>,
    ) -> Self {
        WorkflowError::Tool {
            tool: tool.into(),
            message: message.into(),
            raw_response: Some(raw_response.into()),
            occurred_at: Utc::now(),
        }
    }

    pub fn validation(failure: ValidationFailure, raw_output: impl Into<String>) -> Self {
        WorkflowError::Validation {
            failure,
            raw_output: raw_output.into(),
            occurred_at: Utc::now(),
        }
    }

    pub fn cancelled(reason: impl Into<String>) -> Self {
        WorkflowError::Cancelled {
            reason: reason.into(),
            occurred_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Parsing { .. } => ErrorKind::Parsing,
            WorkflowError::Tool { .. } => ErrorKind::Tool,
            WorkflowError::Confidence { .. } => ErrorKind::Confidence,
            WorkflowError::Ambiguity { .. } => ErrorKind::Ambiguity,
            WorkflowError::Validation { .. } => ErrorKind::Validation,
            WorkflowError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WorkflowError::Cancelled { .. })
    }

    /// Expected and actual case counts, for cardinality failures only.
    pub fn cardinality(&self) -> Option<(usize, usize)> {
        match self {
            WorkflowError::Validation {
                failure: ValidationFailure::Cardinality {
                    expected, actual, ..
                },
                ..
            } => Some((*expected, *actual)),
            _ => None,
        }
    }
}
