//! Output format value object

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a [`WorkflowReport`](super::WorkflowReport) is rendered for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Classification, consultation, every test case and the audit trail
    Full,
    /// Outcome, category and case titles (default)
    #[default]
    Summary,
    /// The report serialized as JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(OutputFormat::Full),
            "summary" => Ok(OutputFormat::Summary),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
