//! Escalation policy: how a failed confidence gate is handled.

use crate::classification::category::Category;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// What happens when classification needs a human decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationMode {
    /// Open a consultation session and wait for a reviewer (default)
    #[default]
    Interactive,
    /// No consultation; the trigger surfaces as a Confidence/Ambiguity error
    FailFast,
}

impl EscalationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationMode::Interactive => "interactive",
            EscalationMode::FailFast => "fail_fast",
        }
    }
}

impl std::fmt::Display for EscalationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EscalationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "interactive" => Ok(EscalationMode::Interactive),
            "fail_fast" | "failfast" => Ok(EscalationMode::FailFast),
            _ => Err(format!("Unknown escalation mode: {}", s)),
        }
    }
}

/// Escalation behaviour constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct EscalationPolicy {
    pub mode: EscalationMode,
    /// Category applied when a consultation expires without a decision
    pub conservative_default: Category,
    /// How long a reviewer has to answer
    pub consultation_timeout: Duration,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            mode: EscalationMode::Interactive,
            conservative_default: Category::most_conservative(),
            consultation_timeout: Duration::from_secs(300),
        }
    }
}

impl EscalationPolicy {
    // ==================== Builder Methods ====================

    pub fn with_mode(mut self, mode: EscalationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_conservative_default(mut self, category: Category) -> Self {
        self.conservative_default = category;
        self
    }

    pub fn with_consultation_timeout(mut self, timeout: Duration) -> Self {
        self.consultation_timeout = timeout;
        self
    }

    pub fn consults_human(&self) -> bool {
        self.mode == EscalationMode::Interactive
    }
}
