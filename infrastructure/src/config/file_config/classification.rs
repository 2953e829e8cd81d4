//! Classification configuration from TOML (`[classification]` section)

use serde::{Deserialize, Serialize};

/// Raw classification gate settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileClassificationConfig {
    /// Minimum confidence accepted without escalation
    pub threshold: f64,
    /// Score distance within which two categories count as ambiguous
    pub ambiguity_band: f64,
    /// Minimum document length (characters, after trimming)
    pub min_document_length: usize,
    /// Classification attempts before the run fails
    pub max_attempts: usize,
}

impl Default for FileClassificationConfig {
    fn default() -> Self {
        Self {
            threshold: 0.60,
            ambiguity_band: 0.10,
            min_document_length: 20,
            max_attempts: 1,
        }
    }
}
