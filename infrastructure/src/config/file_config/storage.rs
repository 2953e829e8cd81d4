//! Retrieval, audit and transcript locations (`[retrieval]`, `[audit]`, `[logging]`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw retrieval corpus settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetrievalConfig {
    /// Directory of `.md`/`.txt` reference documents; unset means no corpus
    pub corpus_dir: Option<PathBuf>,
    /// Maximum passage length in characters
    pub passage_chars: usize,
}

impl Default for FileRetrievalConfig {
    fn default() -> Self {
        Self {
            corpus_dir: None,
            passage_chars: 800,
        }
    }
}

/// Raw audit ledger settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuditConfig {
    /// Append-only JSONL ledger; reopened ledgers resume their chain
    pub ledger_path: PathBuf,
}

impl Default for FileAuditConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from(".valgen/audit.jsonl"),
        }
    }
}

/// Raw transcript settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for per-run JSONL transcripts; unset disables them
    pub transcript_dir: Option<PathBuf>,
}
