//! Audit store port
//!
//! Persistence for audit entries. Writes are synchronous so that an entry is
//! durable before the workflow transition it records takes effect.

use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use valgen_domain::{AuditEntry, ChainError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuditStoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Corrupt audit record at line {line}: {message}")]
    Corrupt { line: usize, message: String },

    #[error("Audit chain error: {0}")]
    Chain(#[from] ChainError),
}

/// Append-only storage for audit entries.
pub trait AuditStore: Send + Sync {
    /// All stored entries, oldest first.
    fn load(&self) -> Result<Vec<AuditEntry>, AuditStoreError>;

    /// Durably append one entry.
    fn append(&self, entry: &AuditEntry) -> Result<(), AuditStoreError>;
}

/// Volatile store for tests and ledger-less runs.
#[derive(Default)]
pub struct InMemoryAuditStore {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuditStore for InMemoryAuditStore {
    fn load(&self) -> Result<Vec<AuditEntry>, AuditStoreError> {
        Ok(self.snapshot())
    }

    fn append(&self, entry: &AuditEntry) -> Result<(), AuditStoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        Ok(())
    }
}
