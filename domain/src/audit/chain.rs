//! Append-only hash chain of audit entries

use super::entry::{Actor, AuditEntry, AuditEventKind, GENESIS_PREV_HASH, digest_of};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    #[error("Hash chain broken at entry {sequence_number}: expected prev hash {expected}, found {actual}")]
    BrokenLink {
        sequence_number: u64,
        expected: String,
        actual: String,
    },

    #[error("Sequence gap: expected entry {expected}, found {actual}")]
    SequenceGap { expected: u64, actual: u64 },

    #[error("Failed to serialize audit data: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ChainError {
    fn from(e: serde_json::Error) -> Self {
        ChainError::Serialization(e.to_string())
    }
}

/// Verify sequence numbering (from 1, no gaps) and every hash link.
///
/// Reports the first problem found.
pub fn verify_chain(entries: &[AuditEntry]) -> Result<(), ChainError> {
    let mut expected_prev = GENESIS_PREV_HASH.to_string();
    for (index, entry) in entries.iter().enumerate() {
        let expected_seq = index as u64 + 1;
        if entry.sequence_number != expected_seq {
            return Err(ChainError::SequenceGap {
                expected: expected_seq,
                actual: entry.sequence_number,
            });
        }
        if entry.prev_entry_hash != expected_prev {
            return Err(ChainError::BrokenLink {
                sequence_number: entry.sequence_number,
                expected: expected_prev,
                actual: entry.prev_entry_hash.clone(),
            });
        }
        expected_prev = entry.hash()?;
    }
    Ok(())
}

/// In-memory audit chain.
///
/// Mutation requires `&mut self`; whoever owns the chain is its only writer.
#[derive(Debug, Clone)]
pub struct AuditChain {
    entries: Vec<AuditEntry>,
    last_hash: String,
}

impl Default for AuditChain {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditChain {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            last_hash: GENESIS_PREV_HASH.to_string(),
        }
    }

    /// Continue an existing chain after verifying it.
    pub fn resume(entries: Vec<AuditEntry>) -> Result<Self, ChainError> {
        verify_chain(&entries)?;
        let last_hash = match entries.last() {
            Some(entry) => entry.hash()?,
            None => GENESIS_PREV_HASH.to_string(),
        };
        Ok(Self { entries, last_hash })
    }

    /// Build the entry that would come next, without appending it.
    ///
    /// Lets a persistent owner write the entry to storage before it becomes
    /// part of the in-memory chain.
    pub fn next_entry<P: Serialize + ?Sized>(
        &self,
        actor: Actor,
        event_kind: AuditEventKind,
        payload: &P,
        timestamp: DateTime<Utc>,
    ) -> Result<AuditEntry, ChainError> {
        Ok(AuditEntry {
            sequence_number: self.next_sequence(),
            timestamp,
            actor,
            event_kind,
            payload_digest: digest_of(payload)?,
            prev_entry_hash: self.last_hash.clone(),
        })
    }

    /// Append a prepared entry; it must link to the current head.
    pub fn push(&mut self, entry: AuditEntry) -> Result<&AuditEntry, ChainError> {
        if entry.sequence_number != self.next_sequence() {
            return Err(ChainError::SequenceGap {
                expected: self.next_sequence(),
                actual: entry.sequence_number,
            });
        }
        if entry.prev_entry_hash != self.last_hash {
            return Err(ChainError::BrokenLink {
                sequence_number: entry.sequence_number,
                expected: self.last_hash.clone(),
                actual: entry.prev_entry_hash,
            });
        }
        self.last_hash = entry.hash()?;
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Append an entry committing to `payload`.
    pub fn append<P: Serialize + ?Sized>(
        &mut self,
        actor: Actor,
        event_kind: AuditEventKind,
        payload: &P,
        timestamp: DateTime<Utc>,
    ) -> Result<&AuditEntry, ChainError> {
        let entry = self.next_entry(actor, event_kind, payload, timestamp)?;
        self.push(entry)
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Entries with a sequence number strictly greater than `after`
    pub fn entries_after(&self, after: u64) -> &[AuditEntry] {
        let start = (after as usize).min(self.entries.len());
        &self.entries[start..]
    }

    pub fn last_sequence(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn next_sequence(&self) -> u64 {
        self.last_sequence() + 1
    }

    pub fn last_hash(&self) -> &str {
        &self.last_hash
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn verify(&self) -> Result<(), ChainError> {
        verify_chain(&self.entries)
    }
}
