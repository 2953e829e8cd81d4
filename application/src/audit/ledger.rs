//! The workflow's audit ledger handle.

use crate::ports::audit_store::{AuditStore, AuditStoreError};
use chrono::Utc;
use serde::Serialize;
use tracing::debug;
use valgen_domain::{Actor, AuditChain, AuditEntry, AuditEventKind, ChainError};

/// Hash chain plus its persistent store.
///
/// Every entry is written to the store before it joins the in-memory chain,
/// so a failed write leaves both unchanged. All writes go through
/// `&mut self`: the owner of the ledger is its single writer.
pub struct AuditLedger {
    chain: AuditChain,
    store: Box<dyn AuditStore>,
    run_start: u64,
}

impl AuditLedger {
    /// Open a ledger, verifying and resuming whatever the store already holds.
    pub fn open(store: Box<dyn AuditStore>) -> Result<Self, AuditStoreError> {
        let entries = store.load()?;
        let chain = AuditChain::resume(entries)?;
        let run_start = chain.last_sequence();
        debug!("Audit ledger opened at sequence {}", run_start);
        Ok(Self {
            chain,
            store,
            run_start,
        })
    }

    pub fn record<P: Serialize + ?Sized>(
        &mut self,
        actor: Actor,
        event_kind: AuditEventKind,
        payload: &P,
    ) -> Result<&AuditEntry, AuditStoreError> {
        let entry = self
            .chain
            .next_entry(actor, event_kind, payload, Utc::now())?;
        self.store.append(&entry)?;
        debug!(
            "Audit #{} {} by {}",
            entry.sequence_number, entry.event_kind, entry.actor
        );
        Ok(self.chain.push(entry)?)
    }

    /// Mark the start of a run; [`AuditLedger::run_entries`] starts here.
    pub fn begin_run(&mut self) {
        self.run_start = self.chain.last_sequence();
    }

    /// Entries recorded since the last [`AuditLedger::begin_run`].
    pub fn run_entries(&self) -> Vec<AuditEntry> {
        self.chain.entries_after(self.run_start).to_vec()
    }

    pub fn entries(&self) -> &[AuditEntry] {
        self.chain.entries()
    }

    pub fn verify(&self) -> Result<(), ChainError> {
        self.chain.verify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::audit_store::InMemoryAuditStore;
    use serde_json::json;
    use std::sync::Arc;

    struct SharedStore(Arc<InMemoryAuditStore>);

    impl AuditStore for SharedStore {
        fn load(&self) -> Result<Vec<AuditEntry>, AuditStoreError> {
            self.0.load()
        }
        fn append(&self, entry: &AuditEntry) -> Result<(), AuditStoreError> {
            self.0.append(entry)
        }
    }

    struct BrokenStore;

    impl AuditStore for BrokenStore {
        fn load(&self) -> Result<Vec<AuditEntry>, AuditStoreError> {
            Ok(Vec::new())
        }
        fn append(&self, _entry: &AuditEntry) -> Result<(), AuditStoreError> {
            Err(AuditStoreError::Io("disk full".into()))
        }
    }

    #[test]
    fn test_entries_persist_before_chain() {
        let store = Arc::new(InMemoryAuditStore::new());
        let mut ledger = AuditLedger::open(Box::new(SharedStore(Arc::clone(&store)))).unwrap();
        ledger
            .record(Actor::Orchestrator, AuditEventKind::WorkflowStarted, &json!({}))
            .unwrap();
        ledger
            .record(Actor::Classifier, AuditEventKind::ClassificationCompleted, &json!({"c": 4}))
            .unwrap();
        assert_eq!(store.snapshot(), ledger.entries());
        assert!(ledger.verify().is_ok());
    }

    #[test]
    fn test_failed_write_leaves_chain_unchanged() {
        let mut ledger = AuditLedger::open(Box::new(BrokenStore)).unwrap();
        let err = ledger
            .record(Actor::Orchestrator, AuditEventKind::WorkflowStarted, &json!({}))
            .unwrap_err();
        assert_eq!(err, AuditStoreError::Io("disk full".into()));
        assert!(ledger.entries().is_empty());
    }

    #[test]
    fn test_reopen_resumes_and_scopes_run_entries() {
        let store = Arc::new(InMemoryAuditStore::new());
        {
            let mut first = AuditLedger::open(Box::new(SharedStore(Arc::clone(&store)))).unwrap();
            first
                .record(Actor::Orchestrator, AuditEventKind::WorkflowStarted, &json!({}))
                .unwrap();
        }
        let mut second = AuditLedger::open(Box::new(SharedStore(Arc::clone(&store)))).unwrap();
        second.begin_run();
        let entry = second
            .record(Actor::Orchestrator, AuditEventKind::WorkflowStarted, &json!({}))
            .unwrap()
            .clone();
        assert_eq!(entry.sequence_number, 2);
        assert_eq!(second.run_entries(), vec![entry]);
        assert_eq!(store.snapshot().len(), 2);
    }
}
