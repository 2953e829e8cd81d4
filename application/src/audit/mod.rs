//! Audit ledger owned by the workflow orchestrator

pub mod ledger;

pub use ledger::AuditLedger;
