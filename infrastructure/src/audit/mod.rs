//! Audit ledger persistence

mod jsonl_store;

pub use jsonl_store::JsonlAuditStore;
