//! Audit subdomain: tamper-evident, append-only record of every decision

pub mod chain;
pub mod entry;

pub use chain::{AuditChain, ChainError, verify_chain};
pub use entry::{
    Actor, AuditEntry, AuditEventKind, GENESIS_PREV_HASH, canonical_json, digest_of,
};
