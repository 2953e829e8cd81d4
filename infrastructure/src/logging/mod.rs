//! Logging infrastructure: per-run JSONL transcripts of collaborator exchanges.
//!
//! Provides [`JsonlTranscriptLogger`], which implements the
//! [`ConversationLogger`](valgen_application::ConversationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlTranscriptLogger;
