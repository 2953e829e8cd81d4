//! Retrieval port
//!
//! Reference-corpus lookup used by the context agent.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use valgen_domain::{Category, RankedPassage};

#[derive(Error, Debug, Clone)]
pub enum RetrievalError {
    #[error("Retrieval service unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrievalQuery {
    pub query: String,
    pub category: Category,
    /// Sub-collection of the corpus to search; `None` searches everything
    pub corpus_scope: Option<String>,
    pub limit: usize,
}

#[async_trait]
pub trait RetrievalPort: Send + Sync {
    /// Passages ordered from most to least relevant, at most `query.limit`.
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<RankedPassage>, RetrievalError>;
}
