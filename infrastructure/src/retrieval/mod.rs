//! Retrieval adapters

mod corpus;

pub use corpus::LocalCorpusRetriever;
