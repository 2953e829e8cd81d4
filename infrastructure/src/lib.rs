//! Infrastructure layer for valgen
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod audit;
pub mod config;
pub mod inference;
pub mod logging;
pub mod retrieval;

// Re-export commonly used types
pub use audit::JsonlAuditStore;
pub use config::{
    ConfigLoader, ConfigValidationError, FileAuditConfig, FileClassificationConfig, FileConfig,
    FileCoordinationConfig, FileEscalationConfig, FileInferenceConfig, FileLoggingConfig,
    FileOutputConfig, FileOutputFormat, FileRetrievalConfig,
};
pub use inference::OpenAiCompatibleGateway;
pub use logging::JsonlTranscriptLogger;
pub use retrieval::LocalCorpusRetriever;
