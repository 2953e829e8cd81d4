//! Application-level configuration.
//!
//! - [`WorkflowParams`]: stage limits and timeouts
//! - [`WorkflowConfig`]: container handed to the orchestrator

pub mod workflow_config;
pub mod workflow_params;

pub use workflow_config::WorkflowConfig;
pub use workflow_params::WorkflowParams;
