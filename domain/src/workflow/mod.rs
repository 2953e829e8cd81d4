//! Workflow subdomain: the orchestrator's state machine and its report

pub mod output_format;
pub mod report;
pub mod state;

pub use output_format::OutputFormat;
pub use report::{CategorySource, WorkflowOutcome, WorkflowReport};
pub use state::{InvalidTransition, WorkflowMachine, WorkflowState};
