//! Use cases
//!
//! Application-level operations that orchestrate domain logic. Each stage
//! has its own use case; [`run_workflow::RunWorkflowUseCase`] sequences them.

pub mod classify;
pub mod coordinate;
pub mod escalate;
pub mod generate;
pub mod run_workflow;
pub(crate) mod shared;
