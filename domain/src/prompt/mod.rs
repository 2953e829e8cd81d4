//! Prompt domain
//!
//! Templates for every collaborator call in the workflow.

mod template;

pub use template::PromptTemplate;
