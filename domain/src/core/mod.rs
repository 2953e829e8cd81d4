//! Core domain concepts shared across all subdomains.
//!
//! - [`document::Document`]: a requirement document submitted for generation
//! - [`error::WorkflowError`]: the failure taxonomy every stage reports through
//! - [`json::extract_json`] and [`json::extract_single_json`]: structured-output extraction from collaborator text

pub mod document;
pub mod error;
pub mod json;
pub mod string;
