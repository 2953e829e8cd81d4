//! Reviewer-facing consultation adapters

pub mod interactive;
