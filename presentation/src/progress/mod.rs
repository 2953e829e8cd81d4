//! Progress display for workflow runs

pub mod reporter;
