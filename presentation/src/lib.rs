//! Presentation layer for valgen
//!
//! This crate contains CLI definitions, report formatters,
//! progress reporters, and the interactive consultation prompt.

pub mod cli;
pub mod consultation;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, OutputArg, RunArgs};
pub use consultation::interactive::{InteractiveConsultation, ReviewerCommand, parse_command};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
