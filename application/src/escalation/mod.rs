//! Escalation plumbing shared by the workflow and consultation adapters

pub mod desk;

pub use desk::{ConsultationDesk, DeskOutcome};
