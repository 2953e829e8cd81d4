//! Progress reporting for workflow runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use valgen_application::WorkflowProgressNotifier;
use valgen_domain::{
    AgentKind, Category, ClassificationResult, ConsultationSession, SessionStatus, WorkflowState,
};

/// Reports progress with a spinner per workflow stage
pub struct ProgressReporter {
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            stage_bar: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        let mut bar = self.stage_bar.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut bar);
    }

    fn stage_display_name(state: WorkflowState) -> &'static str {
        match state {
            WorkflowState::Start => "Starting",
            WorkflowState::Classifying => "Classifying",
            WorkflowState::Escalating => "Awaiting reviewer",
            WorkflowState::Coordinating => "Consulting agents",
            WorkflowState::Generating => "Generating tests",
            WorkflowState::Completed => "Completed",
            WorkflowState::Failed => "Failed",
            WorkflowState::Cancelled => "Cancelled",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowProgressNotifier for ProgressReporter {
    fn on_state_change(&self, from: WorkflowState, to: WorkflowState) {
        self.with_bar(|slot| {
            if let Some(pb) = slot.take() {
                pb.finish_with_message(format!("{}", "done".green()));
            }
            if to.is_terminal() {
                return;
            }
            // The consultation prompt writes to the terminal itself
            if to == WorkflowState::Escalating {
                return;
            }
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.set_prefix(Self::stage_display_name(to));
            pb.set_message(format!("after {}", from.as_str()));
            pb.enable_steady_tick(Duration::from_millis(120));
            *slot = Some(pb);
        });
    }

    fn on_classified(&self, result: &ClassificationResult) {
        self.with_bar(|slot| {
            if let Some(pb) = slot.as_ref() {
                pb.set_message(format!(
                    "{} ({:.2})",
                    result.category().display_name(),
                    result.confidence()
                ));
            }
        });
    }

    fn on_agent_complete(&self, kind: AgentKind, success: bool, elapsed_ms: u64) {
        self.with_bar(|slot| {
            if let Some(pb) = slot.as_ref() {
                let status = if success {
                    format!("{} {} {}ms", "v".green(), kind, elapsed_ms)
                } else {
                    format!("{} {} {}ms", "x".red(), kind, elapsed_ms)
                };
                pb.println(format!("  {}", status));
            }
        });
    }

    fn on_generation_start(&self, category: Category, required: usize) {
        self.with_bar(|slot| {
            if let Some(pb) = slot.as_ref() {
                pb.set_message(format!("{} cases for {}", required, category.display_name()));
            }
        });
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl WorkflowProgressNotifier for SimpleProgress {
    fn on_state_change(&self, _from: WorkflowState, to: WorkflowState) {
        eprintln!(
            "{} {}",
            "->".cyan(),
            ProgressReporter::stage_display_name(to).bold()
        );
    }

    fn on_classified(&self, result: &ClassificationResult) {
        eprintln!(
            "  {} ({:.2})",
            result.category().display_name(),
            result.confidence()
        );
    }

    fn on_consultation_closed(&self, session: &ConsultationSession) {
        match session.status() {
            SessionStatus::TimedOut => eprintln!(
                "  {} no decision before deadline, conservative default applied",
                "!".yellow()
            ),
            status => eprintln!("  consultation {}", status.as_str()),
        }
    }

    fn on_agent_complete(&self, kind: AgentKind, success: bool, elapsed_ms: u64) {
        if success {
            eprintln!("  {} {} ({}ms)", "v".green(), kind, elapsed_ms);
        } else {
            eprintln!("  {} {} (failed after {}ms)", "x".red(), kind, elapsed_ms);
        }
    }

    fn on_generation_start(&self, category: Category, required: usize) {
        eprintln!("  {} cases required for {}", required, category.display_name());
    }
}
