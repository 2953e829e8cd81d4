//! Workflow state machine
//!
//! ```text
//! Start ──> Classifying ──> Escalating ──> Coordinating ──> Generating ──> Completed
//!                 └───────────────────────────^
//! any non-terminal state ──> Failed | Cancelled
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Start,
    Classifying,
    Escalating,
    Coordinating,
    Generating,
    Completed,
    Failed,
    Cancelled,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Start => "start",
            WorkflowState::Classifying => "classifying",
            WorkflowState::Escalating => "escalating",
            WorkflowState::Coordinating => "coordinating",
            WorkflowState::Generating => "generating",
            WorkflowState::Completed => "completed",
            WorkflowState::Failed => "failed",
            WorkflowState::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowState::Completed | WorkflowState::Failed | WorkflowState::Cancelled
        )
    }

    pub fn can_transition_to(&self, next: WorkflowState) -> bool {
        use WorkflowState::*;
        if self.is_terminal() {
            return false;
        }
        match next {
            Failed | Cancelled => true,
            Classifying => *self == Start,
            Escalating => *self == Classifying,
            Coordinating => matches!(self, Classifying | Escalating),
            Generating => *self == Coordinating,
            Completed => *self == Generating,
            Start => false,
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid workflow transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: WorkflowState,
    pub to: WorkflowState,
}

/// Tracks the current state and the path taken so far.
#[derive(Debug, Clone)]
pub struct WorkflowMachine {
    state: WorkflowState,
    history: Vec<WorkflowState>,
}

impl Default for WorkflowMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowMachine {
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Start,
            history: vec![WorkflowState::Start],
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Every state visited, in order, starting with `Start`.
    pub fn history(&self) -> &[WorkflowState] {
        &self.history
    }

    /// Check a transition without performing it.
    pub fn check(&self, next: WorkflowState) -> Result<(), InvalidTransition> {
        if self.state.can_transition_to(next) {
            Ok(())
        } else {
            Err(InvalidTransition {
                from: self.state,
                to: next,
            })
        }
    }

    pub fn transition(&mut self, next: WorkflowState) -> Result<WorkflowState, InvalidTransition> {
        self.check(next)?;
        let previous = self.state;
        self.state = next;
        self.history.push(next);
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WorkflowState::*;

    #[test]
    fn test_happy_path_without_escalation() {
        let mut machine = WorkflowMachine::new();
        for next in [Classifying, Coordinating, Generating, Completed] {
            machine.transition(next).unwrap();
        }
        assert_eq!(machine.state(), Completed);
        assert_eq!(
            machine.history(),
            &[Start, Classifying, Coordinating, Generating, Completed]
        );
    }

    #[test]
    fn test_escalation_path() {
        let mut machine = WorkflowMachine::new();
        for next in [Classifying, Escalating, Coordinating] {
            machine.transition(next).unwrap();
        }
        assert_eq!(machine.state(), Coordinating);
    }

    #[test]
    fn test_cannot_skip_stages() {
        let machine = WorkflowMachine::new();
        assert_eq!(
            machine.check(Generating).unwrap_err(),
            InvalidTransition {
                from: Start,
                to: Generating
            }
        );
        assert!(!Classifying.can_transition_to(Generating));
        assert!(!Coordinating.can_transition_to(Escalating));
    }

    #[test]
    fn test_failure_and_cancel_from_any_non_terminal() {
        for state in [Start, Classifying, Escalating, Coordinating, Generating] {
            assert!(state.can_transition_to(Failed));
            assert!(state.can_transition_to(Cancelled));
        }
    }

    #[test]
    fn test_terminal_states_are_final() {
        for state in [Completed, Failed, Cancelled] {
            assert!(state.is_terminal());
            assert!(!state.can_transition_to(Failed));
            assert!(!state.can_transition_to(Cancelled));
        }
    }
}
