//! Rendezvous between the waiting workflow and the consultation UI.
//!
//! The workflow side calls [`ConsultationDesk::await_decision`]; the UI side
//! calls [`ConsultationDesk::submit_decision`]. Each registered session
//! accepts at most one decision; after [`ConsultationDesk::release`] any
//! further submission is rejected. Only the most recent
//! [`CLOSED_HISTORY`] released ids are remembered; older ones are rejected
//! as unknown.

use crate::ports::human_consultation::ConsultationError;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use valgen_domain::{HumanDecision, SessionId};

/// How waiting on a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DeskOutcome {
    Decided(HumanDecision),
    DeadlineExpired,
    Cancelled,
}

struct Slot {
    sender: Option<oneshot::Sender<HumanDecision>>,
    receiver: Option<oneshot::Receiver<HumanDecision>>,
}

/// Released session ids kept to answer late submissions with `SessionClosed`.
pub const CLOSED_HISTORY: usize = 1024;

#[derive(Default)]
struct DeskState {
    open: HashMap<SessionId, Slot>,
    closed: HashSet<SessionId>,
    closed_order: VecDeque<SessionId>,
}

impl DeskState {
    fn close(&mut self, session_id: &SessionId) {
        self.open.remove(session_id);
        if !self.closed.insert(session_id.clone()) {
            return;
        }
        self.closed_order.push_back(session_id.clone());
        while self.closed_order.len() > CLOSED_HISTORY {
            if let Some(oldest) = self.closed_order.pop_front() {
                self.closed.remove(&oldest);
            }
        }
    }
}

#[derive(Default)]
pub struct ConsultationDesk {
    state: Mutex<DeskState>,
}

impl ConsultationDesk {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut DeskState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Open a slot for `session_id`. Registering twice is a no-op.
    pub fn register(&self, session_id: &SessionId) {
        self.with_state(|state| {
            if state.open.contains_key(session_id) || state.closed.contains(session_id) {
                return;
            }
            let (sender, receiver) = oneshot::channel();
            state.open.insert(
                session_id.clone(),
                Slot {
                    sender: Some(sender),
                    receiver: Some(receiver),
                },
            );
        });
    }

    pub fn submit_decision(
        &self,
        session_id: &SessionId,
        decision: HumanDecision,
    ) -> Result<(), ConsultationError> {
        decision
            .validate()
            .map_err(|e| ConsultationError::InvalidDecision(e.to_string()))?;

        let sender = self.with_state(|state| {
            if state.closed.contains(session_id) {
                return Err(ConsultationError::SessionClosed(session_id.clone()));
            }
            let slot = state
                .open
                .get_mut(session_id)
                .ok_or_else(|| ConsultationError::UnknownSession(session_id.clone()))?;
            slot.sender
                .take()
                .ok_or_else(|| ConsultationError::SessionClosed(session_id.clone()))
        })?;

        debug!("Decision submitted for session {}", session_id);
        sender
            .send(decision)
            .map_err(|_| ConsultationError::SessionClosed(session_id.clone()))
    }

    /// Wait for a decision until `deadline` or cancellation, whichever comes first.
    pub async fn await_decision(
        &self,
        session_id: &SessionId,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> Result<DeskOutcome, ConsultationError> {
        let receiver = self.with_state(|state| {
            state
                .open
                .get_mut(session_id)
                .and_then(|slot| slot.receiver.take())
                .ok_or_else(|| ConsultationError::UnknownSession(session_id.clone()))
        })?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Ok(DeskOutcome::Cancelled),
            received = tokio::time::timeout_at(deadline, receiver) => match received {
                Ok(Ok(decision)) => Ok(DeskOutcome::Decided(decision)),
                Ok(Err(_)) => Err(ConsultationError::SessionClosed(session_id.clone())),
                Err(_) => Ok(DeskOutcome::DeadlineExpired),
            },
        }
    }

    /// Close the session; later submissions fail with `SessionClosed`.
    pub fn release(&self, session_id: &SessionId) {
        self.with_state(|state| state.close(session_id));
    }

    pub fn is_open(&self, session_id: &SessionId) -> bool {
        self.with_state(|state| state.open.contains_key(session_id))
    }

    /// Number of released ids still remembered.
    pub fn closed_len(&self) -> usize {
        self.with_state(|state| state.closed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use valgen_domain::Category;

    fn decision() -> HumanDecision {
        HumanDecision::new("reviewer", Category::Configured, "matches vendor config")
    }

    #[tokio::test]
    async fn test_decision_before_deadline() {
        let desk = Arc::new(ConsultationDesk::new());
        let id = SessionId::from("s1");
        desk.register(&id);

        let submitter = Arc::clone(&desk);
        let submit_id = id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            submitter.submit_decision(&submit_id, decision()).unwrap();
        });

        let outcome = desk
            .await_decision(
                &id,
                Instant::now() + Duration::from_secs(5),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(outcome, DeskOutcome::Decided(decision()));
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        let desk = ConsultationDesk::new();
        let id = SessionId::from("s1");
        desk.register(&id);
        let outcome = desk
            .await_decision(
                &id,
                Instant::now() + Duration::from_millis(20),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(outcome, DeskOutcome::DeadlineExpired);
    }

    #[tokio::test]
    async fn test_cancellation_wins() {
        let desk = ConsultationDesk::new();
        let id = SessionId::from("s1");
        desk.register(&id);
        let token = CancellationToken::new();
        token.cancel();
        let outcome = desk
            .await_decision(&id, Instant::now() + Duration::from_secs(5), &token)
            .await
            .unwrap();
        assert_eq!(outcome, DeskOutcome::Cancelled);
    }

    #[test]
    fn test_second_decision_rejected() {
        let desk = ConsultationDesk::new();
        let id = SessionId::from("s1");
        desk.register(&id);
        desk.submit_decision(&id, decision()).unwrap();
        assert_eq!(
            desk.submit_decision(&id, decision()).unwrap_err(),
            ConsultationError::SessionClosed(id)
        );
    }

    #[test]
    fn test_submit_after_release_rejected() {
        let desk = ConsultationDesk::new();
        let id = SessionId::from("s1");
        desk.register(&id);
        desk.release(&id);
        assert!(!desk.is_open(&id));
        assert_eq!(
            desk.submit_decision(&id, decision()).unwrap_err(),
            ConsultationError::SessionClosed(id.clone())
        );
        desk.register(&id);
        assert!(!desk.is_open(&id));
    }

    #[test]
    fn test_invalid_decision_rejected_without_consuming_slot() {
        let desk = ConsultationDesk::new();
        let id = SessionId::from("s1");
        desk.register(&id);
        let bad = HumanDecision::new("reviewer", Category::Custom, "   ");
        assert!(matches!(
            desk.submit_decision(&id, bad),
            Err(ConsultationError::InvalidDecision(_))
        ));
        assert!(desk.submit_decision(&id, decision()).is_ok());
    }

    #[test]
    fn test_closed_history_is_bounded() {
        let desk = ConsultationDesk::new();
        for i in 0..CLOSED_HISTORY + 10 {
            let id = SessionId::from(format!("s{i}").as_str());
            desk.register(&id);
            desk.release(&id);
        }
        assert_eq!(desk.closed_len(), CLOSED_HISTORY);

        let newest = SessionId::from(format!("s{}", CLOSED_HISTORY + 9).as_str());
        assert_eq!(
            desk.submit_decision(&newest, decision()).unwrap_err(),
            ConsultationError::SessionClosed(newest.clone())
        );
        let evicted = SessionId::from("s0");
        assert_eq!(
            desk.submit_decision(&evicted, decision()).unwrap_err(),
            ConsultationError::UnknownSession(evicted)
        );
    }

    #[test]
    fn test_unknown_session() {
        let desk = ConsultationDesk::new();
        let id = SessionId::from("nope");
        assert_eq!(
            desk.submit_decision(&id, decision()).unwrap_err(),
            ConsultationError::UnknownSession(id)
        );
    }
}
