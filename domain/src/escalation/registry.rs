//! Session bookkeeping with per-attempt duplicate suppression

use super::session::{ConsultationSession, SessionId, SessionTransitionError};
use super::trigger::EscalationRequired;
use crate::classification::result::AttemptId;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Consultation sessions, indexed by the attempt that opened them.
///
/// Within a run sessions are never removed, so an attempt that has been
/// escalated once can never open a second session, even after its first one
/// is terminal. [`SessionRegistry::prune_terminal`] drops finished sessions
/// between runs; attempt ids are never reused across runs.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, ConsultationSession>,
    by_attempt: HashMap<AttemptId, SessionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the single session for the attempt behind `required`.
    pub fn open(
        &mut self,
        required: &EscalationRequired,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Result<&mut ConsultationSession, SessionTransitionError> {
        let attempt_id = required.attempt_id();
        if let Some(existing) = self.by_attempt.get(attempt_id) {
            return Err(SessionTransitionError::DuplicateEscalation {
                attempt_id: attempt_id.clone(),
                existing: existing.clone(),
            });
        }

        let session = ConsultationSession::new(
            required.classification().clone(),
            required.reason().clone(),
            now,
            timeout,
        );
        let id = session.id().clone();
        self.by_attempt.insert(attempt_id.clone(), id.clone());
        Ok(self.sessions.entry(id).or_insert(session))
    }

    pub fn get(&self, id: &SessionId) -> Option<&ConsultationSession> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &SessionId) -> Result<&mut ConsultationSession, SessionTransitionError> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| SessionTransitionError::UnknownSession(id.clone()))
    }

    pub fn for_attempt(&self, attempt_id: &AttemptId) -> Option<&ConsultationSession> {
        self.by_attempt
            .get(attempt_id)
            .and_then(|id| self.sessions.get(id))
    }

    /// Sessions not yet in a terminal state
    pub fn open_sessions(&self) -> impl Iterator<Item = &ConsultationSession> {
        self.sessions.values().filter(|s| !s.is_terminal())
    }

    /// Remove every terminal session and its attempt index entry.
    ///
    /// Returns how many sessions were removed. Call only between runs.
    pub fn prune_terminal(&mut self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_terminal());
        let sessions = &self.sessions;
        self.by_attempt.retain(|_, id| sessions.contains_key(id));
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::category::Category;
    use crate::classification::result::ClassificationResult;
    use crate::escalation::session::SessionStatus;
    use crate::escalation::trigger::TriggerReason;

    fn required(attempt: &str) -> EscalationRequired {
        let result = ClassificationResult::new(
            AttemptId::from(attempt),
            Category::Configured,
            0.3,
            "unclear",
            vec![],
            vec![],
        )
        .unwrap();
        EscalationRequired::new(
            result,
            TriggerReason::LowConfidence {
                category: Category::Configured,
                confidence: 0.3,
                threshold: 0.6,
            },
        )
    }

    #[test]
    fn test_one_session_per_attempt() {
        let mut registry = SessionRegistry::new();
        let id = registry
            .open(&required("a1"), Utc::now(), Duration::seconds(10))
            .unwrap()
            .id()
            .clone();

        let err = registry
            .open(&required("a1"), Utc::now(), Duration::seconds(10))
            .unwrap_err();
        assert_eq!(
            err,
            SessionTransitionError::DuplicateEscalation {
                attempt_id: AttemptId::from("a1"),
                existing: id.clone(),
            }
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.for_attempt(&AttemptId::from("a1")).unwrap().id(), &id);
    }

    #[test]
    fn test_suppression_survives_terminal_state() {
        let mut registry = SessionRegistry::new();
        let session = registry
            .open(&required("a1"), Utc::now(), Duration::seconds(10))
            .unwrap();
        session.cancel("withdrawn", Utc::now()).unwrap();
        assert_eq!(session.status(), SessionStatus::Cancelled);

        assert!(registry
            .open(&required("a1"), Utc::now(), Duration::seconds(10))
            .is_err());
        assert_eq!(registry.open_sessions().count(), 0);
    }

    #[test]
    fn test_distinct_attempts_get_distinct_sessions() {
        let mut registry = SessionRegistry::new();
        registry
            .open(&required("a1"), Utc::now(), Duration::seconds(10))
            .unwrap();
        registry
            .open(&required("a2"), Utc::now(), Duration::seconds(10))
            .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.open_sessions().count(), 2);
    }

    #[test]
    fn test_prune_keeps_open_sessions() {
        let mut registry = SessionRegistry::new();
        registry
            .open(&required("a1"), Utc::now(), Duration::seconds(10))
            .unwrap()
            .cancel("withdrawn", Utc::now())
            .unwrap();
        registry
            .open(&required("a2"), Utc::now(), Duration::seconds(10))
            .unwrap();

        assert_eq!(registry.prune_terminal(), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.for_attempt(&AttemptId::from("a1")).is_none());
        assert!(registry.for_attempt(&AttemptId::from("a2")).is_some());
        assert!(registry
            .open(&required("a2"), Utc::now(), Duration::seconds(10))
            .is_err());
    }

    #[test]
    fn test_unknown_session() {
        let mut registry = SessionRegistry::new();
        let id = SessionId::from("missing");
        assert_eq!(
            registry.get_mut(&id).unwrap_err(),
            SessionTransitionError::UnknownSession(id)
        );
    }
}
