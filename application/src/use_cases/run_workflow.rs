//! Run Workflow use case
//!
//! Drives one requirement document through the whole pipeline:
//! classification, optional human consultation, parallel agent coordination
//! and strict generation. This is the only place that mutates workflow state
//! or consultation sessions, and every such mutation is recorded in the
//! audit ledger before it takes effect.

use crate::agents::{ContextAgent, ResearchAgent, SmeAgent};
use crate::audit::AuditLedger;
use crate::config::WorkflowConfig;
use crate::escalation::{ConsultationDesk, DeskOutcome};
use crate::ports::conversation_logger::{ConversationLogger, NoConversationLogger};
use crate::ports::human_consultation::HumanConsultationPort;
use crate::ports::inference::InferenceGateway;
use crate::ports::progress::{NoProgress, WorkflowProgressNotifier};
use crate::ports::retrieval::RetrievalPort;
use crate::use_cases::classify::ClassifyDocumentUseCase;
use crate::use_cases::coordinate::{COORDINATION_TOOL, CoordinateAgentsUseCase};
use crate::use_cases::escalate::EscalationService;
use crate::use_cases::generate::GenerateSuiteUseCase;
use crate::use_cases::shared::{check_cancelled, run_cancellable};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use valgen_domain::{
    Actor, AgentKind, AttemptId, AuditEventKind, Category, CategorySource, ClassificationResult,
    ConsultationSession, CorrelationId, Document, ErrorKind, EscalationRequired, HumanDecision,
    SessionRegistry, SessionTransitionError, TestSuite, WorkflowError, WorkflowMachine,
    WorkflowOutcome, WorkflowReport, WorkflowState,
};

/// Tool name reported when the audit store rejects a write
pub const AUDIT_TOOL: &str = "audit_store";
/// Tool name reported for consultation bookkeeping failures
pub const ESCALATION_TOOL: &str = "escalation";

/// Per-run bookkeeping folded into the report.
struct RunState {
    machine: WorkflowMachine,
    classification: Option<ClassificationResult>,
    session: Option<ConsultationSession>,
    effective_category: Option<Category>,
    category_source: Option<CategorySource>,
}

impl RunState {
    fn new() -> Self {
        Self {
            machine: WorkflowMachine::new(),
            classification: None,
            session: None,
            effective_category: None,
            category_source: None,
        }
    }
}

pub struct RunWorkflowUseCase {
    gateway: Arc<dyn InferenceGateway>,
    retriever: Arc<dyn RetrievalPort>,
    consultation: Arc<dyn HumanConsultationPort>,
    desk: Arc<ConsultationDesk>,
    logger: Arc<dyn ConversationLogger>,
    config: WorkflowConfig,
    ledger: AuditLedger,
    registry: SessionRegistry,
    cancellation: Option<CancellationToken>,
}

impl RunWorkflowUseCase {
    pub fn new(
        gateway: Arc<dyn InferenceGateway>,
        retriever: Arc<dyn RetrievalPort>,
        consultation: Arc<dyn HumanConsultationPort>,
        ledger: AuditLedger,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            gateway,
            retriever,
            consultation,
            desk: Arc::new(ConsultationDesk::new()),
            logger: Arc::new(NoConversationLogger),
            config,
            ledger,
            registry: SessionRegistry::new(),
            cancellation: None,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Set cancellation token for graceful shutdown
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    // ==================== Accessors ====================

    /// Desk through which out-of-band reviewers submit decisions.
    pub fn desk(&self) -> Arc<ConsultationDesk> {
        Arc::clone(&self.desk)
    }

    pub fn ledger(&self) -> &AuditLedger {
        &self.ledger
    }

    /// Consultation sessions of the current run, plus any still open.
    pub fn sessions(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    // ==================== Execution ====================

    pub async fn execute(&mut self, document: &Document) -> WorkflowReport {
        self.execute_with_progress(document, &NoProgress).await
    }

    /// Run the workflow to a terminal state.
    ///
    /// Never returns an error: failures and cancellation are reported in
    /// [`WorkflowReport::outcome`] together with the run's audit trail.
    pub async fn execute_with_progress(
        &mut self,
        document: &Document,
        progress: &dyn WorkflowProgressNotifier,
    ) -> WorkflowReport {
        let workflow_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("workflow", id = %workflow_id, document = document.name());

        self.ledger.begin_run();
        let pruned = self.registry.prune_terminal();
        if pruned > 0 {
            debug!("Dropped {} finished consultation sessions from earlier runs", pruned);
        }
        let mut run = RunState::new();

        let result = self
            .drive(&workflow_id, document, &mut run, progress)
            .instrument(span.clone())
            .await;

        let outcome = span.in_scope(|| match result {
            Ok(suite) => {
                info!(
                    "Workflow completed: {} test cases for {}",
                    suite.len(),
                    suite.category()
                );
                WorkflowOutcome::Completed { suite }
            }
            Err(error) => self.settle_failure(error, &mut run, progress),
        });

        WorkflowReport {
            workflow_id,
            document_name: document.name().to_string(),
            final_state: run.machine.state(),
            classification: run.classification,
            escalation: run.session,
            effective_category: run.effective_category,
            category_source: run.category_source,
            outcome,
            audit_trail: self.ledger.run_entries(),
        }
    }

    async fn drive(
        &mut self,
        workflow_id: &str,
        document: &Document,
        run: &mut RunState,
        progress: &dyn WorkflowProgressNotifier,
    ) -> Result<TestSuite, WorkflowError> {
        let params = self.config.params().clone();

        self.audit(
            Actor::Orchestrator,
            AuditEventKind::WorkflowStarted,
            &json!({
                "workflow_id": workflow_id,
                "document": document.name(),
                "document_chars": document.significant_len(),
            }),
        )?;
        check_cancelled(&self.cancellation, "start")?;

        // Classification
        self.transition(run, WorkflowState::Classifying, progress)?;
        let result = self.classify(document, run, progress).await?;

        // Confidence gate
        let (category, source) = match self.config.confidence().evaluate(result) {
            Ok(accepted) => {
                info!(
                    "Classification accepted: {} ({:.2})",
                    accepted.category(),
                    accepted.confidence()
                );
                (accepted.category(), CategorySource::Classifier)
            }
            Err(required) => {
                let span = info_span!("escalate", attempt = %required.attempt_id());
                self.escalate(document, required, run, progress)
                    .instrument(span)
                    .await?
            }
        };
        run.effective_category = Some(category);
        run.category_source = Some(source);
        check_cancelled(&self.cancellation, "escalate")?;

        // Coordination
        self.transition(run, WorkflowState::Coordinating, progress)?;
        let correlation_id = CorrelationId::new();
        self.audit(
            Actor::Orchestrator,
            AuditEventKind::CoordinationStarted,
            &json!({
                "correlation_id": &correlation_id,
                "category": category,
                "category_source": source,
                "agents": AgentKind::ALL,
            }),
        )?;

        let excerpt = document.excerpt(params.excerpt_chars);
        let round = self
            .coordinator()
            .execute(correlation_id, category, &excerpt, &self.cancellation, progress)
            .await?;
        for response in &round.responses {
            self.audit(
                Actor::Agent {
                    kind: response.kind,
                },
                AuditEventKind::AgentCompleted,
                response,
            )?;
        }
        let context = round
            .aggregate()
            .map_err(|e| WorkflowError::tool(COORDINATION_TOOL, e.to_string()))?;
        self.audit(
            Actor::Orchestrator,
            AuditEventKind::CoordinationCompleted,
            &json!({
                "correlation_id": context.correlation_id(),
                "passages": context.context().passages.len(),
                "findings": context.research().findings.len(),
                "recommendations": context.sme().recommendations.len(),
            }),
        )?;
        check_cancelled(&self.cancellation, "coordinate")?;

        // Generation
        self.transition(run, WorkflowState::Generating, progress)?;
        progress.on_generation_start(category, category.required_test_count());
        let generator = GenerateSuiteUseCase::new(Arc::clone(&self.gateway))
            .with_conversation_logger(Arc::clone(&self.logger));
        let suite = run_cancellable(
            &self.cancellation,
            "generate",
            generator.execute(&context, &excerpt),
        )
        .await?;
        self.audit(
            Actor::Generator,
            AuditEventKind::GenerationCompleted,
            &json!({
                "category": suite.category(),
                "required": suite.required_count(),
                "generated": suite.len(),
                "case_ids": suite.cases().iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            }),
        )?;

        self.audit(
            Actor::Orchestrator,
            AuditEventKind::WorkflowCompleted,
            &json!({
                "workflow_id": workflow_id,
                "category": category,
                "category_source": source,
                "test_cases": suite.len(),
            }),
        )?;
        self.transition(run, WorkflowState::Completed, progress)?;
        Ok(suite)
    }

    /// Classification attempts, each audited. Parsing errors are not retried.
    async fn classify(
        &mut self,
        document: &Document,
        run: &mut RunState,
        progress: &dyn WorkflowProgressNotifier,
    ) -> Result<ClassificationResult, WorkflowError> {
        let params = self.config.params();
        let max_attempts = params.max_classification_attempts.max(1);
        let classifier = ClassifyDocumentUseCase::new(Arc::clone(&self.gateway))
            .with_conversation_logger(Arc::clone(&self.logger))
            .with_min_document_length(params.min_document_length);

        let mut attempt = 1;
        loop {
            let attempt_id = AttemptId::new();
            let outcome = run_cancellable(
                &self.cancellation,
                "classify",
                classifier.execute(document, attempt_id.clone()),
            )
            .await;

            match outcome {
                Ok(result) => {
                    self.audit(
                        Actor::Classifier,
                        AuditEventKind::ClassificationCompleted,
                        &result,
                    )?;
                    progress.on_classified(&result);
                    run.classification = Some(result.clone());
                    return Ok(result);
                }
                Err(error) if error.is_cancelled() => return Err(error),
                Err(error) => {
                    self.audit(
                        Actor::Classifier,
                        AuditEventKind::ClassificationAttemptFailed,
                        &json!({
                            "attempt": attempt,
                            "attempt_id": attempt_id,
                            "error": &error,
                        }),
                    )?;
                    if error.kind() == ErrorKind::Parsing || attempt >= max_attempts {
                        return Err(error);
                    }
                    warn!("Classification attempt {} failed: {}", attempt, error);
                    attempt += 1;
                }
            }
        }
    }

    /// Open and await the consultation for `required`.
    ///
    /// Returns the category to use and where it came from. In fail-fast mode
    /// the escalation itself is the failure.
    async fn escalate(
        &mut self,
        document: &Document,
        required: EscalationRequired,
        run: &mut RunState,
        progress: &dyn WorkflowProgressNotifier,
    ) -> Result<(Category, CategorySource), WorkflowError> {
        let policy = self.config.escalation().clone();
        warn!("Escalation required: {}", required.reason());
        self.audit(
            Actor::Orchestrator,
            AuditEventKind::EscalationTriggered,
            &json!({
                "attempt_id": required.attempt_id(),
                "reason": required.reason(),
                "mode": policy.mode.as_str(),
            }),
        )?;
        if !policy.consults_human() {
            return Err(required.into_error());
        }

        self.transition(run, WorkflowState::Escalating, progress)?;
        let service = EscalationService::new(
            Arc::clone(&self.consultation),
            Arc::clone(&self.desk),
            policy.clone(),
        );
        let session_id = service
            .open(&mut self.registry, &required)
            .map_err(escalation_error)?;
        let opened = self
            .registry
            .get(&session_id)
            .cloned()
            .ok_or_else(|| escalation_error(SessionTransitionError::UnknownSession(session_id)))?;
        run.session = Some(opened.clone());

        let mut awaiting = opened;
        awaiting.begin_awaiting().map_err(escalation_error)?;
        self.audit(
            Actor::Orchestrator,
            AuditEventKind::ConsultationAwaiting,
            &json!({
                "session_id": awaiting.id(),
                "attempt_id": awaiting.attempt_id(),
                "reason": awaiting.trigger_reason(),
                "proposed": awaiting.proposed(),
                "deadline": awaiting.deadline(),
            }),
        )?;
        self.commit_session(run, awaiting.clone())?;
        progress.on_consultation_opened(&awaiting);

        let params = self.config.params();
        service.present(service.request_for(&awaiting, document, params.excerpt_chars));

        let cancel = self.cancellation.clone().unwrap_or_default();
        let outcome = service
            .await_decision(&awaiting, &cancel)
            .await
            .map_err(|e| WorkflowError::tool(ESCALATION_TOOL, e.to_string()))?;

        let decided = match outcome {
            DeskOutcome::Decided(decision) => {
                self.apply_decision(run, &awaiting, decision, policy.conservative_default)?
            }
            DeskOutcome::DeadlineExpired => {
                self.apply_fallback(run, &awaiting, policy.conservative_default, None)?
            }
            DeskOutcome::Cancelled => {
                return Err(WorkflowError::cancelled(
                    "cancellation requested during consultation",
                ));
            }
        };
        if let Some(session) = &run.session {
            progress.on_consultation_closed(session);
        }
        Ok(decided)
    }

    fn apply_decision(
        &mut self,
        run: &mut RunState,
        awaiting: &ConsultationSession,
        decision: HumanDecision,
        conservative_default: Category,
    ) -> Result<(Category, CategorySource), WorkflowError> {
        let reviewer = decision.reviewer.clone();
        let mut resolved = awaiting.clone();
        let resolution = match resolved.resolve(decision.clone(), Utc::now()) {
            Ok(resolution) => resolution.clone(),
            Err(SessionTransitionError::DeadlinePassed { deadline }) => {
                warn!("Decision arrived after deadline {}; treating as expiry", deadline);
                return self.apply_fallback(run, awaiting, conservative_default, Some(&decision));
            }
            Err(e) => return Err(escalation_error(e)),
        };

        self.audit(
            Actor::Human { identity: reviewer },
            AuditEventKind::ConsultationResolved,
            &json!({
                "session_id": resolved.id(),
                "resolution": &resolution,
                "proposed_category": resolved.proposed().category(),
            }),
        )?;
        self.commit_session(run, resolved)?;
        info!(
            "Consultation resolved by reviewer: {}",
            resolution.decided_category
        );
        Ok((resolution.decided_category, CategorySource::Human))
    }

    /// Expire the session with the conservative default. A decision that
    /// missed the deadline is kept in the timeout record, never applied.
    fn apply_fallback(
        &mut self,
        run: &mut RunState,
        awaiting: &ConsultationSession,
        conservative_default: Category,
        late_decision: Option<&HumanDecision>,
    ) -> Result<(Category, CategorySource), WorkflowError> {
        let mut expired = awaiting.clone();
        let resolution = expired
            .expire(conservative_default, Utc::now())
            .map_err(escalation_error)?
            .clone();

        self.audit(
            Actor::SystemTimeout,
            AuditEventKind::ConsultationTimedOut,
            &json!({
                "session_id": expired.id(),
                "deadline": expired.deadline(),
                "late_decision": late_decision,
            }),
        )?;
        self.audit(
            Actor::SystemTimeout,
            AuditEventKind::FallbackApplied,
            &json!({
                "session_id": expired.id(),
                "resolution": &resolution,
            }),
        )?;
        self.commit_session(run, expired)?;
        warn!(
            "Consultation timed out; conservative default {} applied (flagged)",
            resolution.decided_category
        );
        Ok((resolution.decided_category, CategorySource::TimeoutFallback))
    }

    // ==================== Terminal Handling ====================

    fn settle_failure(
        &mut self,
        error: WorkflowError,
        run: &mut RunState,
        progress: &dyn WorkflowProgressNotifier,
    ) -> WorkflowOutcome {
        if let WorkflowError::Cancelled { reason, .. } = &error {
            warn!("Workflow cancelled: {}", reason);
            self.cancel_open_session(run, reason);
            self.audit_best_effort(
                AuditEventKind::WorkflowCancelled,
                &json!({ "state": run.machine.state(), "reason": reason }),
            );
            self.finish(run, WorkflowState::Cancelled, progress);
            return WorkflowOutcome::Cancelled {
                reason: reason.clone(),
            };
        }

        warn!("Workflow failed: {}", error);
        if error.kind() == ErrorKind::Validation
            && let Err(e) = self
                .ledger
                .record(Actor::Generator, AuditEventKind::ValidationFailed, &error)
        {
            warn!("Could not record validation failure: {}", e);
        }
        self.audit_best_effort(
            AuditEventKind::WorkflowFailed,
            &json!({ "state": run.machine.state(), "error": &error }),
        );
        self.finish(run, WorkflowState::Failed, progress);
        WorkflowOutcome::Failed { error }
    }

    fn cancel_open_session(&mut self, run: &mut RunState, reason: &str) {
        let Some(session) = run.session.as_ref().filter(|s| !s.is_terminal()) else {
            return;
        };
        let mut cancelled = session.clone();
        if let Err(e) = cancelled.cancel(reason, Utc::now()) {
            warn!("Could not cancel consultation session: {}", e);
            return;
        }
        self.desk.release(cancelled.id());
        self.audit_best_effort(
            AuditEventKind::ConsultationCancelled,
            &json!({ "session_id": cancelled.id(), "reason": reason }),
        );
        if let Err(e) = self.commit_session(run, cancelled) {
            warn!("Could not store cancelled session: {}", e);
        }
    }

    /// Enter a terminal state. Audit failures are logged, not propagated.
    fn finish(
        &mut self,
        run: &mut RunState,
        to: WorkflowState,
        progress: &dyn WorkflowProgressNotifier,
    ) {
        let from = run.machine.state();
        if from.is_terminal() {
            return;
        }
        self.audit_best_effort(
            AuditEventKind::StateTransition,
            &json!({ "from": from, "to": to }),
        );
        if let Err(e) = run.machine.transition(to) {
            warn!("{}", e);
            return;
        }
        progress.on_state_change(from, to);
    }

    // ==================== Helpers ====================

    fn coordinator(&self) -> CoordinateAgentsUseCase {
        let params = self.config.params();
        let context = ContextAgent::new(Arc::clone(&self.retriever), params.retrieval_limit)
            .with_corpus_scope(params.corpus_scope.clone())
            .with_conversation_logger(Arc::clone(&self.logger));
        let research = ResearchAgent::new(Arc::clone(&self.gateway))
            .with_conversation_logger(Arc::clone(&self.logger));
        let sme = SmeAgent::new(Arc::clone(&self.gateway))
            .with_conversation_logger(Arc::clone(&self.logger));
        CoordinateAgentsUseCase::new(
            Arc::new(context),
            Arc::new(research),
            Arc::new(sme),
            params.agent_timeout,
        )
    }

    /// Audit, then move the state machine.
    fn transition(
        &mut self,
        run: &mut RunState,
        to: WorkflowState,
        progress: &dyn WorkflowProgressNotifier,
    ) -> Result<(), WorkflowError> {
        let from = run.machine.state();
        run.machine
            .check(to)
            .map_err(|e| WorkflowError::tool("workflow", e.to_string()))?;
        self.audit(
            Actor::Orchestrator,
            AuditEventKind::StateTransition,
            &json!({ "from": from, "to": to }),
        )?;
        run.machine
            .transition(to)
            .map_err(|e| WorkflowError::tool("workflow", e.to_string()))?;
        info!("State: {} -> {}", from, to);
        progress.on_state_change(from, to);
        Ok(())
    }

    /// Store an already-audited session state in the registry and the run.
    fn commit_session(
        &mut self,
        run: &mut RunState,
        next: ConsultationSession,
    ) -> Result<(), WorkflowError> {
        let slot = self.registry.get_mut(next.id()).map_err(escalation_error)?;
        *slot = next.clone();
        run.session = Some(next);
        Ok(())
    }

    fn audit<P: Serialize + ?Sized>(
        &mut self,
        actor: Actor,
        event_kind: AuditEventKind,
        payload: &P,
    ) -> Result<(), WorkflowError> {
        self.ledger
            .record(actor, event_kind, payload)
            .map(|_| ())
            .map_err(|e| WorkflowError::tool(AUDIT_TOOL, e.to_string()))
    }

    fn audit_best_effort<P: Serialize + ?Sized>(&mut self, event_kind: AuditEventKind, payload: &P) {
        if let Err(e) = self.ledger.record(Actor::Orchestrator, event_kind, payload) {
            warn!("Could not record {}: {}", event_kind, e);
        }
    }
}

fn escalation_error(error: SessionTransitionError) -> WorkflowError {
    WorkflowError::tool(ESCALATION_TOOL, error.to_string())
}
