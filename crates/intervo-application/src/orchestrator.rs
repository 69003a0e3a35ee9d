//! Interview session lifecycle orchestration.
//!
//! `InterviewOrchestrator` owns the session state machine and the
//! turn-taking protocol: begin/poll initialization, ad-hoc starts with
//! supersession, answer submission, ending with feedback generation, and
//! lazy expiry. It is the only writer of session status and feedback, and
//! the turn-append paths here are the only writers of the conversation log.

use crate::locks::LockRegistry;
use crate::updater::SessionUpdater;
use intervo_core::conversation::{ConversationLog, Turn, TurnRole};
use intervo_core::error::{IntervoError, Result};
use intervo_core::gateway::{InterviewContext, LanguageModelGateway};
use intervo_core::session::{
    Difficulty, EndReason, Feedback, InterviewSession, SessionRepository, SessionStatus,
};
use chrono::Utc;
use std::sync::Arc;

/// Parameters for an ad-hoc session start.
#[derive(Debug, Clone)]
pub struct StartAdHocRequest {
    pub job_role: String,
    pub interview_type: String,
    pub difficulty: Difficulty,
    pub planned_minutes: u32,
}

impl StartAdHocRequest {
    pub fn new(job_role: impl Into<String>, interview_type: impl Into<String>) -> Self {
        Self {
            job_role: job_role.into(),
            interview_type: interview_type.into(),
            difficulty: Difficulty::default(),
            planned_minutes: 20,
        }
    }
}

/// Result of polling an asynchronous initialization.
///
/// Polling is a pure read of session status; repeated calls never mutate
/// state.
#[derive(Debug, Clone)]
pub enum InitializationPoll {
    /// Opening-question generation is still running; retry after a backoff.
    Pending,
    /// The session is active; the opening turn is in the history.
    Ready {
        session: InterviewSession,
        history: Vec<Turn>,
    },
    /// Initialization failed; retry is a fresh begin/start, not automatic.
    Failed { reason: String },
}

/// Use case coordinating sessions, the conversation log, and the language
/// model gateway.
///
/// # Thread Safety
///
/// Invoked from many concurrent request handlers. The registry in `locks`
/// provides one mutex per session id (and per candidate id for ad-hoc
/// supersession); the critical section "append user turn → read history →
/// append assistant turn" runs entirely under the session's lock. Operations
/// on different sessions never contend.
pub struct InterviewOrchestrator {
    /// Repository for session records
    sessions: Arc<dyn SessionRepository>,
    /// Append-only conversation history
    log: Arc<dyn ConversationLog>,
    /// The interviewing language model
    gateway: Arc<dyn LanguageModelGateway>,
    /// Load-mutate-save helper; all status writes go through it
    updater: SessionUpdater,
    /// Per-session locks
    session_locks: LockRegistry,
    /// Per-candidate locks for ad-hoc supersession
    candidate_locks: LockRegistry,
}

impl InterviewOrchestrator {
    /// Creates a new `InterviewOrchestrator`.
    ///
    /// # Arguments
    ///
    /// * `sessions` - Repository for session records
    /// * `log` - Append-only conversation log
    /// * `gateway` - Language model gateway
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        log: Arc<dyn ConversationLog>,
        gateway: Arc<dyn LanguageModelGateway>,
    ) -> Self {
        Self {
            updater: SessionUpdater::new(sessions.clone()),
            sessions,
            log,
            gateway,
            session_locks: LockRegistry::new(),
            candidate_locks: LockRegistry::new(),
        }
    }

    // ========================================================================
    // Initialization protocol (begin / poll)
    // ========================================================================

    /// Begins a scheduled session.
    ///
    /// Transitions `Scheduled → Initializing` synchronously, then runs
    /// opening-question generation as a detached single-shot task; callers
    /// learn the outcome through [`Self::poll_status`]. A session whose
    /// deadline has passed is frozen as `Expired` and the call fails
    /// explaining it is no longer startable.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden`, `InvalidState` (not `Scheduled`, or past
    /// deadline). A second begin on a session already `Initializing` is
    /// rejected here, never queued.
    pub async fn begin(self: &Arc<Self>, session_id: &str, caller_id: &str) -> Result<()> {
        let _guard = self.session_locks.acquire(session_id).await;
        let session = self.load_owned(session_id, caller_id).await?;

        if session.status == SessionStatus::Scheduled && session.is_past_deadline(Utc::now()) {
            self.updater
                .update(session_id, |s| s.transition_to(SessionStatus::Expired))
                .await?;
            tracing::info!(
                "[InterviewOrchestrator] Session {} expired before begin",
                session_id
            );
            return Err(IntervoError::invalid_state(
                session_id,
                SessionStatus::Expired.to_string(),
                "begin (deadline has passed; the session is no longer startable)",
            ));
        }

        if session.status != SessionStatus::Scheduled {
            return Err(IntervoError::invalid_state(
                session_id,
                session.status.to_string(),
                "begin",
            ));
        }

        self.updater
            .update(session_id, |s| s.transition_to(SessionStatus::Initializing))
            .await?;
        tracing::info!(
            "[InterviewOrchestrator] Session {} initializing, spawning opening generation",
            session_id
        );

        let orchestrator = Arc::clone(self);
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            orchestrator.run_initialization(&session_id).await;
        });

        Ok(())
    }

    /// The detached, single-shot initialization task.
    ///
    /// Not retried: on gateway failure the session goes straight to
    /// `Failed` and recovery is a user-initiated fresh begin/start. The
    /// result is applied under the session lock and only if the session is
    /// still `Initializing`, so an administrative termination that raced
    /// the generation wins.
    async fn run_initialization(&self, session_id: &str) {
        let opening = match self.sessions.find_by_id(session_id).await {
            Ok(Some(session)) => {
                let context = InterviewContext::from_session(&session);
                self.gateway.generate_opening(&context).await
            }
            Ok(None) => {
                tracing::error!(
                    "[InterviewOrchestrator] Session {} vanished during initialization",
                    session_id
                );
                return;
            }
            Err(e) => {
                tracing::error!(
                    "[InterviewOrchestrator] Failed to load session {} for initialization: {}",
                    session_id,
                    e
                );
                return;
            }
        };

        let _guard = self.session_locks.acquire(session_id).await;
        let still_initializing = matches!(
            self.sessions.find_by_id(session_id).await,
            Ok(Some(s)) if s.status == SessionStatus::Initializing
        );
        if !still_initializing {
            tracing::warn!(
                "[InterviewOrchestrator] Session {} left initializing while opening was generated, discarding result",
                session_id
            );
            return;
        }

        let outcome = match opening {
            Ok(question) => {
                let turn = Turn::new(session_id, TurnRole::Assistant, question);
                match self.log.append(&turn).await {
                    Ok(()) => {
                        self.updater
                            .update(session_id, |s| s.transition_to(SessionStatus::Active))
                            .await
                            .map(|_| ())
                    }
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            tracing::error!(
                "[InterviewOrchestrator] Initialization of session {} failed: {}",
                session_id,
                e
            );
            let message = e.to_string();
            let result = self
                .updater
                .update(session_id, |s| {
                    s.record_error(message.clone());
                    s.transition_to(SessionStatus::Failed)
                })
                .await;
            if let Err(e) = result {
                tracing::error!(
                    "[InterviewOrchestrator] Could not mark session {} failed: {}",
                    session_id,
                    e
                );
            }
        } else {
            tracing::info!(
                "[InterviewOrchestrator] Session {} is active",
                session_id
            );
        }
    }

    /// Polls the outcome of an asynchronous initialization.
    ///
    /// Pure read; performs no state mutation and is safe to call
    /// repeatedly. Client-side backoff and attempt bounding are the
    /// caller's concern.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden`, `InvalidState` when the session was never
    /// begun (still `Scheduled`) or already left the initialization
    /// protocol (terminal states other than `Failed`).
    pub async fn poll_status(
        &self,
        session_id: &str,
        caller_id: &str,
    ) -> Result<InitializationPoll> {
        let session = self.load_owned(session_id, caller_id).await?;
        match session.status {
            SessionStatus::Initializing => Ok(InitializationPoll::Pending),
            SessionStatus::Active => {
                let history = self.log.history(session_id).await?;
                Ok(InitializationPoll::Ready { session, history })
            }
            SessionStatus::Failed => {
                let reason = session
                    .last_error()
                    .map(|entry| entry.message.clone())
                    .unwrap_or_else(|| "initialization failed".to_string());
                Ok(InitializationPoll::Failed { reason })
            }
            status => Err(IntervoError::invalid_state(
                session_id,
                status.to_string(),
                "poll_status",
            )),
        }
    }

    // ========================================================================
    // Ad-hoc start
    // ========================================================================

    /// Starts an ad-hoc session, superseding any active one.
    ///
    /// Runs under the candidate's lock so the single-active invariant holds
    /// even under concurrent calls: any existing active session is
    /// transitioned to `Abandoned` first. The opening question is requested
    /// synchronously; on gateway failure nothing is persisted, and if the
    /// opening turn cannot be appended the just-saved session is deleted
    /// again, so the session and its opening turn exist together or not at
    /// all.
    ///
    /// # Returns
    ///
    /// The created active session and its opening turn.
    pub async fn start_ad_hoc(
        &self,
        candidate_id: &str,
        request: StartAdHocRequest,
    ) -> Result<(InterviewSession, Turn)> {
        if request.job_role.trim().is_empty() || request.interview_type.trim().is_empty() {
            return Err(IntervoError::validation(
                "Job role and interview type are required",
            ));
        }

        let _guard = self.candidate_locks.acquire(candidate_id).await;

        // Supersession: abandon any pre-existing active session.
        if let Some(active) = self.sessions.find_active_by_candidate(candidate_id).await? {
            tracing::info!(
                "[InterviewOrchestrator] Superseding active session {} for candidate {}",
                active.id,
                candidate_id
            );
            self.updater
                .update(&active.id, |s| s.transition_to(SessionStatus::Abandoned))
                .await?;
        }

        let context = InterviewContext {
            job_role: request.job_role.clone(),
            interview_type: request.interview_type.clone(),
            difficulty: request.difficulty,
            candidate_label: None,
        };
        let question = self.gateway.generate_opening(&context).await?;

        let session = InterviewSession::new_ad_hoc(
            candidate_id,
            request.job_role,
            request.interview_type,
            request.difficulty,
            request.planned_minutes,
        );
        self.sessions.save(&session).await?;
        let turn = Turn::new(&session.id, TurnRole::Assistant, question);
        if let Err(e) = self.log.append(&turn).await {
            tracing::error!(
                "[InterviewOrchestrator] Could not append opening turn for session {}, rolling back: {}",
                session.id,
                e
            );
            if let Err(delete_err) = self.sessions.delete(&session.id).await {
                tracing::error!(
                    "[InterviewOrchestrator] Rollback of session {} failed: {}",
                    session.id,
                    delete_err
                );
            }
            return Err(e);
        }

        tracing::info!(
            "[InterviewOrchestrator] Ad-hoc session {} started for candidate {}",
            session.id,
            candidate_id
        );
        Ok((session, turn))
    }

    // ========================================================================
    // Turn taking
    // ========================================================================

    /// Submits a candidate answer and returns the interviewer's next turn.
    ///
    /// Under the session's lock: appends the `User` turn, reads back the
    /// full ordered history, requests the follow-up, appends and returns
    /// the `Assistant` turn. A gateway failure leaves the user turn
    /// persisted — no candidate input is ever lost — and surfaces as a
    /// retryable `UpstreamUnavailable`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden`, `InvalidState` (not `Active`, including a
    /// session that just lazily expired), `Validation` (empty text),
    /// `UpstreamUnavailable`.
    pub async fn submit_answer(
        &self,
        session_id: &str,
        caller_id: &str,
        text: &str,
    ) -> Result<Turn> {
        if text.trim().is_empty() {
            return Err(IntervoError::validation("Answer text is required"));
        }

        let _guard = self.session_locks.acquire(session_id).await;
        let session = self.load_owned(session_id, caller_id).await?;
        let session = self.refresh_expiry(session).await?;

        if session.status != SessionStatus::Active {
            return Err(IntervoError::invalid_state(
                session_id,
                session.status.to_string(),
                "submit_answer",
            ));
        }

        let user_turn = Turn::new(session_id, TurnRole::User, text);
        self.log.append(&user_turn).await?;

        // Read-after-write so the model always sees the answer just given.
        let history = self.log.history(session_id).await?;
        let context = InterviewContext::from_session(&session);

        let question = self.gateway.generate_next(&history, &context).await?;

        let assistant_turn = Turn::new(session_id, TurnRole::Assistant, question);
        self.log.append(&assistant_turn).await?;
        tracing::debug!(
            "[InterviewOrchestrator] Session {} exchanged turn pair ({} turns total)",
            session_id,
            history.len() + 1
        );
        Ok(assistant_turn)
    }

    // ========================================================================
    // Ending and feedback
    // ========================================================================

    /// Ends an active session.
    ///
    /// Transitions to the terminal state named by `reason` and sets
    /// `ended_at`. For `Completed`, feedback is generated synchronously
    /// over the full transcript — but a gateway failure never blocks the
    /// transition: the session still completes, the failure is recorded in
    /// its error log, and [`Self::regenerate_feedback`] can retry later.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden`, `InvalidState` (not `Active`).
    pub async fn end(
        &self,
        session_id: &str,
        caller_id: &str,
        reason: EndReason,
    ) -> Result<InterviewSession> {
        let _guard = self.session_locks.acquire(session_id).await;
        let session = self.load_owned(session_id, caller_id).await?;
        let session = self.refresh_expiry(session).await?;

        if session.status != SessionStatus::Active {
            return Err(IntervoError::invalid_state(
                session_id,
                session.status.to_string(),
                "end",
            ));
        }

        let mut session = self
            .updater
            .update(session_id, |s| s.transition_to(reason.as_status()))
            .await?;
        tracing::info!(
            "[InterviewOrchestrator] Session {} ended as {}",
            session_id,
            session.status
        );

        if reason == EndReason::Completed {
            session = self.generate_and_store_feedback(session).await?;
        }
        Ok(session)
    }

    /// Retries feedback generation for a completed session that has none.
    ///
    /// Idempotent: a session that already carries feedback is returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden`, `InvalidState` (not `Completed`),
    /// `UpstreamUnavailable` when the gateway is still down.
    pub async fn regenerate_feedback(
        &self,
        session_id: &str,
        caller_id: &str,
    ) -> Result<InterviewSession> {
        let _guard = self.session_locks.acquire(session_id).await;
        let session = self.load_owned(session_id, caller_id).await?;

        if session.status != SessionStatus::Completed {
            return Err(IntervoError::invalid_state(
                session_id,
                session.status.to_string(),
                "regenerate_feedback",
            ));
        }
        if session.feedback.is_some() {
            return Ok(session);
        }

        let history = self.log.history(session_id).await?;
        let feedback = match self.gateway.generate_feedback(&history).await {
            Ok(draft) => Feedback::from_draft(draft),
            Err(IntervoError::Serialization { .. }) => Feedback::placeholder(),
            Err(e) => return Err(e),
        };
        self.updater
            .update(session_id, |s| {
                s.feedback = Some(feedback.clone());
                Ok(())
            })
            .await
    }

    /// Generates feedback after the `Completed` transition has been saved.
    ///
    /// An unparsable draft becomes the zero-confidence placeholder; an
    /// unreachable gateway leaves feedback absent and records the failure.
    /// Either way the completed session is returned, never an error.
    async fn generate_and_store_feedback(
        &self,
        session: InterviewSession,
    ) -> Result<InterviewSession> {
        let history = self.log.history(&session.id).await?;
        match self.gateway.generate_feedback(&history).await {
            Ok(draft) => {
                let feedback = Feedback::from_draft(draft);
                self.updater
                    .update(&session.id, |s| {
                        s.feedback = Some(feedback.clone());
                        Ok(())
                    })
                    .await
            }
            Err(IntervoError::Serialization { format, message }) => {
                tracing::warn!(
                    "[InterviewOrchestrator] Session {} feedback draft unparsable ({}): {}",
                    session.id,
                    format,
                    message
                );
                let feedback = Feedback::placeholder();
                self.updater
                    .update(&session.id, |s| {
                        s.feedback = Some(feedback.clone());
                        Ok(())
                    })
                    .await
            }
            Err(e) => {
                tracing::warn!(
                    "[InterviewOrchestrator] Session {} feedback generation failed: {}",
                    session.id,
                    e
                );
                let message = e.to_string();
                self.updater
                    .update(&session.id, |s| {
                        s.record_error(message.clone());
                        Ok(())
                    })
                    .await
            }
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Returns a session and its full ordered history.
    ///
    /// Applies the lazy expiry check, so an overdue active session is
    /// observed as `Expired` from here on.
    pub async fn get_session(
        &self,
        session_id: &str,
        caller_id: &str,
    ) -> Result<(InterviewSession, Vec<Turn>)> {
        let session = self.load_owned(session_id, caller_id).await?;
        let session = self.refresh_expiry(session).await?;
        let history = self.log.history(session_id).await?;
        Ok((session, history))
    }

    /// Lists the candidate's scheduled sessions, most recent first.
    pub async fn list_scheduled(&self, candidate_id: &str) -> Result<Vec<InterviewSession>> {
        self.sessions
            .list_by_candidate_and_status(candidate_id, SessionStatus::Scheduled)
            .await
    }

    /// Lists the candidate's completed sessions, most recent first.
    pub async fn list_completed(&self, candidate_id: &str) -> Result<Vec<InterviewSession>> {
        self.sessions
            .list_by_candidate_and_status(candidate_id, SessionStatus::Completed)
            .await
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Loads a session and verifies the caller owns it.
    async fn load_owned(&self, session_id: &str, caller_id: &str) -> Result<InterviewSession> {
        let session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| IntervoError::not_found("Session", session_id))?;
        if session.candidate_id != caller_id {
            return Err(IntervoError::forbidden(session_id));
        }
        Ok(session)
    }

    /// Lazy expiry: flips an overdue active session to `Expired` on access.
    ///
    /// There is no background sweep; a session past its planned duration
    /// stays nominally active until the next access lands here.
    async fn refresh_expiry(&self, session: InterviewSession) -> Result<InterviewSession> {
        if session.is_overdue(Utc::now()) {
            tracing::info!(
                "[InterviewOrchestrator] Session {} exceeded its planned duration, expiring",
                session.id
            );
            return self
                .updater
                .update(&session.id, |s| s.transition_to(SessionStatus::Expired))
                .await;
        }
        Ok(session)
    }
}
