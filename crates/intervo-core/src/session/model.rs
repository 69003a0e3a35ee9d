//! Interview session domain model.
//!
//! This module contains the core `InterviewSession` entity and the closed
//! status enum whose `transition_to` method is the only way session status
//! ever changes.

use crate::error::{IntervoError, Result};
use crate::gateway::FeedbackDraft;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an interview session.
///
/// Exactly one of these holds at any time. Transitions go through
/// [`InterviewSession::transition_to`]; no other code writes status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Pre-booked by a scheduler, waiting for the candidate to begin.
    Scheduled,
    /// Opening-question generation is running in the background.
    Initializing,
    /// The interview is in progress.
    Active,
    /// Ended by an explicit end action; feedback is generated for this state.
    Completed,
    /// Administrative forced stop; no feedback is generated.
    Terminated,
    /// Opening-question generation failed.
    Failed,
    /// Wall-clock time ran out (lazy check, no background sweep).
    Expired,
    /// Superseded by a newer session for the same candidate.
    Abandoned,
}

impl SessionStatus {
    /// Whether this status is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Terminated | Self::Failed | Self::Expired | Self::Abandoned
        )
    }

    /// Whether the state machine permits moving from `self` to `next`.
    fn allows(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        match (self, next) {
            (Scheduled, Initializing) => true,
            // A scheduled session whose deadline passed before begin.
            (Scheduled, Expired) => true,
            (Initializing, Active) => true,
            (Initializing, Failed) => true,
            // Administrative recovery for a stuck initialization.
            (Initializing, Terminated) => true,
            (Active, Completed) => true,
            (Active, Terminated) => true,
            (Active, Expired) => true,
            (Active, Abandoned) => true,
            _ => false,
        }
    }

    /// Lowercase wire name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Initializing => "initializing",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Terminated => "terminated",
            Self::Failed => "failed",
            Self::Expired => "expired",
            Self::Abandoned => "abandoned",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty tier of an interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Junior,
    #[default]
    Mid,
    Senior,
}

/// The terminal state named by an explicit end action.
///
/// `Expired` and `Abandoned` are orchestrator-internal outcomes and cannot
/// be requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    Completed,
    Terminated,
}

impl EndReason {
    pub fn as_status(&self) -> SessionStatus {
        match self {
            Self::Completed => SessionStatus::Completed,
            Self::Terminated => SessionStatus::Terminated,
        }
    }
}

/// Structured feedback generated once per completed session.
///
/// Stored on the session, never appended to the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Free-form evaluation summary.
    pub summary: String,
    /// Overall score, always an integer in [0, 100].
    pub score: u8,
    /// Observed strengths.
    pub strengths: Vec<String>,
    /// Suggested areas for improvement.
    pub improvements: Vec<String>,
    /// When this feedback was generated.
    pub generated_at: DateTime<Utc>,
}

impl Feedback {
    /// Builds sanitized feedback from a gateway draft.
    ///
    /// The draft score is loosely typed because models routinely return
    /// floats or out-of-range values; it is rounded and clamped into
    /// [0, 100] here so invalid data is never persisted.
    pub fn from_draft(draft: FeedbackDraft) -> Self {
        let score = if draft.score.is_finite() {
            draft.score.round().clamp(0.0, 100.0) as u8
        } else {
            0
        };
        Self {
            summary: draft.summary,
            score,
            strengths: draft.strengths,
            improvements: draft.improvements,
            generated_at: Utc::now(),
        }
    }

    /// Zero-confidence placeholder used when the gateway returns a draft
    /// that cannot be parsed at all.
    pub fn placeholder() -> Self {
        Self {
            summary: "Feedback could not be generated for this session.".to_string(),
            score: 0,
            strengths: Vec::new(),
            improvements: Vec::new(),
            generated_at: Utc::now(),
        }
    }
}

/// A timestamped failure record kept on the session.
///
/// The poll protocol reads the most recent entry as the failure reason, so
/// initialization errors survive process memory and stay observable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// One interview attempt with its own identity, status, and context.
///
/// Conversation history lives in a separate append-only log keyed by
/// `id`; the session never embeds turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSession {
    /// Unique session identifier (UUID format).
    pub id: String,
    /// The candidate who owns this session.
    pub candidate_id: String,
    /// Who scheduled the session, if it was pre-booked.
    pub scheduled_by: Option<String>,
    /// Role the candidate is interviewing for, e.g. "Backend Engineer".
    pub job_role: String,
    /// Interview category, e.g. "Behavioral Round 1", "Technical Deep Dive".
    pub interview_type: String,
    /// Difficulty tier.
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Planned duration in minutes, measured from `started_at`.
    pub planned_minutes: u32,
    /// Hard deadline for a scheduled session to be begun, if any.
    pub deadline: Option<DateTime<Utc>>,
    /// Current lifecycle status.
    pub status: SessionStatus,
    /// When the session record was created.
    pub created_at: DateTime<Utc>,
    /// Set on entry to `Active`.
    pub started_at: Option<DateTime<Utc>>,
    /// Set on entry to any terminal state.
    pub ended_at: Option<DateTime<Utc>>,
    /// Present only after `Completed` (and possibly later, via retry).
    pub feedback: Option<Feedback>,
    /// Gateway/initialization failures recorded against this session.
    #[serde(default)]
    pub error_log: Vec<ErrorEntry>,
}

impl InterviewSession {
    /// Creates a pre-booked session in `Scheduled` status.
    pub fn new_scheduled(
        candidate_id: impl Into<String>,
        scheduled_by: impl Into<String>,
        job_role: impl Into<String>,
        interview_type: impl Into<String>,
        difficulty: Difficulty,
        planned_minutes: u32,
        deadline: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            candidate_id: candidate_id.into(),
            scheduled_by: Some(scheduled_by.into()),
            job_role: job_role.into(),
            interview_type: interview_type.into(),
            difficulty,
            planned_minutes,
            deadline,
            status: SessionStatus::Scheduled,
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
            feedback: None,
            error_log: Vec::new(),
        }
    }

    /// Creates an ad-hoc session that is already `Active`.
    ///
    /// The caller is responsible for appending the opening turn right after
    /// persisting this session, and for rolling the session back if that
    /// append fails, so that the two exist together or not at all.
    pub fn new_ad_hoc(
        candidate_id: impl Into<String>,
        job_role: impl Into<String>,
        interview_type: impl Into<String>,
        difficulty: Difficulty,
        planned_minutes: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            candidate_id: candidate_id.into(),
            scheduled_by: None,
            job_role: job_role.into(),
            interview_type: interview_type.into(),
            difficulty,
            planned_minutes,
            deadline: None,
            status: SessionStatus::Active,
            created_at: now,
            started_at: Some(now),
            ended_at: None,
            feedback: None,
            error_log: Vec::new(),
        }
    }

    /// The single authoritative status transition.
    ///
    /// Validates the edge against the state machine, then maintains the
    /// temporal markers: `started_at` on entry to `Active`, `ended_at` on
    /// entry to any terminal state.
    pub fn transition_to(&mut self, next: SessionStatus) -> Result<()> {
        if !self.status.allows(next) {
            return Err(IntervoError::invalid_state(
                &self.id,
                self.status.to_string(),
                format!("transition to '{}'", next),
            ));
        }
        self.status = next;
        let now = Utc::now();
        if next == SessionStatus::Active && self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if next.is_terminal() && self.ended_at.is_none() {
            self.ended_at = Some(now);
        }
        Ok(())
    }

    /// Records a failure against this session.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error_log.push(ErrorEntry {
            timestamp: Utc::now(),
            message: message.into(),
        });
    }

    /// The most recent recorded failure, if any.
    pub fn last_error(&self) -> Option<&ErrorEntry> {
        self.error_log.last()
    }

    /// Whether a scheduled session's deadline has passed.
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now > deadline)
    }

    /// Whether an active session has outlived its planned duration.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match (self.status, self.started_at) {
            (SessionStatus::Active, Some(started)) => {
                now - started > Duration::minutes(i64::from(self.planned_minutes))
            }
            _ => false,
        }
    }

    /// Elapsed interview duration in seconds, once both markers are set.
    pub fn duration_secs(&self) -> Option<i64> {
        match (self.started_at, self.ended_at) {
            (Some(started), Some(ended)) => Some((ended - started).num_seconds()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduled_session() -> InterviewSession {
        InterviewSession::new_scheduled(
            "candidate-1",
            "admin-1",
            "Backend Engineer",
            "Technical Deep Dive",
            Difficulty::Mid,
            30,
            None,
        )
    }

    #[test]
    fn test_scheduled_to_active_via_initializing() {
        let mut session = scheduled_session();
        session.transition_to(SessionStatus::Initializing).unwrap();
        assert!(session.started_at.is_none());
        session.transition_to(SessionStatus::Active).unwrap();
        assert_eq!(session.status, SessionStatus::Active);
        assert!(session.started_at.is_some());
        assert!(session.ended_at.is_none());
    }

    #[test]
    fn test_terminal_states_set_ended_at() {
        let mut session = scheduled_session();
        session.transition_to(SessionStatus::Initializing).unwrap();
        session.transition_to(SessionStatus::Failed).unwrap();
        assert!(session.status.is_terminal());
        assert!(session.ended_at.is_some());
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        let mut session = scheduled_session();
        // Cannot jump straight to active or completed from scheduled.
        assert!(session.transition_to(SessionStatus::Active).is_err());
        assert!(session.transition_to(SessionStatus::Completed).is_err());

        session.transition_to(SessionStatus::Initializing).unwrap();
        session.transition_to(SessionStatus::Active).unwrap();
        session.transition_to(SessionStatus::Completed).unwrap();
        // Terminal states are frozen.
        let err = session.transition_to(SessionStatus::Active).unwrap_err();
        assert!(err.is_invalid_state());
    }

    #[test]
    fn test_deadline_check() {
        let mut session = scheduled_session();
        let now = Utc::now();
        assert!(!session.is_past_deadline(now));
        session.deadline = Some(now - Duration::minutes(1));
        assert!(session.is_past_deadline(now));
        session.transition_to(SessionStatus::Expired).unwrap();
        assert_eq!(session.status, SessionStatus::Expired);
    }

    #[test]
    fn test_overdue_only_applies_to_active() {
        let mut session = scheduled_session();
        let now = Utc::now();
        assert!(!session.is_overdue(now));

        session.transition_to(SessionStatus::Initializing).unwrap();
        session.transition_to(SessionStatus::Active).unwrap();
        session.started_at = Some(now - Duration::minutes(31));
        assert!(session.is_overdue(now));
        session.transition_to(SessionStatus::Expired).unwrap();
        assert!(!session.is_overdue(now));
    }

    #[test]
    fn test_feedback_sanitization_clamps_score() {
        let draft = FeedbackDraft {
            summary: "Solid performance".to_string(),
            score: 172.4,
            strengths: vec!["clear communication".to_string()],
            improvements: vec![],
        };
        let feedback = Feedback::from_draft(draft);
        assert_eq!(feedback.score, 100);

        let draft = FeedbackDraft {
            summary: "n/a".to_string(),
            score: f64::NAN,
            strengths: vec![],
            improvements: vec![],
        };
        assert_eq!(Feedback::from_draft(draft).score, 0);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&SessionStatus::Initializing).unwrap();
        assert_eq!(json, "\"initializing\"");
        assert_eq!(SessionStatus::Abandoned.to_string(), "abandoned");
    }
}
