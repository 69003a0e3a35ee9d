//! Gateway contracts.
//!
//! External capabilities (language model, speech) are consumed through these
//! narrow request/response traits. The orchestrator depends only on the
//! traits; providers live in the gateway crate.

pub mod prompt;

use crate::conversation::Turn;
use crate::error::Result;
use crate::session::{Difficulty, InterviewSession};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role context handed to the language model gateway with every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewContext {
    /// Role the candidate is interviewing for.
    pub job_role: String,
    /// Interview category, e.g. "Behavioral Round 1".
    pub interview_type: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Optional display label for the candidate.
    pub candidate_label: Option<String>,
}

impl InterviewContext {
    /// Derives the context from a session record.
    pub fn from_session(session: &InterviewSession) -> Self {
        Self {
            job_role: session.job_role.clone(),
            interview_type: session.interview_type.clone(),
            difficulty: session.difficulty,
            candidate_label: None,
        }
    }
}

/// One message in a model-ready chat payload.
///
/// This is the gateway wire shape, distinct from the persisted [`Turn`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user", or "assistant".
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Loosely-typed feedback as returned by a model, before sanitization.
///
/// `score` is an `f64` because models routinely return floats or values
/// outside [0, 100]; [`crate::session::Feedback::from_draft`] clamps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackDraft {
    pub summary: String,
    pub score: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default, alias = "areasForImprovement")]
    pub improvements: Vec<String>,
}

/// Capability interface for the interviewing language model.
///
/// All three operations may fail with `UpstreamUnavailable`; none may
/// partially succeed. Calls must be bounded by the provider's configured
/// timeouts; opening generation is allowed a materially longer budget
/// because first-call cold starts are expected.
#[async_trait]
pub trait LanguageModelGateway: Send + Sync {
    /// Produces the opening question for a fresh interview.
    async fn generate_opening(&self, context: &InterviewContext) -> Result<String>;

    /// Produces the next question given the full ordered history.
    async fn generate_next(&self, history: &[Turn], context: &InterviewContext) -> Result<String>;

    /// Produces structured feedback over the full transcript.
    async fn generate_feedback(&self, history: &[Turn]) -> Result<FeedbackDraft>;
}

/// Capability interface for speech input/output.
///
/// Used by the surrounding voice UI; the orchestrator's state machine is
/// agnostic to whether a turn's text came from typed input or from here.
#[async_trait]
pub trait SpeechGateway: Send + Sync {
    /// Converts audio into text.
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;

    /// Converts text into audio.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_draft_accepts_alias_field_name() {
        let json = r#"{
            "summary": "ok",
            "score": 70,
            "strengths": ["depth"],
            "areasForImprovement": ["brevity"]
        }"#;
        let draft: FeedbackDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.improvements, vec!["brevity".to_string()]);
        assert!((draft.score - 70.0).abs() < f64::EPSILON);
    }
}
