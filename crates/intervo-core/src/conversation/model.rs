//! Conversation turn types.
//!
//! A turn is one message in a session's ordered history. Turns are immutable
//! once written; history is exclusively extended, never edited or reordered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the role of a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The candidate.
    User,
    /// The AI interviewer.
    Assistant,
    /// Orchestration note, not shown to either party by default.
    System,
}

/// A single turn in a session's conversation history.
///
/// `created_at` is the sole ordering key when reconstructing history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Unique turn identifier (UUID format).
    pub id: String,
    /// The session this turn belongs to.
    pub session_id: String,
    /// Who produced the turn.
    pub role: TurnRole,
    /// Free-form message text.
    pub content: String,
    /// When the turn was created.
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Creates a new turn stamped with the current time.
    pub fn new(session_id: impl Into<String>, role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TurnRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_new_turn_has_unique_id() {
        let a = Turn::new("s-1", TurnRole::User, "hello");
        let b = Turn::new("s-1", TurnRole::User, "hello");
        assert_ne!(a.id, b.id);
        assert_eq!(a.session_id, "s-1");
    }
}
