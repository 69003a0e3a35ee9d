//! Conversation log trait.
//!
//! The log is append-only: append is the only mutation, and reads always
//! return the full ordered sequence for a session.

use super::model::Turn;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract append-only log of conversation turns, keyed by session id.
///
/// Sessions reference their history by id only; turns are never embedded in
/// the session record. Implementations must return history in ascending
/// creation-time order, with insertion order as the tiebreak.
#[async_trait]
pub trait ConversationLog: Send + Sync {
    /// Appends a turn to its session's history.
    async fn append(&self, turn: &Turn) -> Result<()>;

    /// Returns the full ordered history for a session.
    ///
    /// An unknown session id yields an empty history, not an error.
    async fn history(&self, session_id: &str) -> Result<Vec<Turn>>;

    /// Number of turns recorded for a session.
    async fn len(&self, session_id: &str) -> Result<usize> {
        Ok(self.history(session_id).await?.len())
    }
}
