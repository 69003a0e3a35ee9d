//! In-memory ConversationLog implementation.

use async_trait::async_trait;
use intervo_core::conversation::{ConversationLog, Turn};
use intervo_core::error::Result;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// An append-only turn log held in a process-local map.
///
/// Turns are stored in insertion order per session; `history` stable-sorts
/// by creation time so equal timestamps keep their append order.
#[derive(Default)]
pub struct MemoryConversationLog {
    turns: RwLock<HashMap<String, Vec<Turn>>>,
}

impl MemoryConversationLog {
    /// Creates a new empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationLog for MemoryConversationLog {
    async fn append(&self, turn: &Turn) -> Result<()> {
        let mut turns = self.turns.write().await;
        turns
            .entry(turn.session_id.clone())
            .or_default()
            .push(turn.clone());
        Ok(())
    }

    async fn history(&self, session_id: &str) -> Result<Vec<Turn>> {
        let turns = self.turns.read().await;
        let mut history = turns.get(session_id).cloned().unwrap_or_default();
        history.sort_by_key(|turn| turn.created_at);
        Ok(history)
    }

    async fn len(&self, session_id: &str) -> Result<usize> {
        let turns = self.turns.read().await;
        Ok(turns.get(session_id).map_or(0, Vec::len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intervo_core::conversation::TurnRole;

    #[tokio::test]
    async fn test_history_is_ordered_and_isolated_per_session() {
        let log = MemoryConversationLog::new();
        log.append(&Turn::new("s-1", TurnRole::Assistant, "q1"))
            .await
            .unwrap();
        log.append(&Turn::new("s-1", TurnRole::User, "a1"))
            .await
            .unwrap();
        log.append(&Turn::new("s-2", TurnRole::Assistant, "other"))
            .await
            .unwrap();

        let history = log.history("s-1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "q1");
        assert_eq!(history[1].content, "a1");
        assert!(history[0].created_at <= history[1].created_at);

        assert_eq!(log.len("s-2").await.unwrap(), 1);
        assert!(log.history("unknown").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_append_order() {
        let log = MemoryConversationLog::new();
        let mut first = Turn::new("s-1", TurnRole::Assistant, "first");
        let mut second = Turn::new("s-1", TurnRole::User, "second");
        let stamp = chrono::Utc::now();
        first.created_at = stamp;
        second.created_at = stamp;

        log.append(&first).await.unwrap();
        log.append(&second).await.unwrap();

        let history = log.history("s-1").await.unwrap();
        assert_eq!(history[0].content, "first");
        assert_eq!(history[1].content, "second");
    }
}
