//! TOML-based ConversationLog implementation.

use async_trait::async_trait;
use intervo_core::conversation::{ConversationLog, Turn};
use intervo_core::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// On-disk shape of one session's turn log.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TurnLogFile {
    #[serde(default)]
    turns: Vec<Turn>,
}

/// An append-only turn log storing one TOML file per session.
///
/// ```text
/// base_dir/
/// └── conversations/
///     ├── session-id-1.toml
///     └── session-id-2.toml
/// ```
///
/// Appends are serialized behind a single mutex so two concurrent appends
/// never lose a read-modify-write race on the same file.
pub struct TomlConversationLog {
    base_dir: PathBuf,
    write_guard: Mutex<()>,
}

impl TomlConversationLog {
    /// Creates a new `TomlConversationLog` with the specified base
    /// directory, creating the directory structure if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory structure cannot be created.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(base_dir.join("conversations"))?;
        Ok(Self {
            base_dir,
            write_guard: Mutex::new(()),
        })
    }

    /// Returns the file path for a given session ID.
    fn log_file_path(&self, session_id: &str) -> PathBuf {
        self.base_dir
            .join("conversations")
            .join(format!("{}.toml", session_id))
    }

    fn load(&self, session_id: &str) -> Result<TurnLogFile> {
        let path = self.log_file_path(session_id);
        if !path.exists() {
            return Ok(TurnLogFile::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}

#[async_trait]
impl ConversationLog for TomlConversationLog {
    async fn append(&self, turn: &Turn) -> Result<()> {
        let _guard = self.write_guard.lock().await;
        let mut log = self.load(&turn.session_id)?;
        log.turns.push(turn.clone());
        let text = toml::to_string(&log)?;
        fs::write(self.log_file_path(&turn.session_id), text)?;
        Ok(())
    }

    async fn history(&self, session_id: &str) -> Result<Vec<Turn>> {
        let mut turns = self.load(session_id)?.turns;
        turns.sort_by_key(|turn| turn.created_at);
        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intervo_core::conversation::TurnRole;

    #[tokio::test]
    async fn test_append_persists_and_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = TomlConversationLog::new(dir.path()).unwrap();

        log.append(&Turn::new("s-1", TurnRole::Assistant, "Welcome. First question?"))
            .await
            .unwrap();
        log.append(&Turn::new("s-1", TurnRole::User, "My answer."))
            .await
            .unwrap();

        // Re-open to prove the turns survived the process-local state.
        let reopened = TomlConversationLog::new(dir.path()).unwrap();
        let history = reopened.history("s-1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, TurnRole::Assistant);
        assert_eq!(history[1].content, "My answer.");
        assert_eq!(reopened.len("s-1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_session_has_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let log = TomlConversationLog::new(dir.path()).unwrap();
        assert!(log.history("unknown").await.unwrap().is_empty());
    }
}
