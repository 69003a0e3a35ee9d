//! TOML-based SessionRepository implementation.

use async_trait::async_trait;
use intervo_core::error::{IntervoError, Result};
use intervo_core::session::{InterviewSession, SessionRepository, SessionStatus};
use std::fs;
use std::path::{Path, PathBuf};

/// A repository implementation storing each session as a TOML file.
///
/// ```text
/// base_dir/
/// └── sessions/
///     ├── session-id-1.toml
///     └── session-id-2.toml
/// ```
///
/// Like the in-memory implementation, saving a second active session for a
/// candidate fails with `Conflict`.
pub struct TomlSessionRepository {
    base_dir: PathBuf,
}

impl TomlSessionRepository {
    /// Creates a new `TomlSessionRepository` with the specified base
    /// directory, creating the directory structure if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory structure cannot be created.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(base_dir.join("sessions"))?;
        Ok(Self { base_dir })
    }

    /// Creates a repository at the default location (`~/.intervo`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// directory structure cannot be created.
    pub fn default_location() -> Result<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| IntervoError::io("Failed to get home directory"))?;
        Self::new(home_dir.join(".intervo"))
    }

    /// Returns the file path for a given session ID.
    fn session_file_path(&self, session_id: &str) -> PathBuf {
        self.base_dir
            .join("sessions")
            .join(format!("{}.toml", session_id))
    }

    fn read_session(&self, path: &Path) -> Result<InterviewSession> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}

#[async_trait]
impl SessionRepository for TomlSessionRepository {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<InterviewSession>> {
        let path = self.session_file_path(session_id);
        if !path.exists() {
            return Ok(None);
        }
        self.read_session(&path).map(Some)
    }

    async fn save(&self, session: &InterviewSession) -> Result<()> {
        if session.status == SessionStatus::Active {
            let existing = self.find_active_by_candidate(&session.candidate_id).await?;
            if let Some(other) = existing
                && other.id != session.id
            {
                return Err(IntervoError::conflict(format!(
                    "candidate '{}' already has an active session",
                    session.candidate_id
                )));
            }
        }
        let text = toml::to_string(session)?;
        fs::write(self.session_file_path(&session.id), text)?;
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let path = self.session_file_path(session_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<InterviewSession>> {
        let sessions_dir = self.base_dir.join("sessions");
        let mut sessions = Vec::new();
        for entry in fs::read_dir(&sessions_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                match self.read_session(&path) {
                    Ok(session) => sessions.push(session),
                    Err(e) => {
                        tracing::warn!(
                            "[TomlSessionRepository] Skipping unreadable session file {}: {}",
                            path.display(),
                            e
                        );
                    }
                }
            }
        }
        Ok(sessions)
    }

    async fn find_active_by_candidate(
        &self,
        candidate_id: &str,
    ) -> Result<Option<InterviewSession>> {
        let sessions = self.list_all().await?;
        Ok(sessions
            .into_iter()
            .find(|s| s.candidate_id == candidate_id && s.status == SessionStatus::Active))
    }

    async fn list_by_candidate_and_status(
        &self,
        candidate_id: &str,
        status: SessionStatus,
    ) -> Result<Vec<InterviewSession>> {
        let sessions = self.list_all().await?;
        let mut matching: Vec<InterviewSession> = sessions
            .into_iter()
            .filter(|s| s.candidate_id == candidate_id && s.status == status)
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}
