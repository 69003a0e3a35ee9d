//! In-memory SessionRepository implementation.

use async_trait::async_trait;
use intervo_core::error::{IntervoError, Result};
use intervo_core::session::{InterviewSession, SessionRepository, SessionStatus};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A repository implementation holding sessions in a process-local map.
///
/// Used by tests and by embedders that do not need durability. Enforces the
/// (candidate, active) uniqueness constraint: saving a second active session
/// for the same candidate fails with `Conflict`.
#[derive(Default)]
pub struct MemorySessionRepository {
    sessions: RwLock<HashMap<String, InterviewSession>>,
}

impl MemorySessionRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<InterviewSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn save(&self, session: &InterviewSession) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if session.status == SessionStatus::Active {
            let violation = sessions.values().any(|other| {
                other.id != session.id
                    && other.candidate_id == session.candidate_id
                    && other.status == SessionStatus::Active
            });
            if violation {
                return Err(IntervoError::conflict(format!(
                    "candidate '{}' already has an active session",
                    session.candidate_id
                )));
            }
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<InterviewSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.values().cloned().collect())
    }

    async fn find_active_by_candidate(
        &self,
        candidate_id: &str,
    ) -> Result<Option<InterviewSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .find(|s| s.candidate_id == candidate_id && s.status == SessionStatus::Active)
            .cloned())
    }

    async fn list_by_candidate_and_status(
        &self,
        candidate_id: &str,
        status: SessionStatus,
    ) -> Result<Vec<InterviewSession>> {
        let sessions = self.sessions.read().await;
        let mut matching: Vec<InterviewSession> = sessions
            .values()
            .filter(|s| s.candidate_id == candidate_id && s.status == status)
            .cloned()
            .collect();
        // Most recently created first.
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intervo_core::session::Difficulty;

    fn active_session(candidate: &str) -> InterviewSession {
        InterviewSession::new_ad_hoc(candidate, "Backend Engineer", "Technical", Difficulty::Mid, 30)
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = MemorySessionRepository::new();
        let session = active_session("candidate-1");
        repo.save(&session).await.unwrap();

        let found = repo.find_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(found, session);
        assert!(repo.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_active_uniqueness_enforced() {
        let repo = MemorySessionRepository::new();
        repo.save(&active_session("candidate-1")).await.unwrap();

        let second = active_session("candidate-1");
        let err = repo.save(&second).await.unwrap_err();
        assert!(err.is_retryable());

        // A different candidate is unaffected.
        repo.save(&active_session("candidate-2")).await.unwrap();
    }

    #[tokio::test]
    async fn test_resaving_same_active_session_is_allowed() {
        let repo = MemorySessionRepository::new();
        let mut session = active_session("candidate-1");
        repo.save(&session).await.unwrap();
        session.job_role = "Platform Engineer".to_string();
        repo.save(&session).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_active_by_candidate() {
        let repo = MemorySessionRepository::new();
        let session = active_session("candidate-1");
        repo.save(&session).await.unwrap();

        let found = repo
            .find_active_by_candidate("candidate-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, session.id);
        assert!(
            repo.find_active_by_candidate("candidate-2")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_by_candidate_and_status_sorted_recent_first() {
        let repo = MemorySessionRepository::new();
        let mut older = InterviewSession::new_scheduled(
            "candidate-1",
            "admin-1",
            "Backend Engineer",
            "Behavioral",
            Difficulty::Mid,
            30,
            None,
        );
        older.created_at -= chrono::Duration::hours(1);
        let newer = InterviewSession::new_scheduled(
            "candidate-1",
            "admin-1",
            "Backend Engineer",
            "Technical",
            Difficulty::Mid,
            30,
            None,
        );
        repo.save(&older).await.unwrap();
        repo.save(&newer).await.unwrap();

        let scheduled = repo
            .list_by_candidate_and_status("candidate-1", SessionStatus::Scheduled)
            .await
            .unwrap();
        assert_eq!(scheduled.len(), 2);
        assert_eq!(scheduled[0].id, newer.id);
        assert_eq!(scheduled[1].id, older.id);
    }
}
