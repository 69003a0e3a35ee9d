//! Session updater helper for common update patterns.
//!
//! This module provides `SessionUpdater` which abstracts the common
//! "find → update → save" pattern used across session state operations.

use intervo_core::error::{IntervoError, Result};
use intervo_core::session::{InterviewSession, SessionRepository};
use std::sync::Arc;

/// Helper struct for updating sessions with a common pattern.
///
/// `SessionUpdater` encapsulates the common pattern of:
/// 1. Loading a session from storage
/// 2. Applying updates
/// 3. Saving back to storage
///
/// All orchestrator status writes funnel through this helper and
/// `InterviewSession::transition_to`, which keeps the state machine the
/// single writer of session status.
pub struct SessionUpdater {
    repository: Arc<dyn SessionRepository>,
}

impl SessionUpdater {
    /// Creates a new `SessionUpdater` with the given repository.
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// Updates a session by applying the given updater function and returns
    /// the updated record.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The session doesn't exist
    /// - The updater function returns an error
    /// - Saving to storage fails
    pub async fn update<F>(&self, session_id: &str, updater: F) -> Result<InterviewSession>
    where
        F: FnOnce(&mut InterviewSession) -> Result<()>,
    {
        tracing::debug!(
            "[SessionUpdater] update() called for session_id: {}",
            session_id
        );

        let mut session = self
            .repository
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| IntervoError::not_found("Session", session_id))?;

        updater(&mut session)?;

        self.repository.save(&session).await?;
        tracing::debug!(
            "[SessionUpdater] Session saved: id={}, status={}",
            session.id,
            session.status
        );

        Ok(session)
    }
}
