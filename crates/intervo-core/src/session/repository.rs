//! Session repository trait.
//!
//! Defines the interface for session persistence operations.

use super::model::{InterviewSession, SessionStatus};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for managing interview session persistence.
///
/// This trait defines the contract for persisting and retrieving sessions,
/// decoupling the orchestrator from the specific storage mechanism (in-memory
/// map, TOML files, database).
///
/// # Implementation Notes
///
/// Implementations should enforce the (candidate, active) uniqueness
/// constraint: saving a second `Active` session for the same candidate must
/// fail with `Conflict`. The orchestrator is the only writer; external
/// readers may call the query methods freely.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(session))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<InterviewSession>>;

    /// Saves a session to storage, inserting or replacing by id.
    async fn save(&self, session: &InterviewSession) -> Result<()>;

    /// Deletes a session from storage. Deleting a missing session is not an
    /// error.
    async fn delete(&self, session_id: &str) -> Result<()>;

    /// Lists all stored sessions.
    async fn list_all(&self) -> Result<Vec<InterviewSession>>;

    /// Finds the candidate's currently active session, if any.
    ///
    /// At most one can exist at any observation point.
    async fn find_active_by_candidate(
        &self,
        candidate_id: &str,
    ) -> Result<Option<InterviewSession>>;

    /// Lists the candidate's sessions in the given status, most recently
    /// created first.
    async fn list_by_candidate_and_status(
        &self,
        candidate_id: &str,
        status: SessionStatus,
    ) -> Result<Vec<InterviewSession>>;
}
