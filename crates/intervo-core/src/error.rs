//! Error types for the Intervo application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Intervo application.
///
/// The first six variants form the recoverable taxonomy surfaced to callers
/// of the orchestrator; the remaining variants cover ambient concerns
/// (storage, serialization) in the infrastructure layer. All variants are
/// recoverable and must never crash the process.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum IntervoError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The caller does not own the entity it is operating on
    #[error("Forbidden: caller does not own session '{id}'")]
    Forbidden { id: String },

    /// The operation is not legal from the session's current status
    #[error("Invalid state: cannot {operation} session '{id}' in status '{status}'")]
    InvalidState {
        id: String,
        status: String,
        operation: String,
    },

    /// Malformed caller input (e.g. an empty answer)
    #[error("Validation error: {0}")]
    Validation(String),

    /// An upstream gateway (language model, speech) failed or timed out
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// A concurrent-mutation race was lost
    #[error("Conflict: {0}")]
    Conflict(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntervoError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Forbidden error
    pub fn forbidden(id: impl Into<String>) -> Self {
        Self::Forbidden { id: id.into() }
    }

    /// Creates an InvalidState error
    pub fn invalid_state(
        id: impl Into<String>,
        status: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            id: id.into(),
            status: status.into(),
            operation: operation.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an UpstreamUnavailable error
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(message.into())
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an InvalidState error
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    /// Check if this is an UpstreamUnavailable error
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable(_))
    }

    /// Whether the caller may sensibly retry the failed operation.
    ///
    /// Upstream outages and lost races are transient; ownership, state, and
    /// validation failures are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable(_) | Self::Conflict(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for IntervoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for IntervoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for IntervoError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for IntervoError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, IntervoError>`.
pub type Result<T> = std::result::Result<T, IntervoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(IntervoError::upstream("gateway timed out").is_retryable());
        assert!(IntervoError::conflict("active session exists").is_retryable());
        assert!(!IntervoError::not_found("Session", "s-1").is_retryable());
        assert!(!IntervoError::forbidden("s-1").is_retryable());
        assert!(!IntervoError::validation("empty answer").is_retryable());
        assert!(!IntervoError::invalid_state("s-1", "completed", "submit_answer").is_retryable());
    }

    #[test]
    fn test_display_includes_context() {
        let err = IntervoError::invalid_state("s-1", "scheduled", "submit_answer");
        let message = err.to_string();
        assert!(message.contains("s-1"));
        assert!(message.contains("scheduled"));
        assert!(message.contains("submit_answer"));
    }
}
