//! # Errors
//!
//! Error taxonomy shared by the state layer and the model collaborators.

use thiserror::Error;

/// Result alias used throughout the core
pub type LabResult<T> = Result<T, LabError>;

/// Everything that can go wrong inside PromptLab
#[derive(Debug, Error)]
pub enum LabError {
    /// The hosted model call itself failed (network, auth, rate limit)
    #[error("provider error: {0}")]
    Provider(String),

    /// The call succeeded but the expected structure could not be extracted
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Lookup by id failed
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Input rejected before it touched any state
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// A persistence write failed or had to be truncated
    #[error("storage degraded: {0}")]
    StorageDegraded(String),

    /// Backend failure (SQLite, poisoned lock)
    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl LabError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Whether a retry affordance makes sense for this failure
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::MalformedResponse(_))
    }
}

impl From<rusqlite::Error> for LabError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = LabError::not_found("version", "abc");
        assert_eq!(err.to_string(), "version not found: abc");
    }

    #[test]
    fn test_retryable_classes() {
        assert!(LabError::Provider("timeout".into()).is_retryable());
        assert!(LabError::MalformedResponse("no json".into()).is_retryable());
        assert!(!LabError::UnsupportedInput("too big".into()).is_retryable());
        assert!(!LabError::not_found("turn", "x").is_retryable());
    }
}
