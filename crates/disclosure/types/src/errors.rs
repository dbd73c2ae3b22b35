//! Error types for the disclosure layer

use crate::{ApplicationId, ApplicationStatus, SuggestionId, WorkflowAction};

/// Errors that can occur in disclosure operations.
///
/// Every variant except `Storage` is an expected, recoverable outcome that
/// the caller translates into a user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum DisclosureError {
    #[error("Invalid transition: {action} is not allowed from {from}")]
    InvalidTransition {
        from: ApplicationStatus,
        action: WorkflowAction,
    },

    #[error("Permission denied for {action}: {reason}")]
    PermissionDenied { action: String, reason: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidEnumValue { field: String, value: String },

    #[error("Suggestion already resolved: {0}")]
    ResolvedAlready(SuggestionId),

    #[error("Duplicate contributor: {0}")]
    DuplicateContributor(String),

    #[error("Concurrent modification of application: {0}")]
    ConcurrentModification(ApplicationId),

    #[error("Application not found: {0}")]
    ApplicationNotFound(ApplicationId),

    #[error("Suggestion not found: {0}")]
    SuggestionNotFound(SuggestionId),

    #[error("{pending} suggestion(s) still pending; resolve them or acknowledge to proceed")]
    PendingSuggestions { pending: usize },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage unavailable: {0}")]
    Storage(String),
}

impl DisclosureError {
    pub fn invalid_enum(field: impl Into<String>, value: impl Into<String>) -> Self {
        DisclosureError::InvalidEnumValue {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn denied(action: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        DisclosureError::PermissionDenied {
            action: action.to_string(),
            reason: reason.into(),
        }
    }

    /// Failures the caller may retry unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DisclosureError::Storage(_) | DisclosureError::ConcurrentModification(_)
        )
    }
}

/// Result type alias for disclosure operations
pub type DisclosureResult<T> = Result<T, DisclosureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DisclosureError::InvalidTransition {
            from: ApplicationStatus::Draft,
            action: WorkflowAction::Approve,
        };
        assert_eq!(
            err.to_string(),
            "Invalid transition: approve is not allowed from draft"
        );
        let err = DisclosureError::invalid_enum("ipr_type", "not_a_real_type");
        assert_eq!(err.to_string(), "Invalid value for ipr_type: not_a_real_type");
    }

    #[test]
    fn test_denied_message() {
        let err = DisclosureError::denied(WorkflowAction::Approve, "requires review and approve");
        assert_eq!(
            err.to_string(),
            "Permission denied for approve: requires review and approve"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(DisclosureError::Storage("down".into()).is_retryable());
        assert!(!DisclosureError::InvalidState("x".into()).is_retryable());
    }
}
