use disclosure_types::{ApplicationId, DisclosureError, SuggestionId};
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("version conflict on application {application_id}: expected {expected}, found {found}")]
    VersionConflict {
        application_id: ApplicationId,
        expected: u64,
        found: u64,
    },

    #[error("suggestion already resolved: {0}")]
    AlreadyResolved(SuggestionId),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl From<StorageError> for DisclosureError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::VersionConflict { application_id, .. } => {
                DisclosureError::ConcurrentModification(application_id)
            }
            StorageError::AlreadyResolved(id) => DisclosureError::ResolvedAlready(id),
            StorageError::Conflict(msg) | StorageError::InvariantViolation(msg) => {
                DisclosureError::InvalidState(msg)
            }
            StorageError::NotFound(msg) => DisclosureError::InvalidState(msg),
            StorageError::Serialization(msg) | StorageError::Backend(msg) => {
                DisclosureError::Storage(msg)
            }
        }
    }
}
