use crate::model::{AggregateCommit, ApplicationQuery, CommitReceipt};
use crate::StorageResult;
use async_trait::async_trait;
use disclosure_types::{
    Application, ApplicationId, EditSuggestion, IncentiveCredit, IncentivePolicy, IprType, Review,
    SuggestionId, SuggestionStatus,
};

/// Storage interface for Application aggregates.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Insert a new application at version 1. Fails if the id exists.
    async fn insert_application(&self, application: Application) -> StorageResult<Application>;

    /// Get one application by id.
    async fn get_application(&self, id: &ApplicationId) -> StorageResult<Option<Application>>;

    /// List applications newest-first.
    async fn list_applications(&self, query: ApplicationQuery) -> StorageResult<Vec<Application>>;

    /// Apply a unit of work atomically, bumping the application version.
    async fn commit(&self, commit: AggregateCommit) -> StorageResult<CommitReceipt>;

    /// Record the incentive credit only if none is recorded yet.
    ///
    /// Returns `true` when this call wrote the credit and `false` when a
    /// credit was already present. Safe under concurrent retries.
    async fn credit_incentive(
        &self,
        id: &ApplicationId,
        credit: IncentiveCredit,
    ) -> StorageResult<bool>;
}

/// Storage interface for the append-only review chains.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Reviews of one application, oldest first.
    async fn list_reviews(&self, application_id: &ApplicationId) -> StorageResult<Vec<Review>>;

    /// Latest hash anchor of one application's chain.
    async fn latest_review_hash(
        &self,
        application_id: &ApplicationId,
    ) -> StorageResult<Option<String>>;
}

/// Storage interface for edit suggestions.
#[async_trait]
pub trait SuggestionStore: Send + Sync {
    async fn get_suggestion(&self, id: &SuggestionId) -> StorageResult<Option<EditSuggestion>>;

    /// Suggestions of one application, newest first, optionally by status.
    async fn list_suggestions(
        &self,
        application_id: &ApplicationId,
        status: Option<SuggestionStatus>,
    ) -> StorageResult<Vec<EditSuggestion>>;
}

/// Storage interface for incentive policy records.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn get_policy(&self, ipr_type: IprType) -> StorageResult<Option<IncentivePolicy>>;

    async fn upsert_policy(&self, policy: IncentivePolicy) -> StorageResult<()>;
}

/// Unified storage bundle used by the disclosure engine.
pub trait DisclosureStore: ApplicationStore + ReviewStore + SuggestionStore + PolicyStore {}

impl<T> DisclosureStore for T where T: ApplicationStore + ReviewStore + SuggestionStore + PolicyStore
{}
