//! In-memory reference implementation of the disclosure storage traits.
//!
//! This adapter is deterministic and test-friendly. Locks are always taken
//! in the order applications, reviews, suggestions, policies.

use crate::model::{
    compute_review_hash, AggregateCommit, ApplicationQuery, CommitReceipt, SuggestionWrite,
};
use crate::traits::{ApplicationStore, PolicyStore, ReviewStore, SuggestionStore};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use disclosure_types::{
    Application, ApplicationId, EditSuggestion, IncentiveCredit, IncentivePolicy, IprType, Review,
    SuggestionId, SuggestionStatus,
};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory disclosure storage adapter.
#[derive(Default)]
pub struct InMemoryDisclosureStore {
    applications: RwLock<HashMap<ApplicationId, Application>>,
    reviews: RwLock<HashMap<ApplicationId, Vec<Review>>>,
    suggestions: RwLock<HashMap<SuggestionId, EditSuggestion>>,
    policies: RwLock<HashMap<IprType, IncentivePolicy>>,
}

impl InMemoryDisclosureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed policy records
    pub fn with_policies(policies: impl IntoIterator<Item = IncentivePolicy>) -> Self {
        let store = Self::default();
        if let Ok(mut guard) = store.policies.write() {
            for policy in policies {
                guard.insert(policy.ipr_type, policy);
            }
        }
        store
    }
}

fn poisoned(what: &str) -> StorageError {
    StorageError::Backend(format!("{what} lock poisoned"))
}

#[async_trait]
impl ApplicationStore for InMemoryDisclosureStore {
    async fn insert_application(&self, mut application: Application) -> StorageResult<Application> {
        let mut guard = self
            .applications
            .write()
            .map_err(|_| poisoned("applications"))?;

        if guard.contains_key(&application.id) {
            return Err(StorageError::Conflict(format!(
                "application {} already exists",
                application.id
            )));
        }

        application.version = 1;
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    async fn get_application(&self, id: &ApplicationId) -> StorageResult<Option<Application>> {
        let guard = self
            .applications
            .read()
            .map_err(|_| poisoned("applications"))?;
        Ok(guard.get(id).cloned())
    }

    async fn list_applications(&self, query: ApplicationQuery) -> StorageResult<Vec<Application>> {
        let guard = self
            .applications
            .read()
            .map_err(|_| poisoned("applications"))?;
        let mut values = guard
            .values()
            .filter(|app| query.matches(app))
            .cloned()
            .collect::<Vec<_>>();
        values.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(apply_window(values, query.limit, query.offset))
    }

    async fn commit(&self, commit: AggregateCommit) -> StorageResult<CommitReceipt> {
        let AggregateCommit {
            mut application,
            expected_version,
            reviews,
            suggestions,
        } = commit;

        let mut apps = self
            .applications
            .write()
            .map_err(|_| poisoned("applications"))?;
        let mut chains = self.reviews.write().map_err(|_| poisoned("reviews"))?;
        let mut stored_suggestions = self
            .suggestions
            .write()
            .map_err(|_| poisoned("suggestions"))?;

        let current = apps.get(&application.id).ok_or_else(|| {
            StorageError::NotFound(format!("application {} not found", application.id))
        })?;
        if current.version != expected_version {
            return Err(StorageError::VersionConflict {
                application_id: application.id.clone(),
                expected: expected_version,
                found: current.version,
            });
        }

        // Check every precondition before writing anything
        for write in &suggestions {
            let suggestion = write.suggestion();
            if suggestion.application_id != application.id {
                return Err(StorageError::InvariantViolation(format!(
                    "suggestion {} belongs to application {}",
                    suggestion.id, suggestion.application_id
                )));
            }
            match write {
                SuggestionWrite::Insert(s) => {
                    if stored_suggestions.contains_key(&s.id) {
                        return Err(StorageError::Conflict(format!(
                            "suggestion {} already exists",
                            s.id
                        )));
                    }
                }
                SuggestionWrite::Resolve(s) => {
                    let stored = stored_suggestions.get(&s.id).ok_or_else(|| {
                        StorageError::NotFound(format!("suggestion {} not found", s.id))
                    })?;
                    if !stored.is_pending() {
                        return Err(StorageError::AlreadyResolved(s.id.clone()));
                    }
                    if s.is_pending() {
                        return Err(StorageError::InvariantViolation(format!(
                            "resolution of suggestion {} is still pending",
                            s.id
                        )));
                    }
                }
            }
        }

        let chain = chains.entry(application.id.clone()).or_default();
        let mut sealed = Vec::with_capacity(reviews.len());
        let mut previous_hash = chain.last().map(|r| r.hash.clone());
        let mut sequence = chain.len() as u64;
        for append in reviews {
            sequence += 1;
            let hash =
                compute_review_hash(&application.id, sequence, &append, previous_hash.as_deref())?;
            let review = Review::seal(
                application.id.clone(),
                sequence,
                append,
                previous_hash.take(),
                hash.clone(),
            );
            previous_hash = Some(hash);
            sealed.push(review);
        }
        chain.extend(sealed.iter().cloned());

        for write in suggestions {
            let suggestion = match write {
                SuggestionWrite::Insert(s) | SuggestionWrite::Resolve(s) => s,
            };
            stored_suggestions.insert(suggestion.id.clone(), suggestion);
        }

        application.version = expected_version + 1;
        apps.insert(application.id.clone(), application.clone());

        Ok(CommitReceipt {
            application,
            reviews: sealed,
        })
    }

    async fn credit_incentive(
        &self,
        id: &ApplicationId,
        credit: IncentiveCredit,
    ) -> StorageResult<bool> {
        let mut guard = self
            .applications
            .write()
            .map_err(|_| poisoned("applications"))?;
        let application = guard
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("application {id} not found")))?;

        if !application.apply_credit(&credit) {
            return Ok(false);
        }
        application.version += 1;
        Ok(true)
    }
}

#[async_trait]
impl ReviewStore for InMemoryDisclosureStore {
    async fn list_reviews(&self, application_id: &ApplicationId) -> StorageResult<Vec<Review>> {
        let guard = self.reviews.read().map_err(|_| poisoned("reviews"))?;
        Ok(guard.get(application_id).cloned().unwrap_or_default())
    }

    async fn latest_review_hash(
        &self,
        application_id: &ApplicationId,
    ) -> StorageResult<Option<String>> {
        let guard = self.reviews.read().map_err(|_| poisoned("reviews"))?;
        Ok(guard
            .get(application_id)
            .and_then(|chain| chain.last())
            .map(|r| r.hash.clone()))
    }
}

#[async_trait]
impl SuggestionStore for InMemoryDisclosureStore {
    async fn get_suggestion(&self, id: &SuggestionId) -> StorageResult<Option<EditSuggestion>> {
        let guard = self
            .suggestions
            .read()
            .map_err(|_| poisoned("suggestions"))?;
        Ok(guard.get(id).cloned())
    }

    async fn list_suggestions(
        &self,
        application_id: &ApplicationId,
        status: Option<SuggestionStatus>,
    ) -> StorageResult<Vec<EditSuggestion>> {
        let guard = self
            .suggestions
            .read()
            .map_err(|_| poisoned("suggestions"))?;
        let mut values = guard
            .values()
            .filter(|s| s.application_id == *application_id)
            .filter(|s| status.map_or(true, |wanted| s.status == wanted))
            .cloned()
            .collect::<Vec<_>>();
        values.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(values)
    }
}

#[async_trait]
impl PolicyStore for InMemoryDisclosureStore {
    async fn get_policy(&self, ipr_type: IprType) -> StorageResult<Option<IncentivePolicy>> {
        let guard = self.policies.read().map_err(|_| poisoned("policies"))?;
        Ok(guard.get(&ipr_type).cloned())
    }

    async fn upsert_policy(&self, policy: IncentivePolicy) -> StorageResult<()> {
        let mut guard = self.policies.write().map_err(|_| poisoned("policies"))?;
        guard.insert(policy.ipr_type, policy);
        Ok(())
    }
}

fn apply_window<T>(items: Vec<T>, limit: usize, offset: usize) -> Vec<T> {
    let iter = items.into_iter().skip(offset);
    if limit == 0 {
        iter.collect()
    } else {
        iter.take(limit).collect()
    }
}
