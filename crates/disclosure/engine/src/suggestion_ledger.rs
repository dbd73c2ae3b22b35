//! SuggestionLedger: reviewer-proposed field edits and their resolution
//!
//! A suggestion is proposed by a reviewer (or the mentor) while the
//! Application is in a status that accepts suggestions, and resolved
//! exactly once by the applicant. Accepting overwrites the field in the
//! same commit that marks the suggestion accepted.

use crate::permission_gate::{Operation, Relation};
use crate::service::DisclosureService;
use chrono::Utc;
use disclosure_storage::{AggregateCommit, DisclosureStore, SuggestionWrite};
use disclosure_types::{
    ActorId, Application, ApplicationField, ApplicationId, DisclosureError, DisclosureResult,
    DomainEvent, EditSuggestion, SuggestionAction, SuggestionId, SuggestionResponse,
    SuggestionStatus,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

/// A reviewer's proposed replacement for one field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionProposal {
    pub field_name: String,
    #[serde(default)]
    pub field_path: Option<String>,
    pub suggested_value: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl SuggestionProposal {
    pub fn new(field_name: impl Into<String>, suggested_value: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            field_path: None,
            suggested_value: suggested_value.into(),
            note: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Result of resolving one suggestion
#[derive(Clone, Debug)]
pub struct SuggestionResolution {
    pub application: Application,
    pub suggestion: EditSuggestion,
}

/// Outcome of one item in a batch
#[derive(Debug)]
pub struct BatchItemResult {
    pub suggestion_id: SuggestionId,
    pub outcome: DisclosureResult<SuggestionStatus>,
}

impl BatchItemResult {
    pub fn is_resolved(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Per-item report of a batch response
#[derive(Debug)]
pub struct BatchReport {
    pub application: Application,
    /// One entry per submitted item, in submission order
    pub items: Vec<BatchItemResult>,
    pub resolved: usize,
    pub pending_remaining: usize,
}

impl BatchReport {
    pub fn failed(&self) -> impl Iterator<Item = &BatchItemResult> {
        self.items.iter().filter(|item| !item.is_resolved())
    }
}

impl<S: DisclosureStore> DisclosureService<S> {
    /// Propose a field edit. The current value is snapshotted as the original.
    pub async fn propose_suggestion(
        &self,
        application_id: &ApplicationId,
        reviewer: &ActorId,
        proposal: SuggestionProposal,
    ) -> DisclosureResult<EditSuggestion> {
        let caps = self.capabilities_of(reviewer).await?;
        let _guard = self.locks.acquire(application_id).await;
        let application = self.load(application_id).await?;
        self.authorize(
            &caps,
            Operation::ProposeSuggestion,
            Relation::of(&application, reviewer),
        )?;

        if !self.config.allows_suggestions_in(application.status) {
            warn!(
                application_id = %application_id,
                status = %application.status,
                "Suggestion rejected outside review"
            );
            return Err(DisclosureError::InvalidState(format!(
                "suggestions are not accepted while the application is {}",
                application.status
            )));
        }

        let field = ApplicationField::parse(&proposal.field_name, proposal.field_path.as_deref())?;
        let original_value = application.field_value(&field);
        let suggestion = EditSuggestion::new(
            application_id.clone(),
            &field,
            original_value,
            proposal.suggested_value,
            reviewer.clone(),
        )
        .with_note(proposal.note);

        self.store
            .commit(
                AggregateCommit::new(application)
                    .with_suggestion(SuggestionWrite::Insert(suggestion.clone())),
            )
            .await?;
        info!(
            application_id = %application_id,
            suggestion_id = %suggestion.id,
            field = %suggestion.field_name,
            "Suggestion proposed"
        );

        self.events.publish(DomainEvent::SuggestionProposed {
            application_id: application_id.clone(),
            suggestion_id: suggestion.id.clone(),
            field_name: suggestion.field_name.clone(),
            reviewer: reviewer.clone(),
            at: suggestion.created_at,
        });
        Ok(suggestion)
    }

    /// Accept or reject one suggestion. Only the applicant may respond.
    pub async fn respond_to_suggestion(
        &self,
        suggestion_id: &SuggestionId,
        actor: &ActorId,
        action: SuggestionAction,
        note: Option<String>,
    ) -> DisclosureResult<SuggestionResolution> {
        let caps = self.capabilities_of(actor).await?;
        let application_id = self.fetch_suggestion(suggestion_id).await?.application_id;

        let _guard = self.locks.acquire(&application_id).await;
        // Re-read under the lock; it may have been resolved meanwhile
        let mut suggestion = self.fetch_suggestion(suggestion_id).await?;
        let application = self.load(&application_id).await?;
        self.authorize(
            &caps,
            Operation::RespondToSuggestion,
            Relation::of(&application, actor),
        )?;
        ensure_open(&application)?;

        let mut next = application;
        apply_response(&mut next, &mut suggestion, action, note)?;

        let receipt = self
            .store
            .commit(
                AggregateCommit::new(next).with_suggestion(SuggestionWrite::Resolve(suggestion.clone())),
            )
            .await?;
        info!(
            application_id = %application_id,
            suggestion_id = %suggestion_id,
            status = ?suggestion.status,
            "Suggestion resolved"
        );
        self.publish_resolution(&suggestion);

        Ok(SuggestionResolution {
            application: receipt.application,
            suggestion,
        })
    }

    /// Respond to several suggestions in one commit.
    ///
    /// Items that cannot be resolved are reported individually and do not
    /// stop the rest. Items that resolve are written together.
    pub async fn batch_respond(
        &self,
        application_id: &ApplicationId,
        actor: &ActorId,
        responses: Vec<SuggestionResponse>,
    ) -> DisclosureResult<BatchReport> {
        let caps = self.capabilities_of(actor).await?;
        let _guard = self.locks.acquire(application_id).await;
        let application = self.load(application_id).await?;
        self.authorize(
            &caps,
            Operation::RespondToSuggestion,
            Relation::of(&application, actor),
        )?;
        ensure_open(&application)?;

        let mut next = application.clone();
        let mut resolved_ids = HashSet::new();
        let mut writes = Vec::new();
        let mut items = Vec::with_capacity(responses.len());

        for response in responses {
            let suggestion_id = response.suggestion_id.clone();
            let outcome = if resolved_ids.contains(&suggestion_id) {
                Err(DisclosureError::ResolvedAlready(suggestion_id.clone()))
            } else {
                self.resolve_batch_item(&mut next, application_id, response)
                    .await
            };

            match outcome {
                Ok(suggestion) => {
                    resolved_ids.insert(suggestion_id.clone());
                    items.push(BatchItemResult {
                        suggestion_id,
                        outcome: Ok(suggestion.status),
                    });
                    writes.push(suggestion);
                }
                Err(err) => {
                    warn!(
                        application_id = %application_id,
                        suggestion_id = %suggestion_id,
                        error = %err,
                        "Batch item not resolved"
                    );
                    items.push(BatchItemResult {
                        suggestion_id,
                        outcome: Err(err),
                    });
                }
            }
        }

        let application = if writes.is_empty() {
            application
        } else {
            let commit = writes.iter().cloned().fold(AggregateCommit::new(next), |commit, s| {
                commit.with_suggestion(SuggestionWrite::Resolve(s))
            });
            self.store.commit(commit).await?.application
        };

        for suggestion in &writes {
            self.publish_resolution(suggestion);
        }

        let pending_remaining = self.count_pending(application_id).await?;
        info!(
            application_id = %application_id,
            resolved = writes.len(),
            failed = items.len() - writes.len(),
            pending_remaining,
            "Batch response applied"
        );

        Ok(BatchReport {
            application,
            items,
            resolved: writes.len(),
            pending_remaining,
        })
    }

    /// Pending suggestions on an Application. An unknown id is
    /// `ApplicationNotFound`, never zero.
    pub async fn pending_count(&self, application_id: &ApplicationId) -> DisclosureResult<usize> {
        self.load(application_id).await?;
        self.count_pending(application_id).await
    }

    /// Count for an Application the caller has already loaded
    pub(crate) async fn count_pending(&self, application_id: &ApplicationId) -> DisclosureResult<usize> {
        Ok(self
            .store
            .list_suggestions(application_id, Some(SuggestionStatus::Pending))
            .await?
            .len())
    }

    /// Suggestions on an Application, newest first
    pub async fn suggestions(
        &self,
        application_id: &ApplicationId,
        status: Option<SuggestionStatus>,
    ) -> DisclosureResult<Vec<EditSuggestion>> {
        self.load(application_id).await?;
        Ok(self.store.list_suggestions(application_id, status).await?)
    }

    async fn fetch_suggestion(&self, id: &SuggestionId) -> DisclosureResult<EditSuggestion> {
        self.store
            .get_suggestion(id)
            .await?
            .ok_or_else(|| DisclosureError::SuggestionNotFound(id.clone()))
    }

    async fn resolve_batch_item(
        &self,
        next: &mut Application,
        application_id: &ApplicationId,
        response: SuggestionResponse,
    ) -> DisclosureResult<EditSuggestion> {
        let mut suggestion = self.fetch_suggestion(&response.suggestion_id).await?;
        if suggestion.application_id != *application_id {
            return Err(DisclosureError::SuggestionNotFound(response.suggestion_id));
        }
        apply_response(next, &mut suggestion, response.action, response.note)?;
        Ok(suggestion)
    }

    fn publish_resolution(&self, suggestion: &EditSuggestion) {
        self.events.publish(DomainEvent::SuggestionResolved {
            application_id: suggestion.application_id.clone(),
            suggestion_id: suggestion.id.clone(),
            status: suggestion.status,
            at: suggestion.resolved_at.unwrap_or_else(Utc::now),
        });
    }
}

/// Resolve `suggestion` against `application`.
///
/// On accept the field is written first; a value outside an enumerated
/// field's domain fails here and leaves both untouched.
fn apply_response(
    application: &mut Application,
    suggestion: &mut EditSuggestion,
    action: SuggestionAction,
    note: Option<String>,
) -> DisclosureResult<()> {
    if !suggestion.is_pending() {
        return Err(DisclosureError::ResolvedAlready(suggestion.id.clone()));
    }
    if action == SuggestionAction::Accept {
        let field = suggestion.field()?;
        application.set_field(&field, &suggestion.suggested_value)?;
    }
    suggestion.resolve(action, note)
}

fn ensure_open(application: &Application) -> DisclosureResult<()> {
    if application.status.is_terminal() {
        return Err(DisclosureError::InvalidState(format!(
            "application {} is {}",
            application.id, application.status
        )));
    }
    Ok(())
}
