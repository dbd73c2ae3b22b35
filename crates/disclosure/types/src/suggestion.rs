//! Edit suggestions: reviewer-proposed field replacements
//!
//! A suggestion snapshots the field's value when proposed and is resolved
//! exactly once by the applicant. Resolved suggestions are immutable.

use crate::{
    ActorId, ApplicationField, ApplicationId, DisclosureError, DisclosureResult, SuggestionId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resolution status of a suggestion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

/// Applicant response to a suggestion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionAction {
    Accept,
    Reject,
}

impl SuggestionAction {
    pub fn resulting_status(&self) -> SuggestionStatus {
        match self {
            SuggestionAction::Accept => SuggestionStatus::Accepted,
            SuggestionAction::Reject => SuggestionStatus::Rejected,
        }
    }
}

/// One item of a batch response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub suggestion_id: SuggestionId,
    pub action: SuggestionAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SuggestionResponse {
    pub fn accept(suggestion_id: SuggestionId) -> Self {
        Self {
            suggestion_id,
            action: SuggestionAction::Accept,
            note: None,
        }
    }

    pub fn reject(suggestion_id: SuggestionId, note: impl Into<String>) -> Self {
        Self {
            suggestion_id,
            action: SuggestionAction::Reject,
            note: Some(note.into()),
        }
    }
}

/// A reviewer-proposed replacement value for one field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSuggestion {
    pub id: SuggestionId,
    pub application_id: ApplicationId,
    pub field_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_path: Option<String>,
    /// Field value when the suggestion was proposed
    pub original_value: Option<String>,
    pub suggested_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub status: SuggestionStatus,
    pub reviewer: ActorId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_response: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl EditSuggestion {
    pub fn new(
        application_id: ApplicationId,
        field: &ApplicationField,
        original_value: Option<String>,
        suggested_value: impl Into<String>,
        reviewer: ActorId,
    ) -> Self {
        Self {
            id: SuggestionId::generate(),
            application_id,
            field_name: field.name().to_string(),
            field_path: field.path().map(str::to_string),
            original_value,
            suggested_value: suggested_value.into(),
            note: None,
            status: SuggestionStatus::Pending,
            reviewer,
            applicant_response: None,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    /// The Application field this suggestion targets
    pub fn field(&self) -> DisclosureResult<ApplicationField> {
        ApplicationField::parse(&self.field_name, self.field_path.as_deref())
    }

    pub fn is_pending(&self) -> bool {
        self.status == SuggestionStatus::Pending
    }

    /// Move pending to accepted or rejected. Fails once resolved.
    pub fn resolve(
        &mut self,
        action: SuggestionAction,
        response: Option<String>,
    ) -> DisclosureResult<()> {
        if !self.is_pending() {
            return Err(DisclosureError::ResolvedAlready(self.id.clone()));
        }
        self.status = action.resulting_status();
        self.applicant_response = response;
        self.resolved_at = Some(Utc::now());
        Ok(())
    }
}
