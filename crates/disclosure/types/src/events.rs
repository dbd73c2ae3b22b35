//! Domain events emitted after a change commits
//!
//! Delivery is someone else's concern. Events describe what already
//! happened and are never used to decide whether it may happen.

use crate::{
    ActorId, ApplicationId, ApplicationStatus, ContributorIdentity, Money, Points, SuggestionId,
    SuggestionStatus, WorkflowAction,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Something that happened to an Application
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    StatusChanged {
        application_id: ApplicationId,
        action: WorkflowAction,
        from: ApplicationStatus,
        to: ApplicationStatus,
        actor: ActorId,
        at: DateTime<Utc>,
    },
    SuggestionProposed {
        application_id: ApplicationId,
        suggestion_id: SuggestionId,
        field_name: String,
        reviewer: ActorId,
        at: DateTime<Utc>,
    },
    SuggestionResolved {
        application_id: ApplicationId,
        suggestion_id: SuggestionId,
        status: SuggestionStatus,
        at: DateTime<Utc>,
    },
    IncentiveCredited {
        application_id: ApplicationId,
        total_incentive: Money,
        total_points: Points,
        at: DateTime<Utc>,
    },
    ContributorAdded {
        application_id: ApplicationId,
        identity: ContributorIdentity,
        at: DateTime<Utc>,
    },
}

impl DomainEvent {
    pub fn application_id(&self) -> &ApplicationId {
        match self {
            DomainEvent::StatusChanged { application_id, .. }
            | DomainEvent::SuggestionProposed { application_id, .. }
            | DomainEvent::SuggestionResolved { application_id, .. }
            | DomainEvent::IncentiveCredited { application_id, .. }
            | DomainEvent::ContributorAdded { application_id, .. } => application_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::StatusChanged { .. } => "status_changed",
            DomainEvent::SuggestionProposed { .. } => "suggestion_proposed",
            DomainEvent::SuggestionResolved { .. } => "suggestion_resolved",
            DomainEvent::IncentiveCredited { .. } => "incentive_credited",
            DomainEvent::ContributorAdded { .. } => "contributor_added",
        }
    }
}
