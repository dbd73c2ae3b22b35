//! Review records: one immutable entry per workflow action
//!
//! Reviews are append-only. Storage assigns the id, the per-application
//! sequence number, and the hash link to the previous record.

use crate::{ActorId, ApplicationId, ApplicationStatus, ReviewId, WorkflowAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role the actor held when recording the review
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerRole {
    Applicant,
    Mentor,
    DrdMember,
    DrdHead,
    FilingOfficer,
    Admin,
}

/// Outcome recorded by a review
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
    ChangesRequired,
    Recommended,
    Submitted,
    Resubmitted,
    StartedReview,
    Filed,
    Published,
    Cancelled,
    Overridden,
}

/// Review payload before storage seals it into the chain
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewAppend {
    pub reviewer: ActorId,
    pub reviewer_role: ReviewerRole,
    pub action: WorkflowAction,
    pub decision: ReviewDecision,
    pub from_status: ApplicationStatus,
    pub to_status: ApplicationStatus,
    #[serde(default)]
    pub comments: String,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewAppend {
    pub fn new(
        reviewer: ActorId,
        reviewer_role: ReviewerRole,
        action: WorkflowAction,
        decision: ReviewDecision,
        from_status: ApplicationStatus,
        to_status: ApplicationStatus,
    ) -> Self {
        Self {
            reviewer,
            reviewer_role,
            action,
            decision,
            from_status,
            to_status,
            comments: String::new(),
            reviewed_at: Utc::now(),
        }
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }
}

/// A sealed, tamper-evident review record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub application_id: ApplicationId,
    /// 1-based position in this application's review chain
    pub sequence: u64,
    pub reviewer: ActorId,
    pub reviewer_role: ReviewerRole,
    pub action: WorkflowAction,
    pub decision: ReviewDecision,
    pub from_status: ApplicationStatus,
    pub to_status: ApplicationStatus,
    pub comments: String,
    pub reviewed_at: DateTime<Utc>,
    pub previous_hash: Option<String>,
    pub hash: String,
}

impl Review {
    /// Seal an append into a record at the given chain position
    pub fn seal(
        application_id: ApplicationId,
        sequence: u64,
        append: ReviewAppend,
        previous_hash: Option<String>,
        hash: String,
    ) -> Self {
        Self {
            id: ReviewId::generate(),
            application_id,
            sequence,
            reviewer: append.reviewer,
            reviewer_role: append.reviewer_role,
            action: append.action,
            decision: append.decision,
            from_status: append.from_status,
            to_status: append.to_status,
            comments: append.comments,
            reviewed_at: append.reviewed_at,
            previous_hash,
            hash,
        }
    }
}
