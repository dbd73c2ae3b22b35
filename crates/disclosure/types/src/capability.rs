//! Capability types: what an actor may do, and the actions they may request
//!
//! Capabilities are resolved per request by the identity provider and
//! consumed here as plain booleans. They are never cached across requests.

use serde::{Deserialize, Serialize};

/// One independently granted capability
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// File new disclosures
    FileNew,
    /// Act as a reviewing-body member
    Review,
    /// Finalize approvals (reviewing-body head)
    Approve,
    /// Assign a disclosure to a school or department
    AssignSchool,
    /// Override workflow status
    Admin,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::FileNew => "file_new",
            Capability::Review => "review",
            Capability::Approve => "approve",
            Capability::AssignSchool => "assign_school",
            Capability::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved capability tuple for one actor at one moment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    #[serde(default)]
    pub file_new: bool,
    #[serde(default)]
    pub review: bool,
    #[serde(default)]
    pub approve: bool,
    #[serde(default)]
    pub assign_school: bool,
    #[serde(default)]
    pub admin: bool,
}

impl CapabilitySet {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn applicant() -> Self {
        Self {
            file_new: true,
            ..Self::default()
        }
    }

    pub fn reviewer() -> Self {
        Self {
            review: true,
            ..Self::default()
        }
    }

    pub fn head() -> Self {
        Self {
            review: true,
            approve: true,
            ..Self::default()
        }
    }

    pub fn with(mut self, capability: Capability) -> Self {
        match capability {
            Capability::FileNew => self.file_new = true,
            Capability::Review => self.review = true,
            Capability::Approve => self.approve = true,
            Capability::AssignSchool => self.assign_school = true,
            Capability::Admin => self.admin = true,
        }
        self
    }

    pub fn without(mut self, capability: Capability) -> Self {
        match capability {
            Capability::FileNew => self.file_new = false,
            Capability::Review => self.review = false,
            Capability::Approve => self.approve = false,
            Capability::AssignSchool => self.assign_school = false,
            Capability::Admin => self.admin = false,
        }
        self
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::FileNew => self.file_new,
            Capability::Review => self.review,
            Capability::Approve => self.approve,
            Capability::AssignSchool => self.assign_school,
            Capability::Admin => self.admin,
        }
    }

    /// Holding both review and approve is what finalizes a reviewing-body approval
    pub fn can_finalize(&self) -> bool {
        self.review && self.approve
    }
}

/// Every action that can be requested against an Application
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    Submit,
    MentorApprove,
    MentorReject,
    MentorRequestChanges,
    StartReview,
    Recommend,
    Approve,
    Reject,
    RequestChanges,
    Resubmit,
    StartHeadReview,
    HeadApprove,
    HeadReject,
    FileWithGovt,
    AddGovtId,
    AddPublicationId,
    #[serde(rename = "mark_rejected")]
    MarkGovtRejected,
    Cancel,
    SystemOverride,
}

impl WorkflowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowAction::Submit => "submit",
            WorkflowAction::MentorApprove => "mentor_approve",
            WorkflowAction::MentorReject => "mentor_reject",
            WorkflowAction::MentorRequestChanges => "mentor_request_changes",
            WorkflowAction::StartReview => "start_review",
            WorkflowAction::Recommend => "recommend",
            WorkflowAction::Approve => "approve",
            WorkflowAction::Reject => "reject",
            WorkflowAction::RequestChanges => "request_changes",
            WorkflowAction::Resubmit => "resubmit",
            WorkflowAction::StartHeadReview => "start_head_review",
            WorkflowAction::HeadApprove => "head_approve",
            WorkflowAction::HeadReject => "head_reject",
            WorkflowAction::FileWithGovt => "file_with_govt",
            WorkflowAction::AddGovtId => "add_govt_id",
            WorkflowAction::AddPublicationId => "add_publication_id",
            WorkflowAction::MarkGovtRejected => "mark_rejected",
            WorkflowAction::Cancel => "cancel",
            WorkflowAction::SystemOverride => "system_override",
        }
    }
}

impl std::fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision a reviewing-body member can be offered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOption {
    Approve,
    Recommend,
    ChangesRequired,
    Reject,
}

impl DecisionOption {
    /// The workflow action this option invokes
    pub fn action(&self) -> WorkflowAction {
        match self {
            DecisionOption::Approve => WorkflowAction::Approve,
            DecisionOption::Recommend => WorkflowAction::Recommend,
            DecisionOption::ChangesRequired => WorkflowAction::RequestChanges,
            DecisionOption::Reject => WorkflowAction::Reject,
        }
    }
}
