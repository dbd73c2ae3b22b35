//! PermissionGate: allow or deny a requested operation
//!
//! The gate is a pure function of the actor's capability set, the
//! operation, and the actor's relation to the Application. Capabilities
//! are resolved fresh for every request through a [`CapabilityResolver`];
//! nothing here caches them.

use async_trait::async_trait;
use dashmap::DashMap;
use disclosure_types::{
    ActorId, Application, Capability, CapabilitySet, DecisionOption, DisclosureError,
    DisclosureResult, WorkflowAction,
};

/// An operation subject to the gate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Workflow(WorkflowAction),
    CreateApplication,
    EditApplication,
    ProposeSuggestion,
    RespondToSuggestion,
    AssignSchool,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Workflow(action) => write!(f, "{action}"),
            Operation::CreateApplication => f.write_str("create_application"),
            Operation::EditApplication => f.write_str("edit_application"),
            Operation::ProposeSuggestion => f.write_str("propose_suggestion"),
            Operation::RespondToSuggestion => f.write_str("respond_to_suggestion"),
            Operation::AssignSchool => f.write_str("assign_school"),
        }
    }
}

/// How the actor relates to the Application being acted on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Relation {
    pub is_applicant: bool,
    pub is_mentor: bool,
}

impl Relation {
    pub fn of(application: &Application, actor: &ActorId) -> Self {
        Self {
            is_applicant: application.is_applicant(actor),
            is_mentor: application.mentor.as_ref() == Some(actor),
        }
    }

    /// No relation, for operations with no Application yet
    pub fn none() -> Self {
        Self::default()
    }
}

/// What an operation demands of the actor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// The Application's own applicant
    Applicant,
    /// The mentor resolved at submit time
    Mentor,
    /// `review`, and not `approve`: approvers finalize instead
    ReviewOnly,
    Capability(Capability),
    /// `review` AND `approve`
    Finalize,
    /// `review`, or the Application's mentor
    ReviewOrMentor,
}

/// The single source of truth for who may do what
#[derive(Clone, Copy, Debug, Default)]
pub struct PermissionGate;

impl PermissionGate {
    pub fn new() -> Self {
        Self
    }

    pub fn requirement(operation: Operation) -> Requirement {
        use WorkflowAction::*;
        match operation {
            Operation::Workflow(action) => match action {
                Submit | Resubmit | Cancel => Requirement::Applicant,
                MentorApprove | MentorReject | MentorRequestChanges => Requirement::Mentor,
                Recommend => Requirement::ReviewOnly,
                Approve => Requirement::Finalize,
                StartReview | Reject | RequestChanges | FileWithGovt | AddGovtId
                | AddPublicationId | MarkGovtRejected => {
                    Requirement::Capability(Capability::Review)
                }
                StartHeadReview | HeadApprove | HeadReject => {
                    Requirement::Capability(Capability::Approve)
                }
                SystemOverride => Requirement::Capability(Capability::Admin),
            },
            Operation::CreateApplication => Requirement::Capability(Capability::FileNew),
            Operation::EditApplication | Operation::RespondToSuggestion => Requirement::Applicant,
            Operation::ProposeSuggestion => Requirement::ReviewOrMentor,
            Operation::AssignSchool => Requirement::Capability(Capability::AssignSchool),
        }
    }

    /// Decide one request
    pub fn check(
        &self,
        caps: &CapabilitySet,
        operation: Operation,
        relation: Relation,
    ) -> DisclosureResult<()> {
        let denial = match Self::requirement(operation) {
            Requirement::Applicant if !relation.is_applicant => {
                Some("only the applicant may do this".to_string())
            }
            Requirement::Mentor if !relation.is_mentor => {
                Some("only the assigned mentor may do this".to_string())
            }
            Requirement::ReviewOnly if !caps.review => Some("requires review".to_string()),
            Requirement::ReviewOnly if caps.approve => {
                Some("approvers finalize with approve instead of recommending".to_string())
            }
            Requirement::Finalize if !caps.can_finalize() => {
                Some("requires review and approve".to_string())
            }
            Requirement::Capability(cap) if !caps.has(cap) => Some(format!("requires {cap}")),
            Requirement::ReviewOrMentor if !caps.review && !relation.is_mentor => {
                Some("requires review or the assigned mentor".to_string())
            }
            _ => None,
        };

        match denial {
            Some(reason) => Err(DisclosureError::denied(operation, reason)),
            None => Ok(()),
        }
    }

    pub fn allows(&self, caps: &CapabilitySet, operation: Operation, relation: Relation) -> bool {
        self.check(caps, operation, relation).is_ok()
    }

    /// Decisions a reviewing-body member is offered.
    ///
    /// `review` alone offers recommend; `review` with `approve` offers
    /// approve. The two vocabularies never mix.
    pub fn decision_vocabulary(&self, caps: &CapabilitySet) -> Vec<DecisionOption> {
        if caps.can_finalize() {
            vec![
                DecisionOption::Approve,
                DecisionOption::ChangesRequired,
                DecisionOption::Reject,
            ]
        } else if caps.review {
            vec![
                DecisionOption::Recommend,
                DecisionOption::ChangesRequired,
                DecisionOption::Reject,
            ]
        } else {
            Vec::new()
        }
    }
}

/// Map identity-provider permission names onto a capability set.
///
/// Names are matched case-insensitively after trimming, with an optional
/// `ipr.` or `ipr:` namespace. Unknown names grant nothing.
pub fn resolve_capabilities<I, N>(permission_names: I) -> CapabilitySet
where
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
{
    permission_names
        .into_iter()
        .filter_map(|name| parse_permission(name.as_ref()))
        .fold(CapabilitySet::none(), CapabilitySet::with)
}

fn parse_permission(name: &str) -> Option<Capability> {
    let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
    let bare = normalized
        .strip_prefix("ipr.")
        .or_else(|| normalized.strip_prefix("ipr:"))
        .unwrap_or(normalized.as_str());
    match bare {
        "file_new" => Some(Capability::FileNew),
        "review" => Some(Capability::Review),
        "approve" => Some(Capability::Approve),
        "assign_school" => Some(Capability::AssignSchool),
        "admin" => Some(Capability::Admin),
        _ => None,
    }
}

/// Source of an actor's current capabilities, queried on every request
#[async_trait]
pub trait CapabilityResolver: Send + Sync {
    async fn resolve(&self, actor: &ActorId) -> DisclosureResult<CapabilitySet>;
}

/// Capability resolver backed by an in-process permission table.
///
/// Names go through [`resolve_capabilities`] on the way in, so `grant` and
/// `revoke` agree on spelling.
#[derive(Debug, Default)]
pub struct StaticCapabilityResolver {
    capabilities: DashMap<ActorId, CapabilitySet>,
}

impl StaticCapabilityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant<I, N>(&self, actor: &ActorId, permission_names: I)
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let mut entry = self.capabilities.entry(actor.clone()).or_default();
        let granted = permission_names
            .into_iter()
            .filter_map(|name| parse_permission(name.as_ref()))
            .fold(*entry, CapabilitySet::with);
        *entry = granted;
    }

    /// Withdraw one permission. Takes effect on the actor's next request.
    pub fn revoke(&self, actor: &ActorId, permission_name: &str) {
        let Some(capability) = parse_permission(permission_name) else {
            return;
        };
        if let Some(mut caps) = self.capabilities.get_mut(actor) {
            let remaining = caps.without(capability);
            *caps = remaining;
        }
    }
}

#[async_trait]
impl CapabilityResolver for StaticCapabilityResolver {
    async fn resolve(&self, actor: &ActorId) -> DisclosureResult<CapabilitySet> {
        Ok(self
            .capabilities
            .get(actor)
            .map(|caps| *caps)
            .unwrap_or_default())
    }
}
