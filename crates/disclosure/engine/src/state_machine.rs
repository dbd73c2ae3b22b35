//! ApplicationStateMachine: the transition table
//!
//! Every status change is an edge in this table. The table says where an
//! action leads; [`crate::PermissionGate`] says who may take it. An action
//! with no edge from the current status is an invalid transition.

use disclosure_types::{
    ApplicationStatus, DisclosureError, DisclosureResult, ReviewDecision, ReviewerRole,
    WorkflowAction,
};

/// Where an edge leads
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// A fixed target status
    To(ApplicationStatus),
    /// pending_mentor_approval when a mentor is assigned, else submitted
    SubmitRoute,
    /// Any status named by the request
    Override,
}

/// Facts gathered before the target status can be chosen
#[derive(Clone, Copy, Debug, Default)]
pub struct TransitionHints {
    pub mentor_assigned: bool,
    pub override_target: Option<ApplicationStatus>,
}

/// Stateless view over the transition table
#[derive(Clone, Copy, Debug, Default)]
pub struct ApplicationStateMachine;

impl ApplicationStateMachine {
    /// The edge `action` takes from `from`, if any
    pub fn edge(from: ApplicationStatus, action: WorkflowAction) -> Option<Edge> {
        use ApplicationStatus as S;
        use WorkflowAction as A;

        let edge = match (from, action) {
            (S::Draft, A::Submit) => Edge::SubmitRoute,

            (S::PendingMentorApproval, A::MentorApprove) => Edge::To(S::Submitted),
            (S::PendingMentorApproval, A::MentorReject | A::MentorRequestChanges) => {
                Edge::To(S::ChangesRequired)
            }

            (S::Submitted | S::Resubmitted, A::StartReview) => Edge::To(S::UnderDrdReview),
            (S::Submitted | S::Resubmitted | S::UnderDrdReview, A::Recommend) => {
                Edge::To(S::RecommendedToHead)
            }
            (S::Submitted | S::Resubmitted | S::UnderDrdReview, A::Approve) => {
                Edge::To(S::DrdApproved)
            }
            (S::Submitted | S::Resubmitted | S::UnderDrdReview, A::Reject) => {
                Edge::To(S::DrdRejected)
            }
            (S::Submitted | S::Resubmitted | S::UnderDrdReview, A::RequestChanges) => {
                Edge::To(S::ChangesRequired)
            }

            (S::ChangesRequired, A::Resubmit) => Edge::To(S::Resubmitted),

            (S::RecommendedToHead | S::DrdApproved, A::StartHeadReview) => {
                Edge::To(S::UnderHeadReview)
            }
            (S::RecommendedToHead | S::DrdApproved | S::UnderHeadReview, A::HeadApprove) => {
                Edge::To(S::SubmittedToGovt)
            }
            (S::RecommendedToHead | S::DrdApproved | S::UnderHeadReview, A::HeadReject) => {
                Edge::To(S::HeadRejected)
            }

            (S::HeadApproved, A::FileWithGovt) => Edge::To(S::SubmittedToGovt),
            (S::SubmittedToGovt, A::AddGovtId) => Edge::To(S::GovtApplicationFiled),
            (S::GovtApplicationFiled, A::AddPublicationId) => Edge::To(S::Published),
            (S::GovtApplicationFiled, A::MarkGovtRejected) => Edge::To(S::GovtRejected),

            (S::Draft | S::ChangesRequired, A::Cancel) => Edge::To(S::Cancelled),

            (status, A::SystemOverride) if !status.is_terminal() => Edge::Override,

            _ => return None,
        };
        Some(edge)
    }

    /// Resolve the target status, or fail without side effects
    pub fn next_status(
        from: ApplicationStatus,
        action: WorkflowAction,
        hints: &TransitionHints,
    ) -> DisclosureResult<ApplicationStatus> {
        let edge =
            Self::edge(from, action).ok_or(DisclosureError::InvalidTransition { from, action })?;

        match edge {
            Edge::To(status) => Ok(status),
            Edge::SubmitRoute if hints.mentor_assigned => {
                Ok(ApplicationStatus::PendingMentorApproval)
            }
            Edge::SubmitRoute => Ok(ApplicationStatus::Submitted),
            Edge::Override => match hints.override_target {
                None => Err(DisclosureError::InvalidInput(
                    "system_override needs a target status".into(),
                )),
                Some(target) if target == from => Err(DisclosureError::InvalidInput(format!(
                    "application is already {from}"
                ))),
                Some(target) => Ok(target),
            },
        }
    }

    /// Actions with an edge out of `from`
    pub fn available_actions(from: ApplicationStatus) -> Vec<WorkflowAction> {
        ALL_ACTIONS
            .into_iter()
            .filter(|action| Self::edge(from, *action).is_some())
            .collect()
    }

    /// Decision recorded on the Review an action writes
    pub fn decision_for(action: WorkflowAction) -> ReviewDecision {
        use WorkflowAction as A;
        match action {
            A::Submit => ReviewDecision::Submitted,
            A::Resubmit => ReviewDecision::Resubmitted,
            A::MentorApprove | A::Approve | A::HeadApprove => ReviewDecision::Approved,
            A::MentorReject | A::Reject | A::HeadReject | A::MarkGovtRejected => {
                ReviewDecision::Rejected
            }
            A::MentorRequestChanges | A::RequestChanges => ReviewDecision::ChangesRequired,
            A::Recommend => ReviewDecision::Recommended,
            A::StartReview | A::StartHeadReview => ReviewDecision::StartedReview,
            A::FileWithGovt | A::AddGovtId => ReviewDecision::Filed,
            A::AddPublicationId => ReviewDecision::Published,
            A::Cancel => ReviewDecision::Cancelled,
            A::SystemOverride => ReviewDecision::Overridden,
        }
    }

    /// Role the actor acts in when taking `action`
    pub fn role_for(action: WorkflowAction) -> ReviewerRole {
        use WorkflowAction as A;
        match action {
            A::Submit | A::Resubmit | A::Cancel => ReviewerRole::Applicant,
            A::MentorApprove | A::MentorReject | A::MentorRequestChanges => ReviewerRole::Mentor,
            A::StartReview | A::Recommend | A::Reject | A::RequestChanges => {
                ReviewerRole::DrdMember
            }
            A::Approve | A::StartHeadReview | A::HeadApprove | A::HeadReject => {
                ReviewerRole::DrdHead
            }
            A::FileWithGovt | A::AddGovtId | A::AddPublicationId | A::MarkGovtRejected => {
                ReviewerRole::FilingOfficer
            }
            A::SystemOverride => ReviewerRole::Admin,
        }
    }
}

pub(crate) const ALL_ACTIONS: [WorkflowAction; 19] = [
    WorkflowAction::Submit,
    WorkflowAction::MentorApprove,
    WorkflowAction::MentorReject,
    WorkflowAction::MentorRequestChanges,
    WorkflowAction::StartReview,
    WorkflowAction::Recommend,
    WorkflowAction::Approve,
    WorkflowAction::Reject,
    WorkflowAction::RequestChanges,
    WorkflowAction::Resubmit,
    WorkflowAction::StartHeadReview,
    WorkflowAction::HeadApprove,
    WorkflowAction::HeadReject,
    WorkflowAction::FileWithGovt,
    WorkflowAction::AddGovtId,
    WorkflowAction::AddPublicationId,
    WorkflowAction::MarkGovtRejected,
    WorkflowAction::Cancel,
    WorkflowAction::SystemOverride,
];

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use ApplicationStatus as S;
    use WorkflowAction as A;

    /// Every fixed edge, written out independently of the match above
    const DECLARED: &[(S, A, S)] = &[
        (S::PendingMentorApproval, A::MentorApprove, S::Submitted),
        (S::PendingMentorApproval, A::MentorReject, S::ChangesRequired),
        (S::PendingMentorApproval, A::MentorRequestChanges, S::ChangesRequired),
        (S::Submitted, A::StartReview, S::UnderDrdReview),
        (S::Resubmitted, A::StartReview, S::UnderDrdReview),
        (S::Submitted, A::Recommend, S::RecommendedToHead),
        (S::Resubmitted, A::Recommend, S::RecommendedToHead),
        (S::UnderDrdReview, A::Recommend, S::RecommendedToHead),
        (S::Submitted, A::Approve, S::DrdApproved),
        (S::Resubmitted, A::Approve, S::DrdApproved),
        (S::UnderDrdReview, A::Approve, S::DrdApproved),
        (S::Submitted, A::Reject, S::DrdRejected),
        (S::Resubmitted, A::Reject, S::DrdRejected),
        (S::UnderDrdReview, A::Reject, S::DrdRejected),
        (S::Submitted, A::RequestChanges, S::ChangesRequired),
        (S::Resubmitted, A::RequestChanges, S::ChangesRequired),
        (S::UnderDrdReview, A::RequestChanges, S::ChangesRequired),
        (S::ChangesRequired, A::Resubmit, S::Resubmitted),
        (S::RecommendedToHead, A::StartHeadReview, S::UnderHeadReview),
        (S::DrdApproved, A::StartHeadReview, S::UnderHeadReview),
        (S::RecommendedToHead, A::HeadApprove, S::SubmittedToGovt),
        (S::DrdApproved, A::HeadApprove, S::SubmittedToGovt),
        (S::UnderHeadReview, A::HeadApprove, S::SubmittedToGovt),
        (S::RecommendedToHead, A::HeadReject, S::HeadRejected),
        (S::DrdApproved, A::HeadReject, S::HeadRejected),
        (S::UnderHeadReview, A::HeadReject, S::HeadRejected),
        (S::HeadApproved, A::FileWithGovt, S::SubmittedToGovt),
        (S::SubmittedToGovt, A::AddGovtId, S::GovtApplicationFiled),
        (S::GovtApplicationFiled, A::AddPublicationId, S::Published),
        (S::GovtApplicationFiled, A::MarkGovtRejected, S::GovtRejected),
        (S::Draft, A::Cancel, S::Cancelled),
        (S::ChangesRequired, A::Cancel, S::Cancelled),
    ];

    fn declared_edge(from: S, action: A) -> Option<Edge> {
        if from == S::Draft && action == A::Submit {
            return Some(Edge::SubmitRoute);
        }
        if action == A::SystemOverride && !from.is_terminal() {
            return Some(Edge::Override);
        }
        DECLARED
            .iter()
            .find(|(f, a, _)| *f == from && *a == action)
            .map(|(_, _, to)| Edge::To(*to))
    }

    #[test]
    fn test_table_matches_declared_edges() {
        for from in S::ALL {
            for action in ALL_ACTIONS {
                assert_eq!(
                    ApplicationStateMachine::edge(from, action),
                    declared_edge(from, action),
                    "{from} --{action}-->"
                );
            }
        }
    }

    #[test]
    fn test_terminal_statuses_have_no_edges() {
        for status in S::ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(ApplicationStateMachine::available_actions(status).is_empty());
        }
    }

    #[test]
    fn test_submit_routes_through_mentor() {
        let hints = TransitionHints {
            mentor_assigned: true,
            ..Default::default()
        };
        assert_eq!(
            ApplicationStateMachine::next_status(S::Draft, A::Submit, &hints).unwrap(),
            S::PendingMentorApproval
        );
        assert_eq!(
            ApplicationStateMachine::next_status(S::Draft, A::Submit, &TransitionHints::default())
                .unwrap(),
            S::Submitted
        );
    }

    #[test]
    fn test_override_needs_distinct_target() {
        let none = TransitionHints::default();
        assert!(matches!(
            ApplicationStateMachine::next_status(S::UnderDrdReview, A::SystemOverride, &none),
            Err(DisclosureError::InvalidInput(_))
        ));

        let same = TransitionHints {
            override_target: Some(S::UnderDrdReview),
            ..Default::default()
        };
        assert!(
            ApplicationStateMachine::next_status(S::UnderDrdReview, A::SystemOverride, &same)
                .is_err()
        );

        let back = TransitionHints {
            override_target: Some(S::Draft),
            ..Default::default()
        };
        assert_eq!(
            ApplicationStateMachine::next_status(S::UnderDrdReview, A::SystemOverride, &back)
                .unwrap(),
            S::Draft
        );

        assert!(matches!(
            ApplicationStateMachine::next_status(S::Published, A::SystemOverride, &back),
            Err(DisclosureError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_head_approved_only_files() {
        assert_eq!(
            ApplicationStateMachine::available_actions(S::HeadApproved),
            vec![A::FileWithGovt, A::SystemOverride]
        );
    }

    proptest! {
        #[test]
        fn prop_no_undeclared_edge_is_accepted(
            from_idx in 0usize..17,
            action_idx in 0usize..19,
            mentor in any::<bool>(),
            target_idx in 0usize..17,
        ) {
            let from = S::ALL[from_idx];
            let action = ALL_ACTIONS[action_idx];
            let hints = TransitionHints {
                mentor_assigned: mentor,
                override_target: Some(S::ALL[target_idx]),
            };
            let result = ApplicationStateMachine::next_status(from, action, &hints);

            match declared_edge(from, action) {
                None => {
                    let is_invalid_transition =
                        matches!(result, Err(DisclosureError::InvalidTransition { .. }));
                    prop_assert!(is_invalid_transition);
                }
                Some(Edge::To(to)) => prop_assert_eq!(result.unwrap(), to),
                Some(Edge::SubmitRoute) => {
                    let to = result.unwrap();
                    prop_assert!(to == S::Submitted || to == S::PendingMentorApproval);
                }
                Some(Edge::Override) => {
                    prop_assert_eq!(result.is_ok(), S::ALL[target_idx] != from);
                }
            }
        }
    }
}
