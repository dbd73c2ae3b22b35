//! Workflow transitions and the publication credit

use crate::incentive::IncentiveCalculator;
use crate::permission_gate::{Operation, Relation};
use crate::service::DisclosureService;
use crate::state_machine::{ApplicationStateMachine, TransitionHints};
use chrono::Utc;
use disclosure_storage::{AggregateCommit, DisclosureStore};
use disclosure_types::{
    ActorId, Application, ApplicationId, ApplicationStatus, DecisionOption, DisclosureError,
    DisclosureResult, DomainEvent, IncentiveCredit, Review, ReviewAppend, WorkflowAction,
};
use tracing::{debug, error, info, warn};

/// A requested workflow action and its inputs
#[derive(Clone, Debug)]
pub struct TransitionRequest {
    pub action: WorkflowAction,
    /// Recorded on the Review. Mandatory for `system_override`.
    pub comments: String,
    pub govt_application_id: Option<String>,
    pub publication_id: Option<String>,
    pub override_target: Option<ApplicationStatus>,
    /// Resubmit even though suggestions are still pending
    pub acknowledge_pending: bool,
}

impl TransitionRequest {
    pub fn new(action: WorkflowAction) -> Self {
        Self {
            action,
            comments: String::new(),
            govt_application_id: None,
            publication_id: None,
            override_target: None,
            acknowledge_pending: false,
        }
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }

    pub fn with_govt_application_id(mut self, id: impl Into<String>) -> Self {
        self.govt_application_id = Some(id.into());
        self
    }

    pub fn with_publication_id(mut self, id: impl Into<String>) -> Self {
        self.publication_id = Some(id.into());
        self
    }

    pub fn with_override_target(mut self, target: ApplicationStatus) -> Self {
        self.override_target = Some(target);
        self
    }

    pub fn acknowledging_pending(mut self) -> Self {
        self.acknowledge_pending = true;
        self
    }
}

/// What a transition did
#[derive(Clone, Debug)]
pub struct TransitionOutcome {
    /// The Application as stored afterwards
    pub application: Application,
    /// The Review written; `None` only for a repeated publication
    pub review: Option<Review>,
    /// The incentive credit, when this call wrote it
    pub credit: Option<IncentiveCredit>,
}

impl<S: DisclosureStore> DisclosureService<S> {
    /// Apply one workflow action.
    ///
    /// An action with no edge from the current status fails with
    /// `InvalidTransition`; an actor who may not take it fails with
    /// `PermissionDenied`. Neither mutates anything.
    pub async fn transition(
        &self,
        id: &ApplicationId,
        actor: &ActorId,
        request: TransitionRequest,
    ) -> DisclosureResult<TransitionOutcome> {
        let caps = self.capabilities_of(actor).await?;
        let _guard = self.locks.acquire(id).await;
        let application = self.load(id).await?;
        let from = application.status;
        let action = request.action;
        let relation = Relation::of(&application, actor);

        if action == WorkflowAction::AddPublicationId && from == ApplicationStatus::Published {
            self.authorize(&caps, Operation::Workflow(action), relation)?;
            return self.replay_publication(application, &request).await;
        }

        if ApplicationStateMachine::edge(from, action).is_none() {
            warn!(application_id = %id, %action, %from, "Invalid transition requested");
            return Err(DisclosureError::InvalidTransition { from, action });
        }
        self.authorize(&caps, Operation::Workflow(action), relation)?;

        let now = Utc::now();
        let mut next = application.clone();
        let mut hints = TransitionHints::default();
        match action {
            WorkflowAction::Submit => {
                let route = self.mentors.route(&application).await?;
                hints.mentor_assigned = route.mentor().is_some();
                next.mentor = route.mentor().cloned();
                next.submitted_at = Some(now);
            }
            WorkflowAction::Resubmit => {
                let pending = self.count_pending(id).await?;
                if pending > 0 && !request.acknowledge_pending {
                    warn!(application_id = %id, pending, "Resubmission blocked by pending suggestions");
                    return Err(DisclosureError::PendingSuggestions { pending });
                }
                if pending > 0 {
                    info!(application_id = %id, pending, "Resubmitting with pending suggestions acknowledged");
                }
                next.changes_requested_by_mentor = false;
                next.submitted_at = Some(now);
            }
            WorkflowAction::MentorReject | WorkflowAction::MentorRequestChanges => {
                next.changes_requested_by_mentor = true;
            }
            WorkflowAction::AddGovtId => {
                next.govt_application_id = Some(required(
                    request.govt_application_id.as_deref(),
                    "govt_application_id",
                )?);
            }
            WorkflowAction::AddPublicationId => {
                next.publication_id =
                    Some(required(request.publication_id.as_deref(), "publication_id")?);
            }
            WorkflowAction::SystemOverride => {
                if request.comments.trim().is_empty() {
                    return Err(DisclosureError::InvalidInput(
                        "system_override needs a reason".into(),
                    ));
                }
                hints.override_target = request.override_target;
            }
            _ => {}
        }

        let to = ApplicationStateMachine::next_status(from, action, &hints)?;
        next.status = to;
        next.updated_at = now;

        let review = ReviewAppend::new(
            actor.clone(),
            ApplicationStateMachine::role_for(action),
            action,
            ApplicationStateMachine::decision_for(action),
            from,
            to,
        )
        .with_comments(request.comments.trim());

        let receipt = self
            .store
            .commit(AggregateCommit::new(next).with_review(review))
            .await?;
        info!(
            application_id = %id,
            %action,
            %from,
            %to,
            actor = %actor,
            version = receipt.application.version,
            "Transition committed"
        );

        self.events.publish(DomainEvent::StatusChanged {
            application_id: id.clone(),
            action,
            from,
            to,
            actor: actor.clone(),
            at: now,
        });

        let review = receipt.reviews.into_iter().next();
        let mut application = receipt.application;
        let mut credit = None;
        if to == ApplicationStatus::Published {
            credit = self.credit_on_publish(&application).await?;
            if credit.is_some() {
                application = self.load(id).await?;
            }
        }

        Ok(TransitionOutcome {
            application,
            review,
            credit,
        })
    }

    /// `add_publication_id` against an already published Application.
    ///
    /// The same (or no) publication id is a no-op that only completes a
    /// missing credit. A different id is an invalid transition.
    async fn replay_publication(
        &self,
        application: Application,
        request: &TransitionRequest,
    ) -> DisclosureResult<TransitionOutcome> {
        if let Some(requested) = request.publication_id.as_deref() {
            if application.publication_id.as_deref() != Some(requested.trim()) {
                return Err(DisclosureError::InvalidTransition {
                    from: ApplicationStatus::Published,
                    action: WorkflowAction::AddPublicationId,
                });
            }
        }
        debug!(application_id = %application.id, "Publication already recorded");

        let credit = self.credit_on_publish(&application).await?;
        let application = if credit.is_some() {
            self.load(&application.id).await?
        } else {
            application
        };
        Ok(TransitionOutcome {
            application,
            review: None,
            credit,
        })
    }

    /// Credit the incentive if none is recorded yet.
    ///
    /// Runs after the publication commit. A failure here leaves the
    /// Application published and uncredited; repeating
    /// `add_publication_id` completes it.
    pub(crate) async fn credit_on_publish(
        &self,
        application: &Application,
    ) -> DisclosureResult<Option<IncentiveCredit>> {
        if application.is_credited() {
            return Ok(None);
        }
        let result = self.write_credit(application).await;
        if let Err(err) = &result {
            error!(
                application_id = %application.id,
                error = %err,
                "Incentive credit failed after publication"
            );
        }
        result
    }

    async fn write_credit(
        &self,
        application: &Application,
    ) -> DisclosureResult<Option<IncentiveCredit>> {
        let ipr_type = application.ipr_type;
        let (policy, used_default_policy) = match self.store.get_policy(ipr_type).await? {
            Some(policy) => (policy, false),
            None => {
                warn!(%ipr_type, "No incentive policy on record; using configured default");
                (self.config.default_policy(ipr_type), true)
            }
        };

        let mut credit = IncentiveCalculator::calculate(&policy, &application.contributors, Utc::now());
        credit.used_default_policy = used_default_policy;

        if !self
            .store
            .credit_incentive(&application.id, credit.clone())
            .await?
        {
            debug!(application_id = %application.id, "Incentive already credited");
            return Ok(None);
        }

        info!(
            application_id = %application.id,
            total_incentive = %credit.total_incentive,
            total_points = %credit.total_points,
            used_default_policy,
            "Incentive credited"
        );
        self.events.publish(DomainEvent::IncentiveCredited {
            application_id: application.id.clone(),
            total_incentive: credit.total_incentive,
            total_points: credit.total_points,
            at: credit.credited_at,
        });
        Ok(Some(credit))
    }

    // ---- Convenience wrappers ----

    pub async fn submit(
        &self,
        id: &ApplicationId,
        actor: &ActorId,
    ) -> DisclosureResult<TransitionOutcome> {
        self.transition(id, actor, TransitionRequest::new(WorkflowAction::Submit))
            .await
    }

    /// Resubmit after changes. With `acknowledge_pending` the applicant
    /// proceeds past unresolved suggestions.
    pub async fn resubmit(
        &self,
        id: &ApplicationId,
        actor: &ActorId,
        acknowledge_pending: bool,
    ) -> DisclosureResult<TransitionOutcome> {
        let mut request = TransitionRequest::new(WorkflowAction::Resubmit);
        request.acknowledge_pending = acknowledge_pending;
        self.transition(id, actor, request).await
    }

    /// Record a reviewing-body decision
    pub async fn record_decision(
        &self,
        id: &ApplicationId,
        actor: &ActorId,
        decision: DecisionOption,
        comments: &str,
    ) -> DisclosureResult<TransitionOutcome> {
        self.transition(
            id,
            actor,
            TransitionRequest::new(decision.action()).with_comments(comments),
        )
        .await
    }

    pub async fn add_govt_id(
        &self,
        id: &ApplicationId,
        actor: &ActorId,
        govt_application_id: &str,
    ) -> DisclosureResult<TransitionOutcome> {
        self.transition(
            id,
            actor,
            TransitionRequest::new(WorkflowAction::AddGovtId)
                .with_govt_application_id(govt_application_id),
        )
        .await
    }

    /// Record the publication. Repeating it never credits twice.
    pub async fn add_publication_id(
        &self,
        id: &ApplicationId,
        actor: &ActorId,
        publication_id: &str,
    ) -> DisclosureResult<TransitionOutcome> {
        self.transition(
            id,
            actor,
            TransitionRequest::new(WorkflowAction::AddPublicationId)
                .with_publication_id(publication_id),
        )
        .await
    }

    pub async fn cancel(
        &self,
        id: &ApplicationId,
        actor: &ActorId,
        reason: &str,
    ) -> DisclosureResult<TransitionOutcome> {
        self.transition(
            id,
            actor,
            TransitionRequest::new(WorkflowAction::Cancel).with_comments(reason),
        )
        .await
    }

    /// Force a status. Needs `admin` and a reason; always leaves a Review.
    pub async fn system_override(
        &self,
        id: &ApplicationId,
        actor: &ActorId,
        target: ApplicationStatus,
        reason: &str,
    ) -> DisclosureResult<TransitionOutcome> {
        self.transition(
            id,
            actor,
            TransitionRequest::new(WorkflowAction::SystemOverride)
                .with_override_target(target)
                .with_comments(reason),
        )
        .await
    }

    // ---- What the actor may do now ----

    /// Decisions offered to `actor` on the Application as it stands
    pub async fn decision_options(
        &self,
        id: &ApplicationId,
        actor: &ActorId,
    ) -> DisclosureResult<Vec<DecisionOption>> {
        let caps = self.capabilities_of(actor).await?;
        let application = self.load(id).await?;
        Ok(self
            .gate
            .decision_vocabulary(&caps)
            .into_iter()
            .filter(|option| ApplicationStateMachine::edge(application.status, option.action()).is_some())
            .collect())
    }

    /// Actions that have an edge from the current status and pass the gate
    pub async fn available_actions(
        &self,
        id: &ApplicationId,
        actor: &ActorId,
    ) -> DisclosureResult<Vec<WorkflowAction>> {
        let caps = self.capabilities_of(actor).await?;
        let application = self.load(id).await?;
        let relation = Relation::of(&application, actor);
        Ok(ApplicationStateMachine::available_actions(application.status)
            .into_iter()
            .filter(|action| self.gate.allows(&caps, Operation::Workflow(*action), relation))
            .collect())
    }
}

fn required(value: Option<&str>, field: &str) -> DisclosureResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(DisclosureError::InvalidInput(format!("{field} is required"))),
    }
}
