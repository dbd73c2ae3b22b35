//! DisclosureService: the engine's single entry point
//!
//! Every mutating operation resolves the actor's capabilities afresh,
//! takes the Application's lock, loads it, checks the gate, and applies
//! one [`AggregateCommit`]. Events are published only after the commit.

use crate::config::EngineConfig;
use crate::events::EventBus;
use crate::locks::AggregateLocks;
use crate::mentor_gate::{MentorDirectory, MentorGate};
use crate::permission_gate::{CapabilityResolver, Operation, PermissionGate, Relation};
use chrono::Utc;
use disclosure_storage::{
    verify_review_chain, AggregateCommit, ApplicationQuery, DisclosureStore,
};
use disclosure_types::{
    ActorId, Application, ApplicationId, ApplicationPatch, ApplicationStatus, CapabilitySet,
    Contributor, ContributorIdentity, DisclosureError, DisclosureResult, DomainEvent, FilingType,
    NewApplication, Review,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Orchestrates the disclosure workflow over a [`DisclosureStore`]
pub struct DisclosureService<S> {
    pub(crate) store: Arc<S>,
    pub(crate) capabilities: Arc<dyn CapabilityResolver>,
    pub(crate) gate: PermissionGate,
    pub(crate) mentors: MentorGate,
    pub(crate) events: EventBus,
    pub(crate) config: EngineConfig,
    pub(crate) locks: AggregateLocks,
}

impl<S: DisclosureStore> DisclosureService<S> {
    pub fn new(
        store: Arc<S>,
        capabilities: Arc<dyn CapabilityResolver>,
        config: EngineConfig,
    ) -> Self {
        let events = EventBus::new(config.events.channel_capacity);
        Self {
            store,
            capabilities,
            gate: PermissionGate::new(),
            mentors: MentorGate::disabled(),
            events,
            config,
            locks: AggregateLocks::new(),
        }
    }

    /// Route student submissions through the mentors this directory names
    pub fn with_mentor_directory(mut self, directory: Arc<dyn MentorDirectory>) -> Self {
        self.mentors = MentorGate::new(directory);
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.events.subscribe()
    }

    pub(crate) async fn capabilities_of(&self, actor: &ActorId) -> DisclosureResult<CapabilitySet> {
        self.capabilities.resolve(actor).await
    }

    pub(crate) async fn load(&self, id: &ApplicationId) -> DisclosureResult<Application> {
        self.store
            .get_application(id)
            .await?
            .ok_or_else(|| DisclosureError::ApplicationNotFound(id.clone()))
    }

    pub(crate) fn authorize(
        &self,
        caps: &CapabilitySet,
        operation: Operation,
        relation: Relation,
    ) -> DisclosureResult<()> {
        self.gate.check(caps, operation, relation).map_err(|err| {
            warn!(%operation, error = %err, "Request denied");
            err
        })
    }

    // ---- Lifecycle ----

    /// Create a draft owned by `actor`, who is recorded as its first contributor
    pub async fn create_application(
        &self,
        actor: &ActorId,
        input: NewApplication,
    ) -> DisclosureResult<Application> {
        let caps = self.capabilities_of(actor).await?;
        self.authorize(&caps, Operation::CreateApplication, Relation::none())?;
        if input.title.trim().is_empty() {
            return Err(DisclosureError::InvalidInput("title is required".into()));
        }

        let mut application = Application::new(actor.clone(), input);
        application.add_contributor(Contributor::internal(
            ContributorIdentity::Uid(actor.0.clone()),
            application.applicant_type,
            "applicant",
        ))?;

        let stored = self.store.insert_application(application).await?;
        info!(
            application_id = %stored.id,
            applicant = %actor,
            ipr_type = %stored.ipr_type,
            "Application created"
        );
        Ok(stored)
    }

    /// Applicant edits while the Application is editable
    pub async fn update_draft(
        &self,
        id: &ApplicationId,
        actor: &ActorId,
        patch: ApplicationPatch,
    ) -> DisclosureResult<Application> {
        let caps = self.capabilities_of(actor).await?;
        let _guard = self.locks.acquire(id).await;
        let application = self.load(id).await?;
        self.authorize(&caps, Operation::EditApplication, Relation::of(&application, actor))?;
        ensure_editable(&application)?;

        let mut next = application;
        next.apply_patch(patch);
        let receipt = self.store.commit(AggregateCommit::new(next)).await?;
        Ok(receipt.application)
    }

    pub async fn add_contributor(
        &self,
        id: &ApplicationId,
        actor: &ActorId,
        contributor: Contributor,
    ) -> DisclosureResult<Application> {
        let caps = self.capabilities_of(actor).await?;
        let _guard = self.locks.acquire(id).await;
        let application = self.load(id).await?;
        self.authorize(&caps, Operation::EditApplication, Relation::of(&application, actor))?;
        ensure_editable(&application)?;

        let identity = contributor.identity.clone();
        let mut next = application;
        next.add_contributor(contributor)?;
        let receipt = self.store.commit(AggregateCommit::new(next)).await?;

        self.events.publish(DomainEvent::ContributorAdded {
            application_id: id.clone(),
            identity,
            at: Utc::now(),
        });
        Ok(receipt.application)
    }

    /// Remove a contributor by uid or email. The applicant cannot be removed.
    pub async fn remove_contributor(
        &self,
        id: &ApplicationId,
        actor: &ActorId,
        identity_key: &str,
    ) -> DisclosureResult<Application> {
        let caps = self.capabilities_of(actor).await?;
        let _guard = self.locks.acquire(id).await;
        let application = self.load(id).await?;
        self.authorize(&caps, Operation::EditApplication, Relation::of(&application, actor))?;
        ensure_editable(&application)?;

        if ContributorIdentity::Uid(application.applicant.0.clone()).matches_key(identity_key) {
            return Err(DisclosureError::InvalidInput(
                "the applicant cannot be removed from their own application".into(),
            ));
        }

        let mut next = application;
        next.remove_contributor(identity_key).ok_or_else(|| {
            DisclosureError::InvalidInput(format!("no contributor matches {identity_key}"))
        })?;
        let receipt = self.store.commit(AggregateCommit::new(next)).await?;
        Ok(receipt.application)
    }

    pub async fn assign_school(
        &self,
        id: &ApplicationId,
        actor: &ActorId,
        school: &str,
    ) -> DisclosureResult<Application> {
        let caps = self.capabilities_of(actor).await?;
        self.authorize(&caps, Operation::AssignSchool, Relation::none())?;
        if school.trim().is_empty() {
            return Err(DisclosureError::InvalidInput("school is required".into()));
        }

        let _guard = self.locks.acquire(id).await;
        let mut next = self.load(id).await?;
        if next.status.is_terminal() {
            return Err(DisclosureError::InvalidState(format!(
                "application {id} is {}",
                next.status
            )));
        }
        next.school = Some(school.trim().to_string());
        next.updated_at = Utc::now();
        let receipt = self.store.commit(AggregateCommit::new(next)).await?;
        info!(application_id = %id, school, "School assigned");
        Ok(receipt.application)
    }

    /// Start the complete filing that follows a provisional one.
    ///
    /// The new draft copies the provisional's content and contributors and
    /// records where it came from. Each provisional yields at most one.
    pub async fn create_complete_from_provisional(
        &self,
        provisional_id: &ApplicationId,
        actor: &ActorId,
    ) -> DisclosureResult<Application> {
        let caps = self.capabilities_of(actor).await?;
        self.authorize(&caps, Operation::CreateApplication, Relation::none())?;

        let _guard = self.locks.acquire(provisional_id).await;
        let source = self.load(provisional_id).await?;
        if !source.is_applicant(actor) {
            return Err(DisclosureError::denied(
                Operation::CreateApplication,
                "only the provisional filing's applicant may do this",
            ));
        }
        if source.filing_type != FilingType::Provisional {
            return Err(DisclosureError::InvalidState(format!(
                "application {provisional_id} is not a provisional filing"
            )));
        }
        if !matches!(
            source.status,
            ApplicationStatus::GovtApplicationFiled | ApplicationStatus::Published
        ) {
            return Err(DisclosureError::InvalidState(format!(
                "provisional filing {provisional_id} is {}; it must be filed or published first",
                source.status
            )));
        }

        let existing = self
            .store
            .list_applications(ApplicationQuery::default().with_applicant(actor.clone()))
            .await?;
        if existing
            .iter()
            .any(|a| a.source_provisional_id.as_ref() == Some(provisional_id))
        {
            return Err(DisclosureError::InvalidState(format!(
                "provisional filing {provisional_id} already has a complete filing"
            )));
        }

        let mut complete = Application::new(
            actor.clone(),
            NewApplication {
                ipr_type: source.ipr_type,
                project_type: source.project_type,
                filing_type: FilingType::Complete,
                title: source.title.clone(),
                description: source.description.clone(),
                remarks: source.remarks.clone(),
                applicant_type: source.applicant_type,
                sdg_codes: source.sdg_codes.clone(),
                details: source.details.clone(),
            },
        );
        complete.contributors = source.contributors.clone();
        complete.school = source.school.clone();
        complete.source_provisional_id = Some(source.id.clone());

        let stored = self.store.insert_application(complete).await?;
        info!(
            application_id = %stored.id,
            source_provisional_id = %provisional_id,
            "Complete filing created from provisional"
        );
        Ok(stored)
    }

    // ---- Queries ----

    pub async fn get_application(&self, id: &ApplicationId) -> DisclosureResult<Application> {
        self.load(id).await
    }

    pub async fn list_applications(
        &self,
        query: ApplicationQuery,
    ) -> DisclosureResult<Vec<Application>> {
        Ok(self.store.list_applications(query).await?)
    }

    /// Review history, oldest first
    pub async fn reviews(&self, id: &ApplicationId) -> DisclosureResult<Vec<Review>> {
        Ok(self.store.list_reviews(id).await?)
    }

    /// Recompute the review chain's hash links
    pub async fn verify_reviews(&self, id: &ApplicationId) -> DisclosureResult<bool> {
        let reviews = self.store.list_reviews(id).await?;
        Ok(verify_review_chain(&reviews)?)
    }
}

fn ensure_editable(application: &Application) -> DisclosureResult<()> {
    if application.status.is_editable() {
        Ok(())
    } else {
        Err(DisclosureError::InvalidState(format!(
            "application {} is {}; edits are allowed in draft or changes_required",
            application.id, application.status
        )))
    }
}
