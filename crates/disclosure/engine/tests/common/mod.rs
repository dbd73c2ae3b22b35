#![allow(dead_code)]

use disclosure_engine::{
    DisclosureService, EngineConfig, StaticCapabilityResolver, StaticMentorDirectory,
    SuggestionProposal,
};
use disclosure_storage::InMemoryDisclosureStore;
use disclosure_types::{
    ActorId, Application, ApplicationId, ApplicationStatus, DecisionOption, EmployeeType,
    FilingType, IncentivePolicy, IprType, Money, NewApplication, ProjectType, SuggestionId,
};
use std::sync::Arc;

pub const APPLICANT: &str = "applicant-1";
pub const STUDENT: &str = "student-1";
pub const MENTOR: &str = "mentor-1";
pub const REVIEWER: &str = "drd-member-1";
pub const HEAD: &str = "drd-head-1";
pub const FILING_OFFICER: &str = "filing-officer-1";
pub const ADMIN: &str = "admin-1";
pub const REGISTRAR: &str = "registrar-1";

pub fn actor(name: &str) -> ActorId {
    ActorId::new(name)
}

pub struct Harness {
    pub service: Arc<DisclosureService<InMemoryDisclosureStore>>,
    pub store: Arc<InMemoryDisclosureStore>,
    pub resolver: Arc<StaticCapabilityResolver>,
    pub mentors: Arc<StaticMentorDirectory>,
}

pub fn harness() -> Harness {
    harness_with_policies(Vec::new())
}

pub fn patent_policy() -> IncentivePolicy {
    IncentivePolicy::new(IprType::Patent, 50, Money::from_major(50_000))
}

pub fn harness_with_policies(policies: Vec<IncentivePolicy>) -> Harness {
    let store = Arc::new(InMemoryDisclosureStore::with_policies(policies));

    let resolver = Arc::new(StaticCapabilityResolver::new());
    resolver.grant(&actor(APPLICANT), ["ipr.file_new"]);
    resolver.grant(&actor(STUDENT), ["ipr.file_new"]);
    resolver.grant(&actor(REVIEWER), ["ipr.review"]);
    resolver.grant(&actor(HEAD), ["ipr.review", "ipr.approve"]);
    resolver.grant(&actor(FILING_OFFICER), ["ipr.review"]);
    resolver.grant(&actor(ADMIN), ["ipr.admin"]);
    resolver.grant(&actor(REGISTRAR), ["ipr.assign_school"]);

    let mentors = Arc::new(StaticMentorDirectory::new());
    mentors.assign(actor(STUDENT), actor(MENTOR));

    let service = DisclosureService::new(store.clone(), resolver.clone(), EngineConfig::default())
        .with_mentor_directory(mentors.clone());

    Harness {
        service: Arc::new(service),
        store,
        resolver,
        mentors,
    }
}

pub fn new_application(ipr_type: IprType, applicant_type: EmployeeType) -> NewApplication {
    NewApplication {
        ipr_type,
        project_type: ProjectType::FacultyResearch,
        filing_type: FilingType::Provisional,
        title: "Self-calibrating soil moisture probe".into(),
        description: "A capacitive probe that recalibrates against rainfall events".into(),
        remarks: String::new(),
        applicant_type,
        sdg_codes: ["SDG2".to_string()].into_iter().collect(),
        details: [("abstract".to_string(), "Probe abstract".to_string())]
            .into_iter()
            .collect(),
    }
}

impl Harness {
    /// A staff patent draft owned by APPLICANT
    pub async fn draft(&self) -> Application {
        self.service
            .create_application(
                &actor(APPLICANT),
                new_application(IprType::Patent, EmployeeType::Staff),
            )
            .await
            .unwrap()
    }

    pub async fn submitted(&self) -> Application {
        let app = self.draft().await;
        let outcome = self.service.submit(&app.id, &actor(APPLICANT)).await.unwrap();
        assert_eq!(outcome.application.status, ApplicationStatus::Submitted);
        outcome.application
    }

    pub async fn propose(&self, id: &ApplicationId, field: &str, value: &str) -> SuggestionId {
        self.service
            .propose_suggestion(id, &actor(REVIEWER), SuggestionProposal::new(field, value))
            .await
            .unwrap()
            .id
    }

    /// Head approves, head forwards, filing officer records the govt id
    pub async fn advance_to_govt_filed(&self, id: &ApplicationId) -> Application {
        let head = actor(HEAD);
        self.service
            .record_decision(id, &head, DecisionOption::Approve, "Novel and useful")
            .await
            .unwrap();
        self.service
            .transition(
                id,
                &head,
                disclosure_engine::TransitionRequest::new(
                    disclosure_types::WorkflowAction::HeadApprove,
                ),
            )
            .await
            .unwrap();
        let outcome = self
            .service
            .add_govt_id(id, &actor(FILING_OFFICER), "IN-202641000123")
            .await
            .unwrap();
        assert_eq!(
            outcome.application.status,
            ApplicationStatus::GovtApplicationFiled
        );
        outcome.application
    }
}
