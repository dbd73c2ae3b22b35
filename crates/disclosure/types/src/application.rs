//! Application aggregate: the disclosure being reviewed
//!
//! An Application owns its contributors and its status. Reviews and
//! suggestions reference it by id and persist independently.

use crate::{
    ActorId, ApplicationId, Contributor, ContributorAward, DisclosureError, DisclosureResult,
    EmployeeType, IncentiveCredit, Money, Points,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Kind of intellectual property being disclosed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IprType {
    Patent,
    Copyright,
    Design,
    Trademark,
}

impl IprType {
    pub const ALL: [IprType; 4] = [
        IprType::Patent,
        IprType::Copyright,
        IprType::Design,
        IprType::Trademark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IprType::Patent => "patent",
            IprType::Copyright => "copyright",
            IprType::Design => "design",
            IprType::Trademark => "trademark",
        }
    }
}

impl std::fmt::Display for IprType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IprType {
    type Err = DisclosureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DisclosureError::invalid_enum("ipr_type", s))
    }
}

/// Provisional filings reserve a priority date; complete filings follow
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingType {
    Provisional,
    Complete,
}

impl FilingType {
    pub const ALL: [FilingType; 2] = [FilingType::Provisional, FilingType::Complete];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilingType::Provisional => "provisional",
            FilingType::Complete => "complete",
        }
    }
}

impl std::fmt::Display for FilingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FilingType {
    type Err = DisclosureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DisclosureError::invalid_enum("filing_type", s))
    }
}

/// The kind of work the disclosure came out of
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    PhdResearch,
    PgProject,
    UgProject,
    FacultyResearch,
    IndustryCollaboration,
    Other,
}

impl ProjectType {
    pub const ALL: [ProjectType; 6] = [
        ProjectType::PhdResearch,
        ProjectType::PgProject,
        ProjectType::UgProject,
        ProjectType::FacultyResearch,
        ProjectType::IndustryCollaboration,
        ProjectType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::PhdResearch => "phd_research",
            ProjectType::PgProject => "pg_project",
            ProjectType::UgProject => "ug_project",
            ProjectType::FacultyResearch => "faculty_research",
            ProjectType::IndustryCollaboration => "industry_collaboration",
            ProjectType::Other => "other",
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectType {
    type Err = DisclosureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DisclosureError::invalid_enum("project_type", s))
    }
}

/// Workflow status of an Application
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    PendingMentorApproval,
    Submitted,
    UnderDrdReview,
    ChangesRequired,
    Resubmitted,
    RecommendedToHead,
    DrdApproved,
    UnderHeadReview,
    HeadApproved,
    DrdRejected,
    HeadRejected,
    SubmittedToGovt,
    GovtApplicationFiled,
    GovtRejected,
    #[serde(alias = "completed")]
    Published,
    Cancelled,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 17] = [
        ApplicationStatus::Draft,
        ApplicationStatus::PendingMentorApproval,
        ApplicationStatus::Submitted,
        ApplicationStatus::UnderDrdReview,
        ApplicationStatus::ChangesRequired,
        ApplicationStatus::Resubmitted,
        ApplicationStatus::RecommendedToHead,
        ApplicationStatus::DrdApproved,
        ApplicationStatus::UnderHeadReview,
        ApplicationStatus::HeadApproved,
        ApplicationStatus::DrdRejected,
        ApplicationStatus::HeadRejected,
        ApplicationStatus::SubmittedToGovt,
        ApplicationStatus::GovtApplicationFiled,
        ApplicationStatus::GovtRejected,
        ApplicationStatus::Published,
        ApplicationStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::PendingMentorApproval => "pending_mentor_approval",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderDrdReview => "under_drd_review",
            ApplicationStatus::ChangesRequired => "changes_required",
            ApplicationStatus::Resubmitted => "resubmitted",
            ApplicationStatus::RecommendedToHead => "recommended_to_head",
            ApplicationStatus::DrdApproved => "drd_approved",
            ApplicationStatus::UnderHeadReview => "under_head_review",
            ApplicationStatus::HeadApproved => "head_approved",
            ApplicationStatus::DrdRejected => "drd_rejected",
            ApplicationStatus::HeadRejected => "head_rejected",
            ApplicationStatus::SubmittedToGovt => "submitted_to_govt",
            ApplicationStatus::GovtApplicationFiled => "govt_application_filed",
            ApplicationStatus::GovtRejected => "govt_rejected",
            ApplicationStatus::Published => "published",
            ApplicationStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal statuses accept no further workflow action, override included
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Published
                | ApplicationStatus::DrdRejected
                | ApplicationStatus::HeadRejected
                | ApplicationStatus::GovtRejected
                | ApplicationStatus::Cancelled
        )
    }

    /// Statuses in which the applicant may edit fields and contributors
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Draft | ApplicationStatus::ChangesRequired
        )
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = DisclosureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "completed" {
            return Ok(ApplicationStatus::Published);
        }
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DisclosureError::invalid_enum("status", s))
    }
}

/// A field of the Application that reviewers may propose edits to
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationField {
    Title,
    Description,
    Remarks,
    IprType,
    ProjectType,
    FilingType,
    /// Free-form detail addressed by a field path, e.g. `details` / `abstract`
    Detail(String),
}

impl ApplicationField {
    /// Resolve a field name (and optional path) as sent by clients
    pub fn parse(field_name: &str, field_path: Option<&str>) -> DisclosureResult<Self> {
        let field = match field_name {
            "title" => ApplicationField::Title,
            "description" => ApplicationField::Description,
            "remarks" => ApplicationField::Remarks,
            "ipr_type" | "iprType" => ApplicationField::IprType,
            "project_type" | "projectType" => ApplicationField::ProjectType,
            "filing_type" | "filingType" => ApplicationField::FilingType,
            "details" => match field_path {
                Some(path) if !path.trim().is_empty() => {
                    ApplicationField::Detail(path.trim().to_string())
                }
                _ => {
                    return Err(DisclosureError::InvalidInput(
                        "details suggestions need a field path".into(),
                    ))
                }
            },
            other => {
                return Err(DisclosureError::InvalidInput(format!(
                    "unknown field: {other}"
                )))
            }
        };
        Ok(field)
    }

    pub fn name(&self) -> &str {
        match self {
            ApplicationField::Title => "title",
            ApplicationField::Description => "description",
            ApplicationField::Remarks => "remarks",
            ApplicationField::IprType => "ipr_type",
            ApplicationField::ProjectType => "project_type",
            ApplicationField::FilingType => "filing_type",
            ApplicationField::Detail(_) => "details",
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            ApplicationField::Detail(path) => Some(path),
            _ => None,
        }
    }

    /// Whether the field only accepts values from a fixed domain
    pub fn is_enumerated(&self) -> bool {
        matches!(
            self,
            ApplicationField::IprType | ApplicationField::ProjectType | ApplicationField::FilingType
        )
    }
}

/// Input for creating a new draft
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewApplication {
    pub ipr_type: IprType,
    pub project_type: ProjectType,
    pub filing_type: FilingType,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub remarks: String,
    /// Employee type of the applicant; students may be routed to a mentor
    pub applicant_type: EmployeeType,
    #[serde(default)]
    pub sdg_codes: BTreeSet<String>,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

/// Applicant edits to a draft. `None` leaves the field untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ApplicationPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub remarks: Option<String>,
    pub ipr_type: Option<IprType>,
    pub project_type: Option<ProjectType>,
    pub filing_type: Option<FilingType>,
    pub sdg_codes: Option<BTreeSet<String>>,
    pub details: Option<BTreeMap<String, String>>,
}

/// The disclosure aggregate root
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub ipr_type: IprType,
    pub project_type: ProjectType,
    pub status: ApplicationStatus,
    pub filing_type: FilingType,
    pub title: String,
    pub description: String,
    pub remarks: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
    pub applicant: ActorId,
    pub applicant_type: EmployeeType,
    /// Mentor resolved at submit time, for student submissions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentor: Option<ActorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    pub contributors: Vec<Contributor>,
    #[serde(default)]
    pub sdg_codes: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub govt_application_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incentive_amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_awarded: Option<Points>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credited_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub awards: Vec<ContributorAward>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_provisional_id: Option<ApplicationId>,
    #[serde(default)]
    pub changes_requested_by_mentor: bool,
    /// Optimistic concurrency version, bumped by storage on every commit
    #[serde(default)]
    pub version: u64,
}

impl Application {
    /// Create a new draft owned by `applicant`
    pub fn new(applicant: ActorId, input: NewApplication) -> Self {
        let now = Utc::now();
        Self {
            id: ApplicationId::generate(),
            ipr_type: input.ipr_type,
            project_type: input.project_type,
            status: ApplicationStatus::Draft,
            filing_type: input.filing_type,
            title: input.title,
            description: input.description,
            remarks: input.remarks,
            details: input.details,
            applicant,
            applicant_type: input.applicant_type,
            mentor: None,
            school: None,
            contributors: Vec::new(),
            sdg_codes: input.sdg_codes,
            created_at: now,
            updated_at: now,
            submitted_at: None,
            govt_application_id: None,
            publication_id: None,
            incentive_amount: None,
            points_awarded: None,
            credited_at: None,
            awards: Vec::new(),
            source_provisional_id: None,
            changes_requested_by_mentor: false,
            version: 0,
        }
    }

    pub fn is_applicant(&self, actor: &ActorId) -> bool {
        self.applicant == *actor
    }

    pub fn is_credited(&self) -> bool {
        self.incentive_amount.is_some()
    }

    /// Current value of a field, as the string a suggestion would replace
    pub fn field_value(&self, field: &ApplicationField) -> Option<String> {
        match field {
            ApplicationField::Title => Some(self.title.clone()),
            ApplicationField::Description => Some(self.description.clone()),
            ApplicationField::Remarks => Some(self.remarks.clone()),
            ApplicationField::IprType => Some(self.ipr_type.as_str().to_string()),
            ApplicationField::ProjectType => Some(self.project_type.as_str().to_string()),
            ApplicationField::FilingType => Some(self.filing_type.as_str().to_string()),
            ApplicationField::Detail(path) => self.details.get(path).cloned(),
        }
    }

    /// Overwrite a field. Enumerated fields reject values outside their
    /// domain and leave the Application untouched.
    pub fn set_field(&mut self, field: &ApplicationField, value: &str) -> DisclosureResult<()> {
        match field {
            ApplicationField::Title => self.title = value.to_string(),
            ApplicationField::Description => self.description = value.to_string(),
            ApplicationField::Remarks => self.remarks = value.to_string(),
            ApplicationField::IprType => self.ipr_type = value.parse()?,
            ApplicationField::ProjectType => self.project_type = value.parse()?,
            ApplicationField::FilingType => self.filing_type = value.parse()?,
            ApplicationField::Detail(path) => {
                self.details.insert(path.clone(), value.to_string());
            }
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Apply applicant edits
    pub fn apply_patch(&mut self, patch: ApplicationPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(remarks) = patch.remarks {
            self.remarks = remarks;
        }
        if let Some(ipr_type) = patch.ipr_type {
            self.ipr_type = ipr_type;
        }
        if let Some(project_type) = patch.project_type {
            self.project_type = project_type;
        }
        if let Some(filing_type) = patch.filing_type {
            self.filing_type = filing_type;
        }
        if let Some(sdg_codes) = patch.sdg_codes {
            self.sdg_codes = sdg_codes;
        }
        if let Some(details) = patch.details {
            self.details = details;
        }
        self.updated_at = Utc::now();
    }

    /// Add a contributor, rejecting a second entry for the same identity
    pub fn add_contributor(&mut self, contributor: Contributor) -> DisclosureResult<()> {
        contributor.validate()?;
        if self
            .contributors
            .iter()
            .any(|c| c.identity.same_person(&contributor.identity))
        {
            return Err(DisclosureError::DuplicateContributor(
                contributor.identity.to_string(),
            ));
        }
        self.contributors.push(contributor);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove a contributor by identity key, returning it if present
    pub fn remove_contributor(&mut self, identity_key: &str) -> Option<Contributor> {
        let index = self
            .contributors
            .iter()
            .position(|c| c.identity.matches_key(identity_key))?;
        self.updated_at = Utc::now();
        Some(self.contributors.remove(index))
    }

    /// Record an incentive credit. Returns `false` without touching the
    /// Application when a credit is already present.
    pub fn apply_credit(&mut self, credit: &IncentiveCredit) -> bool {
        if self.is_credited() {
            return false;
        }
        self.incentive_amount = Some(credit.total_incentive);
        self.points_awarded = Some(credit.total_points);
        self.credited_at = Some(credit.credited_at);
        self.awards = credit.awards.clone();
        true
    }
}
