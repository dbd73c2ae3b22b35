//! MentorGate: optional pre-review approval for student submissions

use async_trait::async_trait;
use dashmap::DashMap;
use disclosure_types::{ActorId, Application, DisclosureResult};
use std::sync::Arc;

/// Directory answering "who mentors this applicant?"
#[async_trait]
pub trait MentorDirectory: Send + Sync {
    async fn mentor_for(&self, applicant: &ActorId) -> DisclosureResult<Option<ActorId>>;
}

/// Mentor directory backed by an in-process table
#[derive(Debug, Default)]
pub struct StaticMentorDirectory {
    mentors: DashMap<ActorId, ActorId>,
}

impl StaticMentorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&self, student: ActorId, mentor: ActorId) {
        self.mentors.insert(student, mentor);
    }

    pub fn unassign(&self, student: &ActorId) {
        self.mentors.remove(student);
    }
}

#[async_trait]
impl MentorDirectory for StaticMentorDirectory {
    async fn mentor_for(&self, applicant: &ActorId) -> DisclosureResult<Option<ActorId>> {
        Ok(self.mentors.get(applicant).map(|m| m.value().clone()))
    }
}

/// Where a submission goes next
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitRoute {
    /// Held for this mentor's approval
    Mentor(ActorId),
    /// Straight onto the review track
    Direct,
}

impl SubmitRoute {
    pub fn mentor(&self) -> Option<&ActorId> {
        match self {
            SubmitRoute::Mentor(mentor) => Some(mentor),
            SubmitRoute::Direct => None,
        }
    }
}

/// Decides whether a submission waits for a mentor
#[derive(Clone, Default)]
pub struct MentorGate {
    directory: Option<Arc<dyn MentorDirectory>>,
}

impl MentorGate {
    pub fn new(directory: Arc<dyn MentorDirectory>) -> Self {
        Self {
            directory: Some(directory),
        }
    }

    /// A gate that sends every submission straight to review
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Only student applicants are looked up; everyone else goes direct
    pub async fn route(&self, application: &Application) -> DisclosureResult<SubmitRoute> {
        if !application.applicant_type.is_student() {
            return Ok(SubmitRoute::Direct);
        }
        let Some(directory) = &self.directory else {
            return Ok(SubmitRoute::Direct);
        };
        Ok(match directory.mentor_for(&application.applicant).await? {
            Some(mentor) => SubmitRoute::Mentor(mentor),
            None => SubmitRoute::Direct,
        })
    }
}
