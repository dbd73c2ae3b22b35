use crate::{StorageError, StorageResult};
use disclosure_types::{
    ActorId, Application, ApplicationId, ApplicationStatus, EditSuggestion, Review, ReviewAppend,
};

/// A suggestion write carried by a commit.
#[derive(Debug, Clone)]
pub enum SuggestionWrite {
    /// A newly proposed suggestion; its id must not exist yet
    Insert(EditSuggestion),
    /// A resolution; the stored copy must still be pending
    Resolve(EditSuggestion),
}

impl SuggestionWrite {
    pub fn suggestion(&self) -> &EditSuggestion {
        match self {
            SuggestionWrite::Insert(s) | SuggestionWrite::Resolve(s) => s,
        }
    }
}

/// Atomic unit of work against one Application aggregate.
///
/// Applied all-or-nothing: the stored version must equal
/// `expected_version`, every suggestion write must satisfy its
/// precondition, and only then are the application, reviews and
/// suggestions written.
#[derive(Debug, Clone)]
pub struct AggregateCommit {
    pub application: Application,
    pub expected_version: u64,
    pub reviews: Vec<ReviewAppend>,
    pub suggestions: Vec<SuggestionWrite>,
}

impl AggregateCommit {
    /// Commit `application` against the version it was loaded at
    pub fn new(application: Application) -> Self {
        let expected_version = application.version;
        Self {
            application,
            expected_version,
            reviews: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_review(mut self, review: ReviewAppend) -> Self {
        self.reviews.push(review);
        self
    }

    pub fn with_suggestion(mut self, write: SuggestionWrite) -> Self {
        self.suggestions.push(write);
        self
    }
}

/// What a commit wrote.
#[derive(Debug, Clone)]
pub struct CommitReceipt {
    /// The application as stored, with its new version
    pub application: Application,
    /// Sealed reviews, in chain order
    pub reviews: Vec<Review>,
}

/// Filters for listing applications. Empty filters match everything.
#[derive(Debug, Clone, Default)]
pub struct ApplicationQuery {
    pub status: Option<ApplicationStatus>,
    pub applicant: Option<ActorId>,
    pub limit: usize,
    pub offset: usize,
}

impl ApplicationQuery {
    pub fn with_status(mut self, status: ApplicationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_applicant(mut self, applicant: ActorId) -> Self {
        self.applicant = Some(applicant);
        self
    }

    pub fn matches(&self, application: &Application) -> bool {
        self.status.map_or(true, |s| application.status == s)
            && self
                .applicant
                .as_ref()
                .map_or(true, |a| application.applicant == *a)
    }
}

/// Hash of one review record, linked to its predecessor.
pub fn compute_review_hash(
    application_id: &ApplicationId,
    sequence: u64,
    review: &ReviewAppend,
    previous_hash: Option<&str>,
) -> StorageResult<String> {
    let serializable = serde_json::json!({
        "previous_hash": previous_hash,
        "application_id": application_id.0,
        "sequence": sequence,
        "reviewer": review.reviewer.0,
        "reviewer_role": review.reviewer_role,
        "action": review.action,
        "decision": review.decision,
        "from_status": review.from_status,
        "to_status": review.to_status,
        "comments": review.comments,
        "reviewed_at": review.reviewed_at,
    });
    let serialized = serde_json::to_vec(&serializable)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(blake3::hash(&serialized).to_hex().to_string())
}

/// Recompute every link of a review chain (oldest first).
pub fn verify_review_chain(reviews: &[Review]) -> StorageResult<bool> {
    let mut previous: Option<&str> = None;
    for (index, review) in reviews.iter().enumerate() {
        if review.sequence != index as u64 + 1 || review.previous_hash.as_deref() != previous {
            return Ok(false);
        }
        let append = ReviewAppend {
            reviewer: review.reviewer.clone(),
            reviewer_role: review.reviewer_role,
            action: review.action,
            decision: review.decision,
            from_status: review.from_status,
            to_status: review.to_status,
            comments: review.comments.clone(),
            reviewed_at: review.reviewed_at,
        };
        let expected =
            compute_review_hash(&review.application_id, review.sequence, &append, previous)?;
        if expected != review.hash {
            return Ok(false);
        }
        previous = Some(review.hash.as_str());
    }
    Ok(true)
}
