mod common;

use common::*;
use disclosure_storage::ApplicationQuery;
use disclosure_types::{
    ApplicationPatch, ApplicationStatus, Contributor, ContributorIdentity, DisclosureError,
    EmployeeCategory, EmployeeType, FilingType, IprType,
};

#[tokio::test]
async fn create_requires_file_new() {
    let h = harness();
    let err = h
        .service
        .create_application(
            &actor(REVIEWER),
            new_application(IprType::Patent, EmployeeType::Staff),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DisclosureError::PermissionDenied { .. }));

    let app = h.draft().await;
    assert_eq!(app.status, ApplicationStatus::Draft);
    assert_eq!(app.version, 1);
    assert_eq!(app.contributors.len(), 1);
    assert_eq!(
        app.contributors[0].identity,
        ContributorIdentity::Uid(APPLICANT.into())
    );
    assert_eq!(app.contributors[0].category, EmployeeCategory::Internal);
}

#[tokio::test]
async fn draft_edits_only_while_editable() {
    let h = harness();
    let app = h.draft().await;
    let applicant = actor(APPLICANT);

    let updated = h
        .service
        .update_draft(
            &app.id,
            &applicant,
            ApplicationPatch {
                title: Some("Revised title".into()),
                ipr_type: Some(IprType::Design),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Revised title");
    assert_eq!(updated.ipr_type, IprType::Design);
    assert_eq!(updated.description, app.description);

    let err = h
        .service
        .update_draft(&app.id, &actor(REVIEWER), ApplicationPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DisclosureError::PermissionDenied { .. }));

    h.service.submit(&app.id, &applicant).await.unwrap();
    let err = h
        .service
        .update_draft(&app.id, &applicant, ApplicationPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DisclosureError::InvalidState(_)));
}

#[tokio::test]
async fn contributors_are_unique_per_identity() {
    let h = harness();
    let app = h.draft().await;
    let applicant = actor(APPLICANT);

    h.service
        .add_contributor(
            &app.id,
            &applicant,
            Contributor::external(
                ContributorIdentity::Email("Partner@Industry.com".into()),
                "industry partner",
            ),
        )
        .await
        .unwrap();

    let err = h
        .service
        .add_contributor(
            &app.id,
            &applicant,
            Contributor::external(
                ContributorIdentity::Email("partner@industry.com".into()),
                "duplicate",
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DisclosureError::DuplicateContributor(_)));

    let invalid = Contributor {
        employee_type: None,
        ..Contributor::internal(
            ContributorIdentity::Uid("u-9".into()),
            EmployeeType::Staff,
            "inventor",
        )
    };
    let err = h
        .service
        .add_contributor(&app.id, &applicant, invalid)
        .await
        .unwrap_err();
    assert!(matches!(err, DisclosureError::InvalidInput(_)));

    let removed = h
        .service
        .remove_contributor(&app.id, &applicant, "partner@industry.com")
        .await
        .unwrap();
    assert_eq!(removed.contributors.len(), 1);

    let err = h
        .service
        .remove_contributor(&app.id, &applicant, APPLICANT)
        .await
        .unwrap_err();
    assert!(matches!(err, DisclosureError::InvalidInput(_)));
}

#[tokio::test]
async fn school_assignment_needs_capability() {
    let h = harness();
    let app = h.submitted().await;

    let err = h
        .service
        .assign_school(&app.id, &actor(HEAD), "School of Engineering")
        .await
        .unwrap_err();
    assert!(matches!(err, DisclosureError::PermissionDenied { .. }));

    let assigned = h
        .service
        .assign_school(&app.id, &actor(REGISTRAR), " School of Engineering ")
        .await
        .unwrap();
    assert_eq!(assigned.school.as_deref(), Some("School of Engineering"));
    assert_eq!(assigned.status, ApplicationStatus::Submitted);
}

#[tokio::test]
async fn cancel_only_from_editable_statuses() {
    let h = harness();
    let app = h.submitted().await;
    let err = h
        .service
        .cancel(&app.id, &actor(APPLICANT), "Changed my mind")
        .await
        .unwrap_err();
    assert!(matches!(err, DisclosureError::InvalidTransition { .. }));

    let draft = h.draft().await;
    let cancelled = h
        .service
        .cancel(&draft.id, &actor(APPLICANT), "Duplicate filing")
        .await
        .unwrap();
    assert_eq!(cancelled.application.status, ApplicationStatus::Cancelled);
}

#[tokio::test]
async fn complete_filing_from_provisional() {
    let h = harness();
    let provisional = h.submitted().await;
    let applicant = actor(APPLICANT);

    let err = h
        .service
        .create_complete_from_provisional(&provisional.id, &applicant)
        .await
        .unwrap_err();
    assert!(matches!(err, DisclosureError::InvalidState(_)));

    h.advance_to_govt_filed(&provisional.id).await;

    let err = h
        .service
        .create_complete_from_provisional(&provisional.id, &actor(STUDENT))
        .await
        .unwrap_err();
    assert!(matches!(err, DisclosureError::PermissionDenied { .. }));

    let complete = h
        .service
        .create_complete_from_provisional(&provisional.id, &applicant)
        .await
        .unwrap();
    assert_eq!(complete.status, ApplicationStatus::Draft);
    assert_eq!(complete.filing_type, FilingType::Complete);
    assert_eq!(complete.source_provisional_id.as_ref(), Some(&provisional.id));
    assert_eq!(complete.title, provisional.title);
    assert_eq!(complete.contributors, provisional.contributors);
    assert!(complete.govt_application_id.is_none());

    let err = h
        .service
        .create_complete_from_provisional(&provisional.id, &applicant)
        .await
        .unwrap_err();
    assert!(matches!(err, DisclosureError::InvalidState(_)));

    // A complete filing is not itself a source
    let err = h
        .service
        .create_complete_from_provisional(&complete.id, &applicant)
        .await
        .unwrap_err();
    assert!(matches!(err, DisclosureError::InvalidState(_)));

    let mine = h
        .service
        .list_applications(ApplicationQuery::default().with_applicant(applicant))
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
}
