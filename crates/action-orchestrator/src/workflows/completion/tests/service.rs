use chrono::Duration;

use super::common::*;
use crate::workflows::completion::lifecycle::{MicroActionStatus, TransitionError};
use crate::workflows::completion::service::CompletionServiceError;
use crate::workflows::notice::NoticeLevel;
use crate::workflows::orchestration::{
    CandidateAction, DerivedFrom, OrchestrationEngine, PropertyId, RiskLevel, SignalCounts,
};
use crate::workflows::storage::RepositoryError;

#[test]
fn completes_pending_action_once() {
    let (service, repository) = build_service(vec![pending("gutter")]);

    let transition = service
        .complete_action(&action_id("gutter"), hired_draft())
        .expect("completion succeeds");

    assert!(transition.changed);
    assert_eq!(transition.notice.level, NoticeLevel::Success);
    assert_eq!(transition.action.status, MicroActionStatus::Completed);
    let record = transition.action.completion.as_ref().expect("record stored");
    assert_eq!(record.cost(), Some(180.0));
    assert_eq!(repository.commits(), 1);
}

#[test]
fn repeated_completion_returns_stored_record() {
    let (service, repository) = build_service(vec![pending("gutter")]);
    let first = service
        .complete_action(&action_id("gutter"), hired_draft())
        .expect("first completion");

    let mut retry = hired_draft();
    retry.notes = "different notes on retry".to_string();
    let second = service
        .complete_action(&action_id("gutter"), retry)
        .expect("retry is not an error");

    assert!(!second.changed);
    assert_eq!(second.notice.level, NoticeLevel::Info);
    assert_eq!(second.action, first.action);
    assert_eq!(repository.commits(), 1);
}

#[test]
fn invalid_draft_persists_nothing() {
    let (service, repository) = build_service(vec![pending("gutter")]);
    let mut draft = hired_draft();
    draft.did_it_myself = true;
    draft.cost = None;
    draft.service_provider_rating = None;

    let err = service
        .complete_action(&action_id("gutter"), draft)
        .expect_err("provider on diy work is rejected");

    assert!(matches!(err, CompletionServiceError::Validation(_)));
    let stored = repository.stored("gutter").expect("still stored");
    assert_eq!(stored.status, MicroActionStatus::Pending);
    assert!(stored.completion.is_none());
    assert_eq!(repository.commits(), 0);
}

#[test]
fn dismissed_action_cannot_be_completed() {
    let (service, _) = build_service(vec![pending("gutter")]);
    service
        .dismiss_action(&action_id("gutter"))
        .expect("dismiss succeeds");

    let err = service
        .complete_action(&action_id("gutter"), hired_draft())
        .expect_err("cross-terminal move refused");

    match err {
        CompletionServiceError::Transition(TransitionError { from, to }) => {
            assert_eq!(from, "DISMISSED");
            assert_eq!(to, "COMPLETED");
        }
        other => panic!("expected transition error, got {other:?}"),
    }
}

#[test]
fn dismissal_is_idempotent_and_stamped() {
    let (service, repository) = build_service(vec![pending("gutter")]);

    let first = service
        .dismiss_action(&action_id("gutter"))
        .expect("dismiss succeeds");
    assert!(first.changed);
    assert_eq!(first.action.dismissed_at, Some(now()));

    let second = service
        .dismiss_action(&action_id("gutter"))
        .expect("second dismiss is a no-op");
    assert!(!second.changed);
    assert_eq!(repository.commits(), 1);
}

#[test]
fn stale_read_surfaces_conflict() {
    let (service, repository) = build_service(vec![pending("gutter")]);
    let stale = repository.stored("gutter").expect("stored");
    repository.overwrite_status("gutter", MicroActionStatus::Dismissed);

    let err = crate::workflows::completion::repository::MicroActionRepository::commit_transition(
        repository.as_ref(),
        &stale.id,
        stale.status,
        crate::workflows::completion::domain::TransitionPayload::Dismissal {
            dismissed_at: now(),
        },
    )
    .expect_err("compare-and-set fails");
    assert_eq!(err, RepositoryError::Conflict);

    let err = service
        .complete_action(&action_id("gutter"), hired_draft())
        .expect_err("completion after concurrent dismissal");
    assert!(matches!(err, CompletionServiceError::Transition(_)));
}

#[test]
fn unknown_action_is_not_found() {
    let (service, _) = build_service(Vec::new());
    let err = service
        .dismiss_action(&action_id("missing"))
        .expect_err("no such action");
    assert!(matches!(
        err,
        CompletionServiceError::Repository(RepositoryError::NotFound)
    ));
}

#[test]
fn seeds_micro_actions_from_summary_without_resetting_existing() {
    let property_id = PropertyId("prop-1".to_string());
    let candidate = |id: &str, risk_level: RiskLevel, exposure: Option<f64>| CandidateAction {
        id: action_id(id),
        property_id: property_id.clone(),
        title: format!("Action {id}"),
        category: "exterior".to_string(),
        risk_level,
        exposure,
        upstream_confidence: None,
        observed_at: now() - Duration::days(1),
        duplicate_of: None,
        snoozed_until: None,
    };
    let summary = OrchestrationEngine::default().summarize(
        property_id.clone(),
        vec![
            candidate("paint", RiskLevel::Low, None),
            candidate("roof", RiskLevel::Critical, Some(12_000.0)),
            candidate("gutter", RiskLevel::Medium, None),
        ],
        SignalCounts::default(),
        DerivedFrom::default(),
        now(),
    );

    let (service, _) = build_service(Vec::new());
    service
        .complete_action(&action_id("roof"), hired_draft())
        .expect_err("not seeded yet");

    let seeded = service
        .seed_from_summary(&summary, 2)
        .expect("seeding succeeds");
    assert_eq!(seeded.len(), 2);
    assert_eq!(seeded[0].id, action_id("roof"));
    assert_eq!(seeded[0].eta_minutes, 90);
    assert_eq!(
        seeded[0].detail,
        "High risk severity; High financial exposure; No blocking conditions detected"
    );
    assert_eq!(seeded[1].id, action_id("gutter"));

    service
        .complete_action(&action_id("roof"), hired_draft())
        .expect("seeded action completes");
    let reseeded = service
        .seed_from_summary(&summary, 2)
        .expect("reseeding succeeds");
    assert_eq!(reseeded[0].status, MicroActionStatus::Completed);
}
