use std::sync::Arc;

use super::common::*;
use crate::workflows::allocation::domain::{FillMetric, FinalChoice};
use crate::workflows::allocation::engine::AllocationConfig;
use crate::workflows::allocation::repository::{
    PlacementEvent, RepositoryError, RunId, RunRepository,
};
use crate::workflows::allocation::service::{PlacementService, PlacementServiceError};

fn small_run_inputs() -> (
    crate::workflows::allocation::roster::PartnerRoster,
    Vec<crate::workflows::allocation::domain::ApplicantRecord>,
) {
    let roster = roster_with(vec![
        partner("Alpha", "S8", offer(2, 0)),
        partner("Beta", "S8", offer(1, 0)),
    ]);
    let cohort = vec![
        applicant("amy", "CS").with_wishes(term("S8"), vec![partner_id("Alpha")]),
        applicant("ben", "CS").with_wishes(term("S8"), vec![partner_id("Beta")]),
    ];
    (roster, cohort)
}

#[test]
fn run_persists_the_finished_allocation() {
    let (service, repository, _) = build_service();
    let (roster, cohort) = small_run_inputs();

    let run = service.run(roster, cohort).expect("run completes");

    let stored = repository
        .fetch(&run.run_id)
        .expect("fetch succeeds")
        .expect("run stored");
    assert_eq!(stored.cohort.len(), 2);
    assert!(stored
        .cohort
        .iter()
        .all(|a| a.placement(&term("S8")).map(FinalChoice::is_assigned) == Some(true)));
    assert_eq!(stored.summary.total_applicants, 2);
}

#[test]
fn run_ids_carry_the_sequence_prefix() {
    let (service, _, _) = build_service();
    let (roster, cohort) = small_run_inputs();

    let run = service.run(roster, cohort).expect("run completes");
    assert!(run.run_id.0.starts_with("run-"), "got {}", run.run_id.0);
}

#[test]
fn observer_receives_one_event_per_applicant_term_pair() {
    let (service, _, observer) = build_service();
    let (roster, cohort) = small_run_inputs();

    service.run(roster, cohort).expect("run completes");

    // Two applicants times two declared terms: one S8 assignment and one S9
    // no-request each.
    let events = observer.events();
    assert_eq!(events.len(), 4);
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, PlacementEvent::Assigned { .. }))
            .count(),
        2
    );
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, PlacementEvent::NoRequest { .. }))
            .count(),
        2
    );
}

#[test]
fn run_config_overrides_are_sanitized() {
    let (service, _, _) = build_service();
    let (roster, cohort) = small_run_inputs();

    let run = service
        .run_with(
            roster,
            cohort,
            AllocationConfig {
                penalty_coefficient: f64::NAN,
                ordered_wish_limit: 99,
                fill_metric: FillMetric::Count,
            },
        )
        .expect("run completes");

    assert_eq!(run.config.ordered_wish_limit, 5);
    assert!(run.config.penalty_coefficient.is_finite());
    assert_eq!(run.config.fill_metric, FillMetric::Count);
}

#[test]
fn get_propagates_not_found() {
    let (service, _, _) = build_service();

    match service.get(&RunId("run-does-not-exist".to_string())) {
        Err(PlacementServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not-found error, got {other:?}"),
    }
}

#[test]
fn repository_failures_surface_through_the_service() {
    let service = PlacementService::new(
        Arc::new(UnavailableRepository),
        Arc::new(RecordingObserver::default()),
        allocation_config(),
    );
    let (roster, cohort) = small_run_inputs();

    match service.run(roster, cohort) {
        Err(PlacementServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected unavailable error, got {other:?}"),
    }
}

#[test]
fn reranked_cohort_is_stored_in_processing_order() {
    let (service, _, _) = build_service();
    let roster = roster_with(vec![partner("Alpha", "S8", offer(10, 0))]);
    // First applicant requests both terms; with a steep penalty the
    // single-term second applicant overtakes them.
    let cohort = vec![
        applicant("amy", "CS")
            .with_wishes(term("S8"), vec![partner_id("Alpha")])
            .with_wishes(term("S9"), vec![partner_id("Alpha")]),
        applicant("ben", "CS").with_wishes(term("S8"), vec![partner_id("Alpha")]),
    ];

    let config = AllocationConfig {
        penalty_coefficient: 0.6,
        ..allocation_config()
    };
    let run = service.run_with(roster, cohort, config).expect("run completes");

    let ids: Vec<_> = run.cohort.iter().map(|a| a.id.0.as_str()).collect();
    assert_eq!(ids, ["ben", "amy"]);
    assert_eq!(run.cohort[1].original_rank, 1);
}
