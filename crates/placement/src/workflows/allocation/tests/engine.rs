use super::common::*;
use crate::workflows::allocation::domain::{FinalChoice, TermOffer};
use crate::workflows::allocation::engine::{AllocationConfig, AllocationEngine};
use crate::workflows::allocation::repository::{AssignmentStage, NoopObserver, PlacementEvent};

fn engine(ordered_wish_limit: usize) -> AllocationEngine {
    AllocationEngine::new(AllocationConfig {
        penalty_coefficient: 0.0,
        ordered_wish_limit,
        fill_metric: Default::default(),
    })
}

#[test]
fn ordered_stage_respects_listed_order() {
    let mut roster = roster_with(vec![
        partner("Alpha", "S8", offer(2, 2)),
        partner("Beta", "S8", offer(2, 0)),
    ]);
    let mut cohort = vec![applicant("amy", "CS")
        .with_wishes(term("S8"), vec![partner_id("Alpha"), partner_id("Beta")])];

    let observer = RecordingObserver::default();
    engine(2).run(&mut roster, &mut cohort, &observer);

    assert_eq!(
        cohort[0].placement(&term("S8")),
        Some(&FinalChoice::Assigned(partner_id("Beta")))
    );
    assert!(matches!(
        observer.events().as_slice(),
        [
            PlacementEvent::Assigned {
                stage: AssignmentStage::Ordered { position: 2 },
                ..
            },
            PlacementEvent::NoRequest { .. },
        ]
    ));
}

#[test]
fn ordered_stage_skips_wishes_below_the_grade_floor() {
    let guarded = TermOffer {
        min_grade: Some(15.0),
        ..offer(2, 0)
    };
    let mut roster = roster_with(vec![
        partner("Alpha", "S8", guarded),
        partner("Beta", "S8", offer(2, 0)),
    ]);
    let mut cohort = vec![applicant("amy", "CS")
        .with_grade(12.0)
        .with_wishes(term("S8"), vec![partner_id("Alpha"), partner_id("Beta")])];

    engine(2).run(&mut roster, &mut cohort, &NoopObserver);

    assert_eq!(
        cohort[0].placement(&term("S8")),
        Some(&FinalChoice::Assigned(partner_id("Beta")))
    );
    assert_eq!(roster.seats_taken(&partner_id("Alpha"), &term("S8")), Some(0));
}

#[test]
fn fallback_steers_to_the_least_filled_remaining_wish() {
    // Ordered limit 0: both wishes are unordered. Alpha sits at 50% fill,
    // Beta at 10%, so Beta wins even though Alpha is listed first.
    let mut roster = roster_with(vec![
        partner("Alpha", "S8", offer(2, 1)),
        partner("Beta", "S8", offer(10, 1)),
    ]);
    let mut cohort = vec![applicant("amy", "CS")
        .with_wishes(term("S8"), vec![partner_id("Alpha"), partner_id("Beta")])];

    let observer = RecordingObserver::default();
    engine(0).run(&mut roster, &mut cohort, &observer);

    assert_eq!(
        cohort[0].placement(&term("S8")),
        Some(&FinalChoice::Assigned(partner_id("Beta")))
    );
    assert!(matches!(
        observer.events().first(),
        Some(PlacementEvent::Assigned {
            stage: AssignmentStage::Fallback,
            ..
        })
    ));
}

#[test]
fn fallback_assigns_standard_tier_when_no_preferred_wish_is_open() {
    let mut roster = roster_with(vec![
        partner("Alpha", "S8", offer(1, 1)),
        partner("Beta", "S8", offer(1, 1)),
        partner("Zeta", "S8", offer(3, 0)),
    ]);
    let mut cohort = vec![applicant("amy", "CS").with_wishes(
        term("S8"),
        vec![partner_id("Alpha"), partner_id("Beta"), partner_id("Zeta")],
    )];

    engine(2).run(&mut roster, &mut cohort, &NoopObserver);

    assert_eq!(
        cohort[0].placement(&term("S8")),
        Some(&FinalChoice::Assigned(partner_id("Zeta")))
    );
}

#[test]
fn preferred_tier_wins_over_an_emptier_standard_partner() {
    let mut roster = roster_with(vec![
        partner("Quiet", "S8", offer(10, 1)),
        partner("Busy", "S8", preferred_offer(10, 9)),
    ]);
    let mut cohort = vec![applicant("amy", "CS")
        .with_wishes(term("S8"), vec![partner_id("Quiet"), partner_id("Busy")])];

    engine(0).run(&mut roster, &mut cohort, &NoopObserver);

    assert_eq!(
        cohort[0].placement(&term("S8")),
        Some(&FinalChoice::Assigned(partner_id("Busy")))
    );
}

#[test]
fn specialty_stage_searches_the_whole_roster() {
    let mut roster = roster_with(vec![
        partner("Alpha", "S8", offer(1, 1)),
        partner("Omega", "S8", offer(4, 0)),
    ]);
    // Omega is nowhere in the wish list but is subject-compatible and open.
    let mut cohort =
        vec![applicant("amy", "CS").with_wishes(term("S8"), vec![partner_id("Alpha")])];

    let observer = RecordingObserver::default();
    engine(2).run(&mut roster, &mut cohort, &observer);

    assert_eq!(
        cohort[0].placement(&term("S8")),
        Some(&FinalChoice::Assigned(partner_id("Omega")))
    );
    assert!(matches!(
        observer.events().first(),
        Some(PlacementEvent::Assigned {
            stage: AssignmentStage::Specialty,
            ..
        })
    ));
}

#[test]
fn no_compatible_partner_anywhere_leaves_the_term_unassigned() {
    let mut roster = roster_with(vec![
        partner("Alpha", "S8", offer(1, 1)),
        partner("Beta", "S8", offer(5, 0)),
    ]);
    // Nobody lists subject "AR", so once the stated wish fails the
    // subject-wide stage finds nothing either.
    let mut cohort =
        vec![applicant("amy", "AR").with_wishes(term("S8"), vec![partner_id("Alpha")])];

    let observer = RecordingObserver::default();
    engine(2).run(&mut roster, &mut cohort, &observer);

    assert_eq!(
        cohort[0].placement(&term("S8")),
        Some(&FinalChoice::Unassigned)
    );
    assert!(matches!(
        observer.events().first(),
        Some(PlacementEvent::Unassigned { .. })
    ));
}

#[test]
fn no_request_terms_never_touch_the_ledger() {
    let mut roster = roster_with(vec![partner("Alpha", "S8", offer(2, 0))]);
    let mut cohort = vec![applicant("amy", "CS")];

    let observer = RecordingObserver::default();
    engine(2).run(&mut roster, &mut cohort, &observer);

    assert_eq!(roster.seats_taken(&partner_id("Alpha"), &term("S8")), Some(0));
    assert_eq!(
        cohort[0].placement(&term("S8")),
        Some(&FinalChoice::Unassigned)
    );
    assert!(observer
        .events()
        .iter()
        .all(|event| matches!(event, PlacementEvent::NoRequest { .. })));
}

#[test]
fn each_assignment_takes_exactly_one_seat() {
    let mut roster = roster_with(vec![partner("Alpha", "S8", offer(3, 0))]);
    let mut cohort = vec![
        applicant("amy", "CS").with_wishes(term("S8"), vec![partner_id("Alpha")]),
        applicant("ben", "CS").with_wishes(term("S8"), vec![partner_id("Alpha")]),
    ];

    engine(1).run(&mut roster, &mut cohort, &NoopObserver);

    assert_eq!(roster.seats_taken(&partner_id("Alpha"), &term("S8")), Some(2));
}

#[test]
fn contended_seat_goes_to_the_earlier_applicant() {
    let mut roster = roster_with(vec![partner("Alpha", "S8", offer(1, 0))]);
    let mut cohort = vec![
        applicant("amy", "CS").with_wishes(term("S8"), vec![partner_id("Alpha")]),
        applicant("ben", "CS").with_wishes(term("S8"), vec![partner_id("Alpha")]),
    ];

    engine(1).run(&mut roster, &mut cohort, &NoopObserver);

    assert_eq!(
        cohort[0].placement(&term("S8")),
        Some(&FinalChoice::Assigned(partner_id("Alpha")))
    );
    assert_eq!(
        cohort[1].placement(&term("S8")),
        Some(&FinalChoice::Unassigned)
    );
    assert_eq!(roster.seats_taken(&partner_id("Alpha"), &term("S8")), Some(1));
}

#[test]
fn capacity_never_exceeds_declared_totals_under_contention() {
    let mut roster = roster_with(vec![
        partner("Alpha", "S8", offer(2, 0)),
        partner("Beta", "S8", offer(1, 0)),
    ]);
    let mut cohort: Vec<_> = (0..6)
        .map(|index| {
            applicant(&format!("a{index}"), "CS")
                .with_wishes(term("S8"), vec![partner_id("Alpha"), partner_id("Beta")])
        })
        .collect();

    engine(1).run(&mut roster, &mut cohort, &NoopObserver);

    for usage in roster.seat_usage() {
        if let Some(total) = usage.seats_total {
            assert!(usage.seats_taken <= total, "overbooked {:?}", usage.partner);
        }
    }
    let placed = cohort
        .iter()
        .filter(|a| a.placement(&term("S8")).map(FinalChoice::is_assigned) == Some(true))
        .count();
    assert_eq!(placed, 3);
}

#[test]
fn identical_inputs_produce_identical_results() {
    let roster = roster_with(vec![
        partner("Alpha", "S8", offer(2, 0)),
        partner("Beta", "S8", preferred_offer(2, 1)),
        partner("Gamma", "S8", offer(5, 2)),
    ]);
    let cohort: Vec<_> = (0..5)
        .map(|index| {
            applicant(&format!("a{index}"), "CS").with_wishes(
                term("S8"),
                vec![partner_id("Alpha"), partner_id("Beta"), partner_id("Gamma")],
            )
        })
        .collect();

    let mut roster_a = roster.clone();
    let mut roster_b = roster;
    let mut cohort_a = cohort.clone();
    let mut cohort_b = cohort;

    engine(1).run(&mut roster_a, &mut cohort_a, &NoopObserver);
    engine(1).run(&mut roster_b, &mut cohort_b, &NoopObserver);

    assert_eq!(cohort_a, cohort_b);
    assert_eq!(roster_a.seat_usage(), roster_b.seat_usage());
}

#[test]
fn at_most_one_assignment_per_applicant_per_term() {
    let mut roster = roster_with(vec![
        partner("Alpha", "S8", offer(4, 0)),
        partner("Alpha9", "S9", offer(4, 0)),
    ]);
    let mut cohort = vec![applicant("amy", "CS")
        .with_wishes(term("S8"), vec![partner_id("Alpha"), partner_id("Alpha")])
        .with_wishes(term("S9"), vec![partner_id("Alpha9")])];

    engine(2).run(&mut roster, &mut cohort, &NoopObserver);

    // One final choice per term, even with a duplicated wish entry.
    assert_eq!(cohort[0].placements.len(), 2);
    assert_eq!(roster.seats_taken(&partner_id("Alpha"), &term("S8")), Some(1));
    assert_eq!(roster.seats_taken(&partner_id("Alpha9"), &term("S9")), Some(1));
}
