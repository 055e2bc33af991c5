use super::common::*;
use crate::workflows::allocation::ranking::rank_applicants;

fn cohort_of(size: usize) -> Vec<crate::workflows::allocation::domain::ApplicantRecord> {
    (1..=size)
        .map(|index| {
            applicant(&format!("a{index:02}"), "CS")
                .with_wishes(term("S8"), vec![partner_id("Alpha")])
        })
        .collect()
}

#[test]
fn zero_penalty_preserves_original_order() {
    let mut cohort = cohort_of(5);
    cohort[2]
        .wishes
        .insert(term("S9"), vec![partner_id("Alpha")]);

    rank_applicants(&mut cohort, 0.0);

    let ids: Vec<_> = cohort.iter().map(|a| a.id.0.as_str()).collect();
    assert_eq!(ids, ["a01", "a02", "a03", "a04", "a05"]);
    assert_eq!(cohort[0].priority_score, Some(0.2));
}

#[test]
fn multi_term_requests_are_demoted_proportionally() {
    let mut cohort = cohort_of(4);
    // The top-ranked applicant asks for both terms; with a strong penalty the
    // single-term applicants directly below overtake them.
    cohort[0]
        .wishes
        .insert(term("S9"), vec![partner_id("Alpha")]);

    rank_applicants(&mut cohort, 0.8);

    let ids: Vec<_> = cohort.iter().map(|a| a.id.0.as_str()).collect();
    assert_eq!(ids, ["a02", "a03", "a04", "a01"]);
    assert_eq!(cohort[3].priority_score, Some(0.25 + 0.8));
}

#[test]
fn exact_score_ties_break_by_original_rank() {
    // Ranks 1..10, alpha = 0.1: rank 3 with two terms scores 3/10 + 0.1 and
    // rank 4 with one term scores 4/10. Both are 0.4; the better original
    // rank must process first.
    let mut cohort = cohort_of(10);
    cohort[2]
        .wishes
        .insert(term("S9"), vec![partner_id("Alpha")]);

    rank_applicants(&mut cohort, 0.1);

    let rank3 = cohort.iter().position(|a| a.id.0 == "a03").unwrap();
    let rank4 = cohort.iter().position(|a| a.id.0 == "a04").unwrap();
    assert_eq!(
        cohort[rank3].priority_score,
        cohort[rank4].priority_score,
        "scores must tie exactly"
    );
    assert!(rank3 < rank4, "tie must break by original rank");
}

#[test]
fn original_ranks_are_stamped_from_cohort_position() {
    let mut cohort = cohort_of(3);
    rank_applicants(&mut cohort, 0.0);

    let ranks: Vec<_> = cohort.iter().map(|a| a.original_rank).collect();
    assert_eq!(ranks, [1, 2, 3]);
}

#[test]
fn empty_cohort_is_a_no_op() {
    let mut cohort = Vec::new();
    rank_applicants(&mut cohort, 0.3);
    assert!(cohort.is_empty());
}

#[test]
fn applicants_without_requests_carry_no_penalty() {
    let mut cohort = cohort_of(2);
    cohort[1].wishes.clear();

    rank_applicants(&mut cohort, 0.9);

    // k = 0 saturates to no penalty rather than a negative one.
    assert_eq!(cohort[1].priority_score, Some(1.0));
}
