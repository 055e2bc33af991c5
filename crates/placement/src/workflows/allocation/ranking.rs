//! Priority scoring and processing order for the allocation engine.
//!
//! An applicant at 1-based rank `r` out of `N`, requesting `k` terms, scores
//! `r/N + alpha * (k - 1)`. Lower scores process earlier and get first claim
//! on scarce seats; requesting several terms at once raises the score in
//! proportion to `alpha`, demoting multi-term applicants relative to
//! single-term applicants of similar rank. `alpha = 0` leaves the original
//! order untouched.

use tracing::debug;

use super::domain::ApplicantRecord;

/// Stamps original ranks from the incoming cohort order, fills the derived
/// priority score, and reorders the cohort ascending by (score, original
/// rank). The reordered cohort is the processing order and doubles as the
/// auditable re-ranked table.
pub fn rank_applicants(cohort: &mut Vec<ApplicantRecord>, penalty_coefficient: f64) {
    let total = cohort.len();
    if total == 0 {
        return;
    }

    for (position, applicant) in cohort.iter_mut().enumerate() {
        let rank = position + 1;
        applicant.original_rank = rank;
        let score = priority_score(rank, total, applicant.requested_terms(), penalty_coefficient);
        applicant.priority_score = Some(score);
        debug!(
            applicant = %applicant.id.0,
            rank,
            requested_terms = applicant.requested_terms(),
            score,
            "computed priority score"
        );
    }

    cohort.sort_by(|a, b| {
        let score_a = a.priority_score.unwrap_or(f64::INFINITY);
        let score_b = b.priority_score.unwrap_or(f64::INFINITY);
        score_a
            .total_cmp(&score_b)
            .then_with(|| a.original_rank.cmp(&b.original_rank))
    });
}

pub(crate) fn priority_score(
    rank: usize,
    cohort_size: usize,
    requested_terms: usize,
    penalty_coefficient: f64,
) -> f64 {
    let penalty_terms = requested_terms.saturating_sub(1);
    rank as f64 / cohort_size as f64 + penalty_coefficient * penalty_terms as f64
}
