//! The three-stage assignment protocol for one (applicant, term) pair.
//!
//! Stage 1 honors the applicant's explicit ranked intent up to the configured
//! depth. Stage 2 salvages the remaining stated wishes by steering toward the
//! least-saturated eligible one. Stage 3 widens to every subject-compatible
//! partner in the roster. Both fallback stages split candidates by tier
//! first: a standard-tier seat is never taken while an eligible preferred
//! seat is open.

use tracing::debug;

use super::super::domain::{ApplicantRecord, FillMetric, PartnerId, SubjectCode, TermId};
use super::super::eligibility::meets_grade_floor;
use super::super::repository::AssignmentStage;
use super::super::roster::PartnerRoster;
use super::super::selection::{
    meeting_grade_floor, pick_least_filled, split_by_priority, with_seat,
};
use super::config::AllocationConfig;

/// Resolves one term for one applicant without mutating anything. Returns the
/// chosen partner and the stage that produced it, or `None` when every stage
/// was exhausted.
pub(crate) fn place_for_term(
    roster: &PartnerRoster,
    applicant: &ApplicantRecord,
    term: &TermId,
    config: &AllocationConfig,
) -> Option<(PartnerId, AssignmentStage)> {
    let wishes = applicant.wish_list(term);
    if wishes.is_empty() {
        return None;
    }

    let firm = config.ordered_wish_limit.min(wishes.len());
    if let Some((partner, position)) =
        ordered_choice(roster, &wishes[..firm], term, applicant.grade)
    {
        return Some((partner, AssignmentStage::Ordered { position }));
    }

    let remaining = &wishes[firm..];
    if !remaining.is_empty() {
        if let Some(partner) = tiered_least_filled(
            roster,
            remaining,
            term,
            applicant.grade,
            config.fill_metric,
        ) {
            return Some((partner, AssignmentStage::Fallback));
        }
        debug!(
            applicant = %applicant.id.0,
            term = %term.0,
            "no remaining wish admissible, widening to subject-compatible partners"
        );
    }

    specialty_choice(
        roster,
        term,
        &applicant.subject,
        applicant.grade,
        config.fill_metric,
    )
    .map(|partner| (partner, AssignmentStage::Specialty))
}

/// Walks the firm wish entries in listed order and takes the first one with
/// an open seat whose grade floor the applicant meets. Subject compatibility
/// is not re-checked here: the applicant picked the partner themselves.
fn ordered_choice(
    roster: &PartnerRoster,
    firm_wishes: &[PartnerId],
    term: &TermId,
    grade: Option<f32>,
) -> Option<(PartnerId, usize)> {
    for (position, wish) in firm_wishes.iter().enumerate() {
        if roster.has_seat(wish, term) && meets_grade_floor(roster, wish, term, grade) {
            return Some((wish.clone(), position + 1));
        }
        debug!(partner = %wish.0, term = %term.0, "ordered wish not admissible");
    }
    None
}

/// Filters candidates down to seat-available and grade-admissible ones, then
/// picks the least-filled preferred partner, falling back to the least-filled
/// standard partner.
fn tiered_least_filled(
    roster: &PartnerRoster,
    candidates: &[PartnerId],
    term: &TermId,
    grade: Option<f32>,
    metric: FillMetric,
) -> Option<PartnerId> {
    let open = with_seat(roster, candidates, term);
    let admissible = meeting_grade_floor(roster, &open, term, grade);
    let (preferred, standard) = split_by_priority(roster, &admissible, term);

    pick_least_filled(roster, &preferred, term, metric)
        .or_else(|| pick_least_filled(roster, &standard, term, metric))
}

/// Stage 3: every partner in the roster compatible with the applicant's
/// subject area, run through the same tiered least-filled selection.
fn specialty_choice(
    roster: &PartnerRoster,
    term: &TermId,
    subject: &SubjectCode,
    grade: Option<f32>,
    metric: FillMetric,
) -> Option<PartnerId> {
    let compatible = roster.compatible_partners(term, subject);
    if compatible.is_empty() {
        debug!(term = %term.0, subject = %subject.0, "no subject-compatible partner in roster");
        return None;
    }
    tiered_least_filled(roster, &compatible, term, grade, metric)
}
