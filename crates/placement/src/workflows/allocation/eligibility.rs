//! Admissibility rules evaluated against the partner roster.

use super::domain::{PartnerId, PriorityTier, SubjectCode, TermId};
use super::roster::PartnerRoster;

/// True iff the partner's offer for this term lists the subject area.
pub fn is_compatible(
    roster: &PartnerRoster,
    partner: &PartnerId,
    term: &TermId,
    subject: &SubjectCode,
) -> bool {
    roster
        .offer(partner, term)
        .map(|offer| offer.compatible_subjects.contains(subject))
        .unwrap_or(false)
}

/// True when no grade floor is declared for the partner/term; with a declared
/// floor, the applicant needs a known grade at or above it. An applicant
/// without a grade fails every declared floor.
pub fn meets_grade_floor(
    roster: &PartnerRoster,
    partner: &PartnerId,
    term: &TermId,
    grade: Option<f32>,
) -> bool {
    match roster.offer(partner, term).and_then(|offer| offer.min_grade) {
        None => true,
        Some(floor) => grade.map(|value| value >= floor).unwrap_or(false),
    }
}

/// True iff the partner's flag for this term resolved to the preferred tier.
pub fn is_priority(roster: &PartnerRoster, partner: &PartnerId, term: &TermId) -> bool {
    roster
        .offer(partner, term)
        .map(|offer| offer.tier == PriorityTier::Preferred)
        .unwrap_or(false)
}
