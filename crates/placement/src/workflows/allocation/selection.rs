//! Candidate filtering and least-filled selection for the fallback stages.

use super::domain::{FillMetric, PartnerId, TermId};
use super::eligibility::{is_priority, meets_grade_floor};
use super::roster::PartnerRoster;

/// Returns the first candidate minimizing the chosen fill metric for the
/// term. Stable left-to-right scan: only a strictly smaller value replaces
/// the running minimum, so ties keep the earliest candidate. Unknown metric
/// values compare as infinitely filled and are never preferred over a known
/// one. Empty input yields `None`.
pub fn pick_least_filled(
    roster: &PartnerRoster,
    candidates: &[PartnerId],
    term: &TermId,
    metric: FillMetric,
) -> Option<PartnerId> {
    let mut best: Option<(&PartnerId, f64)> = None;
    for candidate in candidates {
        let value = metric_value(roster, candidate, term, metric);
        match best {
            Some((_, current)) if value < current => best = Some((candidate, value)),
            Some(_) => {}
            None => best = Some((candidate, value)),
        }
    }
    best.map(|(id, _)| id.clone())
}

fn metric_value(
    roster: &PartnerRoster,
    partner: &PartnerId,
    term: &TermId,
    metric: FillMetric,
) -> f64 {
    let value = match metric {
        FillMetric::Rate => roster.fill_rate(partner, term),
        FillMetric::Count => roster
            .seats_taken(partner, term)
            .map(|taken| f64::from(taken)),
    };
    value.unwrap_or(f64::INFINITY)
}

/// Partitions candidates into (preferred, standard), preserving relative
/// order inside each partition. Candidates unknown to the roster are dropped.
pub fn split_by_priority(
    roster: &PartnerRoster,
    candidates: &[PartnerId],
    term: &TermId,
) -> (Vec<PartnerId>, Vec<PartnerId>) {
    let mut preferred = Vec::new();
    let mut standard = Vec::new();
    for candidate in candidates {
        if roster.get(candidate).is_none() {
            continue;
        }
        if is_priority(roster, candidate, term) {
            preferred.push(candidate.clone());
        } else {
            standard.push(candidate.clone());
        }
    }
    (preferred, standard)
}

/// Keeps the candidates with at least one open seat for the term.
pub fn with_seat(
    roster: &PartnerRoster,
    candidates: &[PartnerId],
    term: &TermId,
) -> Vec<PartnerId> {
    candidates
        .iter()
        .filter(|candidate| roster.has_seat(candidate, term))
        .cloned()
        .collect()
}

/// Keeps the candidates whose grade floor the applicant satisfies.
pub fn meeting_grade_floor(
    roster: &PartnerRoster,
    candidates: &[PartnerId],
    term: &TermId,
    grade: Option<f32>,
) -> Vec<PartnerId> {
    candidates
        .iter()
        .filter(|candidate| meets_grade_floor(roster, candidate, term, grade))
        .cloned()
        .collect()
}
