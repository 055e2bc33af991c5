//! Post-run completion statistics and the serializable result views.

use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{ApplicantRecord, FinalChoice, PriorityTier, TermId};
use super::repository::AllocationRun;
use super::roster::{PartnerRoster, SeatUsage};

/// Derived statistics for one finished run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlacementSummary {
    pub total_applicants: usize,
    pub term_outcomes: Vec<TermOutcome>,
    pub tier_fill: Vec<TierFillEntry>,
}

/// Per-term placement totals.
#[derive(Debug, Clone, Serialize)]
pub struct TermOutcome {
    pub term: TermId,
    pub requested: usize,
    pub placed: usize,
    pub unplaced: usize,
    pub placement_rate: Option<f64>,
}

/// Mean fill rate across one tier's partners for one term. Partners with an
/// undeclared capacity are excluded from the mean.
#[derive(Debug, Clone, Serialize)]
pub struct TierFillEntry {
    pub term: TermId,
    pub tier: &'static str,
    pub partners: usize,
    pub mean_fill_rate: Option<f64>,
}

pub fn summarize(roster: &PartnerRoster, cohort: &[ApplicantRecord]) -> PlacementSummary {
    let mut term_outcomes = Vec::new();
    let mut tier_fill = Vec::new();

    for term in roster.terms() {
        let mut requested = 0;
        let mut placed = 0;
        for applicant in cohort {
            if applicant.wish_list(term).is_empty() {
                continue;
            }
            requested += 1;
            if applicant
                .placement(term)
                .map(FinalChoice::is_assigned)
                .unwrap_or(false)
            {
                placed += 1;
            }
        }

        let placement_rate = if requested > 0 {
            Some(placed as f64 / requested as f64)
        } else {
            None
        };
        term_outcomes.push(TermOutcome {
            term: term.clone(),
            requested,
            placed,
            unplaced: requested - placed,
            placement_rate,
        });

        for tier in [PriorityTier::Preferred, PriorityTier::Standard] {
            tier_fill.push(tier_fill_entry(roster, term, tier));
        }
    }

    PlacementSummary {
        total_applicants: cohort.len(),
        term_outcomes,
        tier_fill,
    }
}

fn tier_fill_entry(roster: &PartnerRoster, term: &TermId, tier: PriorityTier) -> TierFillEntry {
    let mut partners = 0;
    let mut sum = 0.0;
    let mut known = 0;
    for record in roster.partners() {
        let Some(offer) = record.offer(term) else {
            continue;
        };
        if offer.tier != tier {
            continue;
        }
        partners += 1;
        if let Some(rate) = roster.fill_rate(&record.id, term) {
            sum += rate;
            known += 1;
        }
    }

    TierFillEntry {
        term: term.clone(),
        tier: tier.label(),
        partners,
        mean_fill_rate: if known > 0 {
            Some(sum / known as f64)
        } else {
            None
        },
    }
}

/// One row of the exported result table: the applicant with one final-choice
/// entry per declared term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementRow {
    pub applicant: String,
    pub subject: String,
    pub original_rank: usize,
    pub priority_score: Option<f64>,
    pub final_choices: BTreeMap<String, String>,
}

/// Full serialized view of a stored run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResultView {
    pub run_id: String,
    pub completed_on: chrono::NaiveDate,
    pub config: super::engine::AllocationConfig,
    pub rows: Vec<PlacementRow>,
    pub seat_usage: Vec<SeatUsage>,
    pub summary: PlacementSummary,
}

impl RunResultView {
    pub(crate) fn from_run(run: &AllocationRun, terms: &[TermId]) -> Self {
        let rows = run
            .cohort
            .iter()
            .map(|applicant| placement_row(applicant, terms))
            .collect();

        Self {
            run_id: run.run_id.0.clone(),
            completed_on: run.completed_on,
            config: run.config.clone(),
            rows,
            seat_usage: run.seat_usage.clone(),
            summary: run.summary.clone(),
        }
    }
}

fn placement_row(applicant: &ApplicantRecord, terms: &[TermId]) -> PlacementRow {
    let final_choices = terms
        .iter()
        .map(|term| {
            let label = applicant
                .placement(term)
                .map(FinalChoice::label)
                .unwrap_or_else(|| FinalChoice::Unassigned.label());
            (term.0.clone(), label)
        })
        .collect();

    PlacementRow {
        applicant: applicant.id.0.clone(),
        subject: applicant.subject.0.clone(),
        original_rank: applicant.original_rank,
        priority_score: applicant.priority_score,
        final_choices,
    }
}
