mod config;
mod stages;

pub use config::AllocationConfig;

use tracing::info;

use super::domain::{ApplicantRecord, FinalChoice};
use super::repository::{PlacementEvent, PlacementObserver};
use super::roster::PartnerRoster;

/// Deterministic allocation pass over a ranked cohort.
///
/// Applicants are visited in the order the ranker produced (outer loop),
/// terms in the roster's declared order (inner loop). Each assignment takes
/// exactly one seat from the roster; exhausting every stage is a normal
/// outcome recorded as unassigned, never an error.
pub struct AllocationEngine {
    config: AllocationConfig,
}

impl AllocationEngine {
    pub fn new(config: AllocationConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// Runs the assignment protocol, writing final choices onto the
    /// applicant records and seat counts onto the roster. Observer
    /// notifications carry stage provenance but never influence results.
    pub fn run<O: PlacementObserver + ?Sized>(
        &self,
        roster: &mut PartnerRoster,
        cohort: &mut [ApplicantRecord],
        observer: &O,
    ) {
        let terms = roster.terms().to_vec();

        for applicant in cohort.iter_mut() {
            for term in &terms {
                if applicant.wish_list(term).is_empty() {
                    applicant
                        .placements
                        .insert(term.clone(), FinalChoice::Unassigned);
                    observer.notify(PlacementEvent::NoRequest {
                        applicant: applicant.id.clone(),
                        term: term.clone(),
                    });
                    continue;
                }

                match stages::place_for_term(roster, applicant, term, &self.config) {
                    Some((partner, stage)) => {
                        roster.take_seat(&partner, term);
                        applicant
                            .placements
                            .insert(term.clone(), FinalChoice::Assigned(partner.clone()));
                        info!(
                            applicant = %applicant.id.0,
                            term = %term.0,
                            partner = %partner.0,
                            stage = stage.label(),
                            "assigned"
                        );
                        observer.notify(PlacementEvent::Assigned {
                            applicant: applicant.id.clone(),
                            term: term.clone(),
                            partner,
                            stage,
                        });
                    }
                    None => {
                        applicant
                            .placements
                            .insert(term.clone(), FinalChoice::Unassigned);
                        info!(
                            applicant = %applicant.id.0,
                            term = %term.0,
                            "no admissible partner, left unassigned"
                        );
                        observer.notify(PlacementEvent::Unassigned {
                            applicant: applicant.id.clone(),
                            term: term.clone(),
                        });
                    }
                }
            }
        }
    }
}
