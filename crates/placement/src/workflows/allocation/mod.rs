//! Seat allocation for partner-institution placement.
//!
//! The engine assigns each applicant to at most one partner per academic
//! term, honoring ranked wish lists, live seat capacity, per-partner
//! eligibility rules, and a fairness penalty for applicants requesting
//! several terms at once.

pub mod domain;
pub(crate) mod eligibility;
mod engine;
mod ledger;
pub(crate) mod ranking;
pub mod report;
pub mod repository;
pub mod roster;
pub mod router;
pub(crate) mod selection;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantId, ApplicantRecord, FillMetric, FinalChoice, PartnerId, PartnerRecord, PriorityTier,
    SubjectCode, TermId, TermOffer,
};
pub use engine::{AllocationConfig, AllocationEngine};
pub use report::{PlacementSummary, RunResultView};
pub use repository::{
    AllocationRun, AssignmentStage, NoopObserver, PlacementEvent, PlacementObserver,
    RepositoryError, RunId, RunRepository,
};
pub use roster::{PartnerRoster, RosterError, SeatUsage};
pub use router::{placement_router, RunRequest};
pub use service::{PlacementService, PlacementServiceError};
