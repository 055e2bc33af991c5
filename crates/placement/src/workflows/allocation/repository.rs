use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{ApplicantId, ApplicantRecord, PartnerId, TermId};
use super::engine::AllocationConfig;
use super::report::{PlacementSummary, RunResultView};
use super::roster::SeatUsage;

/// Identifier wrapper for stored allocation runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RunId(pub String);

/// Which stage of the protocol produced an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStage {
    /// A firm ordered wish; `position` is 1-based within the wish list.
    Ordered { position: usize },
    /// Least-filled pick among the remaining stated wishes.
    Fallback,
    /// Subject-wide safety net beyond the applicant's wish list.
    Specialty,
}

impl AssignmentStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ordered { .. } => "ordered",
            Self::Fallback => "fallback",
            Self::Specialty => "specialty",
        }
    }
}

/// Transition report emitted by the engine as it resolves each
/// applicant/term pair. Purely observational: results are identical whether
/// or not anyone listens.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementEvent {
    NoRequest {
        applicant: ApplicantId,
        term: TermId,
    },
    Assigned {
        applicant: ApplicantId,
        term: TermId,
        partner: PartnerId,
        stage: AssignmentStage,
    },
    Unassigned {
        applicant: ApplicantId,
        term: TermId,
    },
}

/// Outbound hook for engine transitions (audit trails, progress UIs).
pub trait PlacementObserver: Send + Sync {
    fn notify(&self, event: PlacementEvent);
}

/// Observer that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PlacementObserver for NoopObserver {
    fn notify(&self, _event: PlacementEvent) {}
}

/// A finished allocation run: the re-ranked cohort with final choices, the
/// mutated seat counts, and the derived summary.
#[derive(Debug, Clone)]
pub struct AllocationRun {
    pub run_id: RunId,
    pub config: AllocationConfig,
    pub completed_on: NaiveDate,
    pub cohort: Vec<ApplicantRecord>,
    pub seat_usage: Vec<SeatUsage>,
    pub summary: PlacementSummary,
}

impl AllocationRun {
    pub fn result_view(&self, terms: &[TermId]) -> RunResultView {
        RunResultView::from_run(self, terms)
    }

    /// The declared term order, recovered from the summary rows.
    pub fn terms(&self) -> Vec<TermId> {
        self.summary
            .term_outcomes
            .iter()
            .map(|outcome| outcome.term.clone())
            .collect()
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait RunRepository: Send + Sync {
    fn insert(&self, run: AllocationRun) -> Result<AllocationRun, RepositoryError>;
    fn fetch(&self, id: &RunId) -> Result<Option<AllocationRun>, RepositoryError>;
    fn recent(&self, limit: usize) -> Result<Vec<AllocationRun>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("run already exists")]
    Conflict,
    #[error("run not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
