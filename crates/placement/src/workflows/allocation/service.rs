use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Local;
use tracing::info;

use super::engine::{AllocationConfig, AllocationEngine};
use super::ranking::rank_applicants;
use super::report::summarize;
use super::repository::{
    AllocationRun, PlacementObserver, RepositoryError, RunId, RunRepository,
};
use super::domain::ApplicantRecord;
use super::roster::PartnerRoster;

/// Service composing the ranker, the allocation engine, run storage, and the
/// transition observer.
pub struct PlacementService<R, O> {
    repository: Arc<R>,
    observer: Arc<O>,
    config: AllocationConfig,
}

static RUN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_run_id() -> RunId {
    let id = RUN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RunId(format!("run-{id:06}"))
}

impl<R, O> PlacementService<R, O>
where
    R: RunRepository + 'static,
    O: PlacementObserver + 'static,
{
    pub fn new(repository: Arc<R>, observer: Arc<O>, config: AllocationConfig) -> Self {
        Self {
            repository,
            observer,
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// Runs a full allocation pass with the service's default parameters.
    pub fn run(
        &self,
        roster: PartnerRoster,
        cohort: Vec<ApplicantRecord>,
    ) -> Result<AllocationRun, PlacementServiceError> {
        self.run_with(roster, cohort, self.config.clone())
    }

    /// Runs a full allocation pass: re-rank the cohort, drive the engine over
    /// it, derive the summary, and persist the finished run.
    pub fn run_with(
        &self,
        mut roster: PartnerRoster,
        mut cohort: Vec<ApplicantRecord>,
        config: AllocationConfig,
    ) -> Result<AllocationRun, PlacementServiceError> {
        let engine = AllocationEngine::new(config);
        rank_applicants(&mut cohort, engine.config().penalty_coefficient);
        engine.run(&mut roster, &mut cohort, self.observer.as_ref());

        let summary = summarize(&roster, &cohort);
        let run_id = next_run_id();
        info!(
            run_id = %run_id.0,
            applicants = cohort.len(),
            partners = roster.len(),
            "allocation run complete"
        );

        let run = AllocationRun {
            run_id,
            config: engine.config().clone(),
            completed_on: Local::now().date_naive(),
            cohort,
            seat_usage: roster.seat_usage(),
            summary,
        };

        let stored = self.repository.insert(run)?;
        Ok(stored)
    }

    /// Fetch a stored run for API responses.
    pub fn get(&self, run_id: &RunId) -> Result<AllocationRun, PlacementServiceError> {
        let run = self
            .repository
            .fetch(run_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(run)
    }

    /// The most recent stored runs, newest first per the repository's order.
    pub fn recent(&self, limit: usize) -> Result<Vec<AllocationRun>, PlacementServiceError> {
        Ok(self.repository.recent(limit)?)
    }
}

/// Error raised by the placement service.
#[derive(Debug, thiserror::Error)]
pub enum PlacementServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
