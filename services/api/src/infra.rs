use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use placement::workflows::allocation::{
    AllocationConfig, AllocationRun, FillMetric, PlacementEvent, PlacementObserver,
    RepositoryError, RunId, RunRepository,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRunRepository {
    runs: Arc<Mutex<HashMap<String, AllocationRun>>>,
}

impl RunRepository for InMemoryRunRepository {
    fn insert(&self, run: AllocationRun) -> Result<AllocationRun, RepositoryError> {
        let mut guard = self.runs.lock().expect("repository mutex poisoned");
        if guard.contains_key(&run.run_id.0) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(run.run_id.0.clone(), run.clone());
        Ok(run)
    }

    fn fetch(&self, id: &RunId) -> Result<Option<AllocationRun>, RepositoryError> {
        let guard = self.runs.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id.0).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<AllocationRun>, RepositoryError> {
        let guard = self.runs.lock().expect("repository mutex poisoned");
        let mut runs: Vec<_> = guard.values().cloned().collect();
        runs.sort_by(|a, b| b.run_id.0.cmp(&a.run_id.0));
        runs.truncate(limit);
        Ok(runs)
    }
}

/// Observer forwarding engine transitions to the tracing pipeline, so a run
/// leaves the same audit trail whether it came from the CLI or the API.
#[derive(Default, Clone, Copy)]
pub(crate) struct TracingObserver;

impl PlacementObserver for TracingObserver {
    fn notify(&self, event: PlacementEvent) {
        match event {
            PlacementEvent::Assigned {
                applicant,
                term,
                partner,
                stage,
            } => info!(
                applicant = %applicant.0,
                term = %term.0,
                partner = %partner.0,
                stage = stage.label(),
                "placement recorded"
            ),
            PlacementEvent::Unassigned { applicant, term } => info!(
                applicant = %applicant.0,
                term = %term.0,
                "no admissible partner"
            ),
            PlacementEvent::NoRequest { applicant, term } => debug!(
                applicant = %applicant.0,
                term = %term.0,
                "no request for term"
            ),
        }
    }
}

pub(crate) fn default_allocation_config() -> AllocationConfig {
    AllocationConfig {
        penalty_coefficient: 0.05,
        ordered_wish_limit: 2,
        fill_metric: FillMetric::Rate,
    }
}
