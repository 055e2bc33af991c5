use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::workflows::allocation::domain::{
    ApplicantRecord, PartnerId, PartnerRecord, PriorityTier, SubjectCode, TermId, TermOffer,
};
use crate::workflows::allocation::engine::AllocationConfig;
use crate::workflows::allocation::repository::{
    AllocationRun, PlacementEvent, PlacementObserver, RepositoryError, RunId, RunRepository,
};
use crate::workflows::allocation::roster::PartnerRoster;
use crate::workflows::allocation::service::PlacementService;

pub(super) fn term(value: &str) -> TermId {
    TermId(value.to_string())
}

pub(super) fn partner_id(value: &str) -> PartnerId {
    PartnerId(value.to_string())
}

pub(super) fn subject(value: &str) -> SubjectCode {
    SubjectCode(value.to_string())
}

/// Standard-tier offer compatible with "CS", no grade floor.
pub(super) fn offer(seats_total: impl Into<Option<u32>>, seats_taken: u32) -> TermOffer {
    TermOffer {
        seats_total: seats_total.into(),
        seats_taken,
        compatible_subjects: vec![subject("CS")],
        tier: PriorityTier::Standard,
        min_grade: None,
    }
}

pub(super) fn preferred_offer(seats_total: impl Into<Option<u32>>, seats_taken: u32) -> TermOffer {
    TermOffer {
        tier: PriorityTier::Preferred,
        ..offer(seats_total, seats_taken)
    }
}

pub(super) fn partner(name: &str, term_name: &str, term_offer: TermOffer) -> PartnerRecord {
    PartnerRecord::new(name).with_offer(term(term_name), term_offer)
}

/// Roster declaring the usual two-term year.
pub(super) fn roster_with(partners: Vec<PartnerRecord>) -> PartnerRoster {
    PartnerRoster::from_records(vec![term("S8"), term("S9")], partners)
        .expect("fixture roster builds")
}

pub(super) fn applicant(id: &str, subject_code: &str) -> ApplicantRecord {
    ApplicantRecord::new(id, subject_code)
}

pub(super) fn allocation_config() -> AllocationConfig {
    AllocationConfig {
        penalty_coefficient: 0.1,
        ordered_wish_limit: 2,
        fill_metric: Default::default(),
    }
}

#[derive(Default)]
pub(super) struct MemoryRunRepository {
    runs: Mutex<HashMap<String, AllocationRun>>,
}

impl RunRepository for MemoryRunRepository {
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
        runs.sort_by(|a, b| a.run_id.0.cmp(&b.run_id.0));
        runs.truncate(limit);
        Ok(runs)
    }
}

pub(super) struct ConflictRepository;

impl RunRepository for ConflictRepository {
    fn insert(&self, _run: AllocationRun) -> Result<AllocationRun, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &RunId) -> Result<Option<AllocationRun>, RepositoryError> {
        Ok(None)
    }

    fn recent(&self, _limit: usize) -> Result<Vec<AllocationRun>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl RunRepository for UnavailableRepository {
    fn insert(&self, _run: AllocationRun) -> Result<AllocationRun, RepositoryError> {
        Err(RepositoryError::Unavailable("backing store offline".to_string()))
    }

    fn fetch(&self, _id: &RunId) -> Result<Option<AllocationRun>, RepositoryError> {
        Err(RepositoryError::Unavailable("backing store offline".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<AllocationRun>, RepositoryError> {
        Err(RepositoryError::Unavailable("backing store offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct RecordingObserver {
    events: Mutex<Vec<PlacementEvent>>,
}

impl RecordingObserver {
    pub(super) fn events(&self) -> Vec<PlacementEvent> {
        self.events.lock().expect("observer mutex poisoned").clone()
    }
}

impl PlacementObserver for RecordingObserver {
    fn notify(&self, event: PlacementEvent) {
        self.events.lock().expect("observer mutex poisoned").push(event);
    }
}

pub(super) fn build_service() -> (
    Arc<PlacementService<MemoryRunRepository, RecordingObserver>>,
    Arc<MemoryRunRepository>,
    Arc<RecordingObserver>,
) {
    let repository = Arc::new(MemoryRunRepository::default());
    let observer = Arc::new(RecordingObserver::default());
    let service = Arc::new(PlacementService::new(
        repository.clone(),
        observer.clone(),
        allocation_config(),
    ));
    (service, repository, observer)
}
