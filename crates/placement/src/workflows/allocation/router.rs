use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicantRecord, PartnerRecord, TermId};
use super::engine::AllocationConfig;
use super::repository::{PlacementObserver, RepositoryError, RunId, RunRepository};
use super::roster::PartnerRoster;
use super::service::{PlacementService, PlacementServiceError};

/// Canonical-table payload for starting a run.
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub terms: Vec<TermId>,
    pub partners: Vec<PartnerRecord>,
    pub applicants: Vec<ApplicantRecord>,
    #[serde(default)]
    pub config: Option<AllocationConfig>,
}

/// Router builder exposing HTTP endpoints for allocation runs.
pub fn placement_router<R, O>(service: Arc<PlacementService<R, O>>) -> Router
where
    R: RunRepository + 'static,
    O: PlacementObserver + 'static,
{
    Router::new()
        .route(
            "/api/v1/placement/runs",
            post(run_handler::<R, O>).get(list_handler::<R, O>),
        )
        .route("/api/v1/placement/runs/:run_id", get(result_handler::<R, O>))
        .with_state(service)
}

const RECENT_RUNS_LIMIT: usize = 20;

pub(crate) async fn list_handler<R, O>(
    State(service): State<Arc<PlacementService<R, O>>>,
) -> Response
where
    R: RunRepository + 'static,
    O: PlacementObserver + 'static,
{
    match service.recent(RECENT_RUNS_LIMIT) {
        Ok(runs) => {
            let listing: Vec<_> = runs
                .iter()
                .map(|run| {
                    json!({
                        "run_id": run.run_id.0,
                        "completed_on": run.completed_on,
                        "total_applicants": run.summary.total_applicants,
                    })
                })
                .collect();
            (StatusCode::OK, axum::Json(json!({ "runs": listing }))).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn run_handler<R, O>(
    State(service): State<Arc<PlacementService<R, O>>>,
    axum::Json(request): axum::Json<RunRequest>,
) -> Response
where
    R: RunRepository + 'static,
    O: PlacementObserver + 'static,
{
    let roster = match PartnerRoster::from_records(request.terms, request.partners) {
        Ok(roster) => roster,
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };

    let config = request
        .config
        .unwrap_or_else(|| service.config().clone());

    match service.run_with(roster, request.applicants, config) {
        Ok(run) => {
            let terms = run.terms();
            let view = run.result_view(&terms);
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(PlacementServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "run already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn result_handler<R, O>(
    State(service): State<Arc<PlacementService<R, O>>>,
    Path(run_id): Path<String>,
) -> Response
where
    R: RunRepository + 'static,
    O: PlacementObserver + 'static,
{
    let id = RunId(run_id);
    match service.get(&id) {
        Ok(run) => {
            let terms = run.terms();
            let view = run.result_view(&terms);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(PlacementServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "run_id": id.0,
                "error": "run not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
