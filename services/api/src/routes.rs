use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

use placement::workflows::allocation::{
    placement_router, AllocationConfig, PlacementObserver, PlacementService, RunRepository,
};
use placement::workflows::intake::RosterImporter;

/// Request body for a run fed by raw CSV exports rather than canonical
/// tables.
#[derive(Debug, Deserialize)]
pub(crate) struct CsvRunRequest {
    pub(crate) partners_csv: String,
    pub(crate) applicants_csv: String,
    #[serde(default)]
    pub(crate) config: Option<AllocationConfig>,
}

pub(crate) fn with_placement_routes<R, O>(service: Arc<PlacementService<R, O>>) -> axum::Router
where
    R: RunRepository + 'static,
    O: PlacementObserver + 'static,
{
    let csv_service = service.clone();
    placement_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/placement/import-run",
            axum::routing::post(move |body: Json<CsvRunRequest>| {
                csv_run_endpoint(csv_service, body)
            }),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(std::sync::atomic::Ordering::Acquire) {
        (StatusCode::OK, Json(json!({ "status": "ready" }))).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "starting" })),
        )
            .into_response()
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn csv_run_endpoint<R, O>(
    service: Arc<PlacementService<R, O>>,
    Json(request): Json<CsvRunRequest>,
) -> axum::response::Response
where
    R: RunRepository + 'static,
    O: PlacementObserver + 'static,
{
    let imported = RosterImporter::from_readers(
        Cursor::new(request.partners_csv),
        Cursor::new(request.applicants_csv),
    );

    let (roster, cohort) = match imported {
        Ok(tables) => tables,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    let config = request
        .config
        .unwrap_or_else(|| service.config().clone());

    match service.run_with(roster, cohort, config) {
        Ok(run) => {
            let terms = run.terms();
            (StatusCode::CREATED, Json(run.result_view(&terms))).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
