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

use super::directory::{CompanyDirectory, DirectoryError};
use super::domain::ImpactScores;
use super::repository::{PredictionId, PredictionRepository};
use super::service::{PredictionError, PredictionService};

const HISTORY_LIMIT: usize = 50;

/// Shared state for the prediction API routes.
pub struct PredictionApiState<R> {
    pub service: Arc<PredictionService<R>>,
    pub directory: Arc<CompanyDirectory>,
}

impl<R> Clone for PredictionApiState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            directory: self.directory.clone(),
        }
    }
}

/// Router builder exposing the company lookup and prediction endpoints.
pub fn prediction_router<R>(
    service: Arc<PredictionService<R>>,
    directory: Arc<CompanyDirectory>,
) -> Router
where
    R: PredictionRepository + 'static,
{
    Router::new()
        .route("/api/v1/companies", get(list_companies_handler::<R>))
        .route(
            "/api/v1/companies/:company_name",
            get(company_handler::<R>),
        )
        .route("/api/v1/predictions", post(submit_handler::<R>))
        .route(
            "/api/v1/predictions/:prediction_id",
            get(prediction_handler::<R>).delete(delete_handler::<R>),
        )
        .route(
            "/api/v1/users/:username/predictions",
            get(history_handler::<R>),
        )
        .with_state(PredictionApiState { service, directory })
}

#[derive(Debug, Deserialize)]
pub struct PredictionRequest {
    pub username: String,
    pub company_name: String,
    pub impact_area_community: f64,
    pub impact_area_environment: f64,
    pub impact_area_customers: f64,
    pub impact_area_governance: f64,
    pub certification_cycle: i64,
}

impl PredictionRequest {
    fn scores(&self) -> ImpactScores {
        ImpactScores {
            community: self.impact_area_community,
            environment: self.impact_area_environment,
            customers: self.impact_area_customers,
            governance: self.impact_area_governance,
            certification_cycle: self.certification_cycle,
        }
    }
}

async fn list_companies_handler<R>(State(state): State<PredictionApiState<R>>) -> Response
where
    R: PredictionRepository + 'static,
{
    (
        StatusCode::OK,
        axum::Json(json!({ "companies": state.directory.names() })),
    )
        .into_response()
}

async fn company_handler<R>(
    State(state): State<PredictionApiState<R>>,
    Path(company_name): Path<String>,
) -> Response
where
    R: PredictionRepository + 'static,
{
    match state.directory.lookup(&company_name) {
        Ok(details) => (StatusCode::OK, axum::Json(details.clone())).into_response(),
        Err(err @ DirectoryError::NotFound(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

async fn submit_handler<R>(
    State(state): State<PredictionApiState<R>>,
    axum::Json(request): axum::Json<PredictionRequest>,
) -> Response
where
    R: PredictionRepository + 'static,
{
    let details = match state.directory.lookup(&request.company_name) {
        Ok(details) => details.clone(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
        }
    };

    let service = state.service.clone();
    let username = request.username.clone();
    let scores = request.scores();

    // The pipeline blocks on the outbound completion call.
    let outcome =
        tokio::task::spawn_blocking(move || service.predict(&username, &details, scores)).await;

    match outcome {
        Ok(Ok(record)) => (StatusCode::CREATED, axum::Json(record.view())).into_response(),
        Ok(Err(err @ PredictionError::NonFiniteInput)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Ok(Err(other)) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
        Err(join_error) => {
            let payload = json!({ "error": format!("prediction task failed: {join_error}") });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

async fn prediction_handler<R>(
    State(state): State<PredictionApiState<R>>,
    Path(prediction_id): Path<String>,
) -> Response
where
    R: PredictionRepository + 'static,
{
    let id = PredictionId(prediction_id);
    match state.service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(PredictionError::Repository(super::repository::RepositoryError::NotFound)) => {
            let payload = json!({ "error": "prediction not found", "id": id.0 });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

async fn delete_handler<R>(
    State(state): State<PredictionApiState<R>>,
    Path(prediction_id): Path<String>,
) -> Response
where
    R: PredictionRepository + 'static,
{
    let id = PredictionId(prediction_id);
    match state.service.delete(&id) {
        Ok(()) => {
            let payload = json!({ "message": "prediction deleted" });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(PredictionError::Repository(super::repository::RepositoryError::NotFound)) => {
            let payload = json!({ "error": "prediction not found", "id": id.0 });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

async fn history_handler<R>(
    State(state): State<PredictionApiState<R>>,
    Path(username): Path<String>,
) -> Response
where
    R: PredictionRepository + 'static,
{
    match state.service.history(&username, HISTORY_LIMIT) {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|record| record.view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
