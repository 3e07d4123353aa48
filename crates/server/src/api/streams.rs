//! Stream lifecycle API handlers.
//!
//! Group operations report partial failure in the response body, not the
//! status code: a group start that launched some broadcasts is still a 200,
//! with the failed ids listed in `failures`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use restream_core::{
    ActiveBroadcast, BatchOutcome, BroadcastFailure, GroupKey, OrchestratorError, ServiceError,
    StoreError,
};

use super::ErrorResponse;
use crate::state::AppState;

/// Response for group start/stop operations
#[derive(Debug, Serialize)]
pub struct GroupOutcomeResponse {
    pub success: bool,
    pub partial: bool,
    pub requested: usize,
    pub failures: Vec<BroadcastFailure>,
}

impl From<BatchOutcome> for GroupOutcomeResponse {
    fn from(outcome: BatchOutcome) -> Self {
        Self {
            success: outcome.all_succeeded(),
            partial: outcome.partial(),
            requested: outcome.requested,
            failures: outcome.failures,
        }
    }
}

/// Response for listing running broadcasts
#[derive(Debug, Serialize)]
pub struct ActiveBroadcastsResponse {
    pub broadcasts: Vec<ActiveBroadcast>,
    pub count: usize,
}

/// Response for stopping a single broadcast
#[derive(Debug, Serialize)]
pub struct StopBroadcastResponse {
    pub stopped: bool,
}

fn service_error(e: ServiceError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        ServiceError::GroupNotFound(_) | ServiceError::DefinitionNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ServiceError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServiceError::Orchestrator(OrchestratorError::AlreadyRunning { .. }) => {
            StatusCode::CONFLICT
        }
        ServiceError::Orchestrator(OrchestratorError::ShutDown) => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::Orchestrator(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ErrorResponse::with_status(status, e.to_string())
}

async fn start_group(
    state: &AppState,
    key: GroupKey,
) -> Result<Json<GroupOutcomeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let outcome = state.service().start_group(&key).await.map_err(service_error)?;
    Ok(Json(outcome.into()))
}

async fn stop_group(
    state: &AppState,
    key: GroupKey,
) -> Result<Json<GroupOutcomeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let outcome = state.service().stop_group(&key).await.map_err(service_error)?;
    Ok(Json(outcome.into()))
}

pub async fn list_active(State(state): State<Arc<AppState>>) -> Json<ActiveBroadcastsResponse> {
    let broadcasts = state.service().list_active().await;
    let count = broadcasts.len();
    Json(ActiveBroadcastsResponse { broadcasts, count })
}

pub async fn start_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GroupOutcomeResponse>, (StatusCode, Json<ErrorResponse>)> {
    start_group(&state, GroupKey::All).await
}

pub async fn stop_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GroupOutcomeResponse>, (StatusCode, Json<ErrorResponse>)> {
    stop_group(&state, GroupKey::All).await
}

pub async fn start_nomination(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<GroupOutcomeResponse>, (StatusCode, Json<ErrorResponse>)> {
    start_group(&state, GroupKey::Nomination(name)).await
}

pub async fn stop_nomination(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<GroupOutcomeResponse>, (StatusCode, Json<ErrorResponse>)> {
    stop_group(&state, GroupKey::Nomination(name)).await
}

pub async fn start_day(
    State(state): State<Arc<AppState>>,
    Path(day): Path<i64>,
) -> Result<Json<GroupOutcomeResponse>, (StatusCode, Json<ErrorResponse>)> {
    start_group(&state, GroupKey::Day(day)).await
}

pub async fn stop_day(
    State(state): State<Arc<AppState>>,
    Path(day): Path<i64>,
) -> Result<Json<GroupOutcomeResponse>, (StatusCode, Json<ErrorResponse>)> {
    stop_group(&state, GroupKey::Day(day)).await
}

pub async fn start_platform(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<GroupOutcomeResponse>, (StatusCode, Json<ErrorResponse>)> {
    start_group(&state, GroupKey::Platform(name)).await
}

pub async fn stop_platform(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<GroupOutcomeResponse>, (StatusCode, Json<ErrorResponse>)> {
    stop_group(&state, GroupKey::Platform(name)).await
}

pub async fn start_broadcast(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ActiveBroadcast>), (StatusCode, Json<ErrorResponse>)> {
    let active = state
        .service()
        .start_broadcast(&id)
        .await
        .map_err(service_error)?;
    Ok((StatusCode::CREATED, Json(active)))
}

pub async fn stop_broadcast(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StopBroadcastResponse>, (StatusCode, Json<ErrorResponse>)> {
    let stopped = state
        .service()
        .stop_broadcast(&id)
        .await
        .map_err(service_error)?;
    Ok(Json(StopBroadcastResponse { stopped }))
}
